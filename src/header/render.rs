use std::fmt;

use chrono::NaiveDate;

use crate::model::{Mode, Snapshot, TaskPeriod, Timing};

const RULE: &str = "//-----------------------------------------------------------------------------------------------------||";
const TIMING_RULE: &str = "//----------------------||";
const TIMING_GAP: &str = "//                    //||";

const READ_TIMINGS: [Timing; 3] = [Timing::HiRead, Timing::MidRead, Timing::LowRead];
const ALLIGN_TIMINGS: [Timing; 3] = [Timing::HiAllign, Timing::MidAllign, Timing::LowAllign];

const HARDWARE: &str = "
#define R1b 9.25 ///< Larger resistor for battery voltage divider
#define R2b 3.3 ///< Smaller resistor for battery voltage divider

#define R1s 10.0 ///< Resistor for solar panel voltage divider
#define R2s 10.0 ///< Resistor for solar panel voltage divider

#define sdWriteSize 8192 ///<Write data to the SD card in blocks of 8192 bytes
";

const PINS: &str = "#define LED GPIO_NUM_2
#define SD_CS GPIO_NUM_5 ///< SD card chip select pin
#define SONAR_RX GPIO_NUM_14 ///< Sonar sensor receive pin
#define SONAR_TX GPIO_NUM_32 ///< Sonar sensor transmit pin
#define SONAR_EN GPIO_NUM_33 ///< Sonar sensor enable pin
#define GPS_RX GPIO_NUM_16 ///< GPS receive pin
#define GPS_TX GPIO_NUM_17 ///< GPS transmit pin
#define GPS_EN GPIO_NUM_27 ///< GPS enable pin
#define TEMP_SENSOR_ADDRESS 0x44 ///< Temperature and humidity sensor hex address
#define TEMP_EN GPIO_NUM_15 ///< Temperature/humidity sensor enable pin
#define ADC_PIN GPIO_NUM_26
";

/// A `setup.h` ready to be written out.
///
/// Output depends only on the snapshot and the date, so two renders of the same
/// snapshot on the same day are byte-identical.
pub struct Header<'a> {
    pub snapshot: &'a Snapshot,
    pub date: NaiveDate,
}

impl<'a> Header<'a> {
    pub fn new(snapshot: &'a Snapshot, date: NaiveDate) -> Self {
        Self { snapshot, date }
    }

    fn banner(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/**")?;
        writeln!(f, " * @file setup.h")?;
        writeln!(f, " * @author WaterSense Configuration Tool")?;
        writeln!(f, " * @brief Auto-generated configuration file")?;
        writeln!(f, " * @version 0.1")?;
        writeln!(f, " * @date {}", self.date.format("%Y-%m-%d"))?;
        writeln!(f, " * ")?;
        writeln!(f, " * @copyright Copyright (c) 2023")?;
        writeln!(f, " * ")?;
        writeln!(f, " */")?;
        writeln!(f)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "//---------- Define Constants -------------------------------------------------------------------------||")?;
        writeln!(f)
    }

    fn modes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mode in Mode::ALL {
            let (brief, details) = mode.doc();
            writeln!(f, "/**")?;
            writeln!(f, " * @brief {}", brief)?;
            writeln!(f, " * @details {}", details)?;
            writeln!(f, " * ")?;
            writeln!(f, " */")?;
            let prefix = if self.snapshot.mode(mode) { "" } else { "//" };
            writeln!(f, "{}#define {}", prefix, mode)?;
            writeln!(f)?;
        }
        Ok(())
    }

    fn timings(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timing = |t: Timing| self.snapshot.timing(t);

        writeln!(f, "{}", TIMING_RULE)?;
        for t in READ_TIMINGS {
            writeln!(f, "#define {} {} //||", t, timing(t))?;
        }
        writeln!(f, "{}", TIMING_GAP)?;
        for t in ALLIGN_TIMINGS {
            writeln!(f, "#define {} {} //||", t, timing(t))?;
        }
        writeln!(f, "{}", TIMING_RULE)?;
        writeln!(f)?;

        writeln!(f, "#define GNSS_READ_TIME {}", timing(Timing::GnssReadTime))?;
        writeln!(f)?;
        writeln!(f, "#define GNSS_STANDALONE_SLEEP (uint64_t) 60 * 1000000///<us of sleep time")?;
        writeln!(f)?;
        writeln!(f, "#define WAKE_CYCLES 15 ///< Number of wake cycles between reset checks")?;
        writeln!(
            f,
            "#define FIX_DELAY {} ///< Seconds to wait for first GPS fix",
            timing(Timing::FixDelay)
        )?;
        writeln!(f)?;
        writeln!(f, "#define WATCH_TIMER 15*1000 ///< ms of hang time before triggering a reset")?;
        writeln!(f)
    }

    fn task_periods(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for period in TaskPeriod::ALL {
            writeln!(f, "#define {} {}", period, self.snapshot.task_period(period))?;
        }
        Ok(())
    }

    fn fixed(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(HARDWARE)?;
        writeln!(f)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "//---------- Define Pins ------------------------------------------------------------------------------||")?;
        writeln!(f)?;
        f.write_str(PINS)?;
        writeln!(f)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "{}", RULE)
    }
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.banner(f)?;
        self.modes(f)?;
        self.timings(f)?;
        self.task_periods(f)?;
        self.fixed(f)
    }
}

/// Renders `snapshot` as a complete header dated `date`.
pub fn render(snapshot: &Snapshot, date: NaiveDate) -> String {
    Header::new(snapshot, date).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionModel;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn banner_carries_the_date() {
        let out = render(&Snapshot::default(), date());
        assert!(out.starts_with("/**\n * @file setup.h\n * @author WaterSense Configuration Tool\n"));
        assert!(out.contains("\n * @date 2025-03-14\n * \n * @copyright Copyright (c) 2023\n * \n */\n\n"));
    }

    #[test]
    fn disabled_modes_are_commented_out() {
        let mut model = OptionModel::new();
        model.set_mode(Mode::Continuous, true);
        let out = render(model.snapshot(), date());

        assert!(out.contains("\n#define CONTINUOUS\n\n"));
        for mode in &Mode::ALL[1..] {
            assert!(out.contains(&format!("\n//#define {}\n\n", mode)), "{} not commented", mode);
            assert!(!out.contains(&format!("\n#define {}\n", mode)));
        }
    }

    #[test]
    fn mode_doc_comment_precedes_define() {
        let out = render(&Snapshot::default(), date());
        assert!(out.contains(
            "/**\n * @brief Define this constant to enable Radar instead of Ultrasonic\n * @details enables taskRadar\n * \n */\n//#define RADAR\n\n"
        ));
    }

    #[test]
    fn timing_block_layout() {
        let out = render(&Snapshot::default(), date());
        let expected = "\
//----------------------||
#define HI_READ 300 //||
#define MID_READ 120 //||
#define LOW_READ 60 //||
//                    //||
#define HI_ALLIGN 10 //||
#define MID_ALLIGN 30 //||
#define LOW_ALLIGN 60 //||
//----------------------||

#define GNSS_READ_TIME 7200

#define GNSS_STANDALONE_SLEEP (uint64_t) 60 * 1000000///<us of sleep time

#define WAKE_CYCLES 15 ///< Number of wake cycles between reset checks
#define FIX_DELAY 120 ///< Seconds to wait for first GPS fix

#define WATCH_TIMER 15*1000 ///< ms of hang time before triggering a reset

#define MEASUREMENT_PERIOD 100
#define SD_PERIOD 10
#define CLOCK_PERIOD 100
#define SLEEP_PERIOD 100
#define VOLTAGE_PERIOD 1000
#define WATCHDOG_PERIOD 100
#define RADAR_TASK_PERIOD 100

#define R1b 9.25 ///< Larger resistor for battery voltage divider
";
        assert!(out.contains(expected));
    }

    #[test]
    fn expressions_are_written_as_entered() {
        let mut model = OptionModel::new();
        model.edit_timing(Timing::GnssReadTime, "60 * 60 * 2").unwrap();
        let out = render(model.snapshot(), date());
        assert!(out.contains("\n#define GNSS_READ_TIME 60 * 60 * 2\n"));
    }

    #[test]
    fn fixed_tail_is_verbatim() {
        let out = render(&Snapshot::default(), date());
        assert!(out.contains("#define sdWriteSize 8192 ///<Write data to the SD card in blocks of 8192 bytes\n\n"));
        assert!(out.contains("#define TEMP_SENSOR_ADDRESS 0x44 ///< Temperature and humidity sensor hex address\n"));
        assert!(out.ends_with(&format!("#define ADC_PIN GPIO_NUM_26\n\n{}\n{}\n", RULE, RULE)));
    }

    #[test]
    fn same_day_renders_are_identical() {
        let mut model = OptionModel::new();
        model.reset();
        assert_eq!(render(model.snapshot(), date()), render(&model.snapshot().clone(), date()));
    }
}
