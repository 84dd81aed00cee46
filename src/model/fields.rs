use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field `{0}`")]
pub struct UnknownField(pub String);

/// Compile-time feature toggles of the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Continuous,
    Standalone,
    NoSurvey,
    Legacy,
    Radar,
    VariableDuty,
}

impl Mode {
    pub const COUNT: usize = 6;

    /// Header order.
    pub const ALL: [Mode; Self::COUNT] = [
        Mode::Continuous,
        Mode::Standalone,
        Mode::NoSurvey,
        Mode::Legacy,
        Mode::Radar,
        Mode::VariableDuty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Continuous => "CONTINUOUS",
            Mode::Standalone => "STANDALONE",
            Mode::NoSurvey => "NO_SURVEY",
            Mode::Legacy => "LEGACY",
            Mode::Radar => "RADAR",
            Mode::VariableDuty => "VARIABLE_DUTY",
        }
    }

    /// Short form label.
    pub fn summary(self) -> &'static str {
        match self {
            Mode::Continuous => "Always-on (no sleep)",
            Mode::Standalone => "GNSS only",
            Mode::NoSurvey => "GNSS timing + sensors",
            Mode::Legacy => "v3 Adafruit GPS",
            Mode::Radar => "Radar sensor",
            Mode::VariableDuty => "Adaptive power",
        }
    }

    /// `@brief` and `@details` lines of the header doc-comment.
    pub fn doc(self) -> (&'static str, &'static str) {
        match self {
            Mode::Continuous => (
                "Define this constant to enable continuous measurements",
                "Writes data to the SD card at the specified read intervals but does not sleep",
            ),
            Mode::Standalone => (
                "Define this constant to enable standalone GNSS measurements (no sonar or temp)",
                "Writes data to the SD card with minimal sleep time",
            ),
            Mode::NoSurvey => (
                "Define this constant to disable GNSS measurements (only used as clock)",
                "Writes data to the SD card with minimal sleep time",
            ),
            Mode::Legacy => (
                "Define this constant to enable v3 Adafruit Ultimate Breakout GPS (no sonar or temp)",
                "enables taskClock2",
            ),
            Mode::Radar => (
                "Define this constant to enable Radar instead of Ultrasonic",
                "enables taskRadar",
            ),
            Mode::VariableDuty => (
                "Define this constant to enable variable duty cycle",
                "If undefined, HI_READ and HI_ALLIGN are used",
            ),
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Duty-cycle timing constants, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timing {
    HiRead,
    MidRead,
    LowRead,
    HiAllign,
    MidAllign,
    LowAllign,
    GnssReadTime,
    FixDelay,
}

impl Timing {
    pub const COUNT: usize = 8;

    pub const ALL: [Timing; Self::COUNT] = [
        Timing::HiRead,
        Timing::MidRead,
        Timing::LowRead,
        Timing::HiAllign,
        Timing::MidAllign,
        Timing::LowAllign,
        Timing::GnssReadTime,
        Timing::FixDelay,
    ];

    /// The subset shown on the form, with its label.
    pub const KEY: [(Timing, &'static str); 4] = [
        (Timing::HiRead, "Read Interval (sec)"),
        (Timing::HiAllign, "Time Align (sec)"),
        (Timing::GnssReadTime, "GNSS Update (sec)"),
        (Timing::FixDelay, "GPS Fix Delay (sec)"),
    ];

    pub fn name(self) -> &'static str {
        match self {
            Timing::HiRead => "HI_READ",
            Timing::MidRead => "MID_READ",
            Timing::LowRead => "LOW_READ",
            Timing::HiAllign => "HI_ALLIGN",
            Timing::MidAllign => "MID_ALLIGN",
            Timing::LowAllign => "LOW_ALLIGN",
            Timing::GnssReadTime => "GNSS_READ_TIME",
            Timing::FixDelay => "FIX_DELAY",
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            Timing::HiRead => "300",
            Timing::MidRead => "120",
            Timing::LowRead => "60",
            Timing::HiAllign => "10",
            Timing::MidAllign => "30",
            Timing::LowAllign => "60",
            Timing::GnssReadTime => "7200",
            Timing::FixDelay => "120",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Scheduler task intervals, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskPeriod {
    Measurement,
    Sd,
    Clock,
    Sleep,
    Voltage,
    Watchdog,
    RadarTask,
}

impl TaskPeriod {
    pub const COUNT: usize = 7;

    pub const ALL: [TaskPeriod; Self::COUNT] = [
        TaskPeriod::Measurement,
        TaskPeriod::Sd,
        TaskPeriod::Clock,
        TaskPeriod::Sleep,
        TaskPeriod::Voltage,
        TaskPeriod::Watchdog,
        TaskPeriod::RadarTask,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskPeriod::Measurement => "MEASUREMENT_PERIOD",
            TaskPeriod::Sd => "SD_PERIOD",
            TaskPeriod::Clock => "CLOCK_PERIOD",
            TaskPeriod::Sleep => "SLEEP_PERIOD",
            TaskPeriod::Voltage => "VOLTAGE_PERIOD",
            TaskPeriod::Watchdog => "WATCHDOG_PERIOD",
            TaskPeriod::RadarTask => "RADAR_TASK_PERIOD",
        }
    }

    pub fn default_value(self) -> u32 {
        match self {
            TaskPeriod::Voltage => 1000,
            TaskPeriod::Sd => 10,
            _ => 100,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Any user-editable value, addressed by its header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Mode(Mode),
    Timing(Timing),
    TaskPeriod(TaskPeriod),
}

macro_rules! impl_name_traits {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownField;

            /// Accepts the header spelling in any case, `-` standing in for `_`.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
                $ty::ALL
                    .into_iter()
                    .find(|v| v.name() == wanted)
                    .ok_or_else(|| UnknownField(s.to_string()))
            }
        }
    };
}

impl_name_traits!(Mode);
impl_name_traits!(Timing);
impl_name_traits!(TaskPeriod);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(Field::Mode)
            .or_else(|_| s.parse().map(Field::Timing))
            .or_else(|_| s.parse().map(Field::TaskPeriod))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Mode(m) => m.fmt(f),
            Field::Timing(t) => t.fmt(f),
            Field::TaskPeriod(p) => p.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_loosely() {
        assert_eq!("no-survey".parse::<Mode>(), Ok(Mode::NoSurvey));
        assert_eq!("HI_ALLIGN".parse::<Timing>(), Ok(Timing::HiAllign));
        assert_eq!(" sd_period ".parse::<TaskPeriod>(), Ok(TaskPeriod::Sd));
        assert!("HI_ALIGN".parse::<Timing>().is_err());
    }

    #[test]
    fn field_dispatches_on_kind() {
        assert_eq!("radar".parse::<Field>(), Ok(Field::Mode(Mode::Radar)));
        assert_eq!("radar_task_period".parse::<Field>(), Ok(Field::TaskPeriod(TaskPeriod::RadarTask)));
        assert_eq!("fix_delay".parse::<Field>(), Ok(Field::Timing(Timing::FixDelay)));
        assert_eq!("WATCH_TIMER".parse::<Field>(), Err(UnknownField("WATCH_TIMER".into())));
    }

    #[test]
    fn order_matches_index() {
        for (i, m) in Mode::ALL.into_iter().enumerate() {
            assert_eq!(m.index(), i);
        }
        for (i, t) in Timing::ALL.into_iter().enumerate() {
            assert_eq!(t.index(), i);
        }
        for (i, p) in TaskPeriod::ALL.into_iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }
}
