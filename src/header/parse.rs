use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Mode, OptionModel, Snapshot, TaskPeriod, Timing, TimingValue};

/// How a load treats modes the header does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Keep them as they are. Used for the project header at startup.
    Merge,
    /// Switch every mode off before applying the header. Used for explicit loads.
    Replace,
}

/// What a load found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub modes: Vec<Mode>,
    pub timings: Vec<Timing>,
    pub task_periods: Vec<TaskPeriod>,
}

impl ParseReport {
    /// `CONTINUOUS, RADAR`, or `None`.
    pub fn modes_text(&self) -> String {
        if self.modes.is_empty() {
            return "None".to_string();
        }
        self.modes.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
    }
}

struct Patterns {
    modes: Vec<(Mode, Regex)>,
    timings: Vec<(Timing, Regex)>,
    task_periods: Vec<(TaskPeriod, Regex)>,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        modes: Mode::ALL.map(|m| (m, flag_pattern(m.name()))).into(),
        timings: Timing::ALL.map(|t| (t, value_pattern(t.name()))).into(),
        task_periods: TaskPeriod::ALL.map(|p| (p, value_pattern(p.name()))).into(),
    })
}

// `#define NAME` alone on its line.
fn flag_pattern(name: &str) -> Regex {
    Regex::new(&format!(r"(?m)^#define[ \t]+{}[ \t\r]*$", regex::escape(name))).expect("flag pattern")
}

// `#define NAME value`, value running up to a `//` comment or the end of the line.
fn value_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r"(?m)#define[ \t]+{}[ \t]+([^/\r\n][^\r\n]*?)[ \t\r]*(?://|$)",
        regex::escape(name)
    ))
    .expect("value pattern")
}

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().trim())
}

/// Applies the values found in `text` to `model`.
///
/// Each field is looked up on its own; a field that is missing or malformed
/// leaves the model's value untouched and does not affect the others.
pub fn apply_header(model: &mut OptionModel, text: &str, load: LoadMode) -> ParseReport {
    let patterns = patterns();
    let mut report = ParseReport::default();

    if load == LoadMode::Replace {
        model.clear_modes();
    }

    for (mode, re) in &patterns.modes {
        if re.is_match(text) {
            model.set_mode(*mode, true);
            report.modes.push(*mode);
        }
    }

    for (timing, re) in &patterns.timings {
        if let Some(raw) = capture(re, text) {
            model.set_timing(*timing, TimingValue::normalized(raw));
            report.timings.push(*timing);
        }
    }

    for (period, re) in &patterns.task_periods {
        let Some(raw) = capture(re, text) else { continue };
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            log::debug!("ignoring {} = `{}`: not an integer literal", period, raw);
            continue;
        }
        match raw.parse() {
            Ok(value) => {
                model.set_task_period(*period, value);
                report.task_periods.push(*period);
            }
            Err(e) => log::debug!("ignoring {} = `{}`: {}", period, raw, e),
        }
    }

    log::debug!("parsed header: {:?}", report);
    report
}

/// Reads a header into a snapshot starting from defaults.
pub fn parse(text: &str) -> Snapshot {
    let mut model = OptionModel::new();
    apply_header(&mut model, text, LoadMode::Replace);
    model.snapshot().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hand-edited header in the style kept in firmware repositories.
    const HAND_WRITTEN: &str = "\
/**
 * @brief Define this constant to enable continuous measurements
 *
 */
#define CONTINUOUS

#define SCL 4
#define MAX_FILESIZE 50*1024 //max size a file can be in kb

//#define VARIABLE_DUTY ///< Define this constant to enable variable duty cycle
//----------------------||
#define HI_READ 60*5 //||
#define MID_READ 60*2 //||
#define LOW_READ 60*1 //||
//                    //||
#define HI_ALLIGN 10 //||
//----------------------||

#define GNSS_READ_TIME 60 * 60 * 20 //in seconds
#define GNSS_STANDALONE_SLEEP (uint64_t) 60 * 1000000///<us of sleep time
#define FIX_DELAY 60*2 ///< Seconds to wait for first GPS fix
// #define FIX_DELAY 1 ///< Seconds to wait for first GPS fix

#define MEASUREMENT_PERIOD 100 ///< Measurement task period in ms
#define SD_PERIOD 20 ///< SD task period in ms
#define VOLTAGE_PERIOD 10*100
";

    #[test]
    fn expression_values_are_evaluated() {
        let mut model = OptionModel::new();
        let report = apply_header(&mut model, "#define HI_READ 60*5\n", LoadMode::Merge);

        assert_eq!(model.timing(Timing::HiRead).as_str(), "300");
        assert_eq!(report.timings, vec![Timing::HiRead]);
        assert!(report.modes.is_empty());
        assert_eq!(model.timing(Timing::MidRead).as_str(), "120");
    }

    #[test]
    fn hand_written_header() {
        let mut model = OptionModel::new();
        let report = apply_header(&mut model, HAND_WRITTEN, LoadMode::Replace);

        assert_eq!(report.modes, vec![Mode::Continuous]);
        assert!(!model.mode(Mode::VariableDuty));
        assert_eq!(model.timing(Timing::HiRead).as_str(), "300");
        assert_eq!(model.timing(Timing::MidRead).as_str(), "120");
        assert_eq!(model.timing(Timing::LowRead).as_str(), "60");
        assert_eq!(model.timing(Timing::GnssReadTime).as_str(), "72000");
        assert_eq!(model.timing(Timing::FixDelay).as_str(), "120");
        assert_eq!(model.task_period(TaskPeriod::Sd), 20);
        // Not a literal, so the default stays.
        assert_eq!(model.task_period(TaskPeriod::Voltage), 1000);
        assert_eq!(report.task_periods, vec![TaskPeriod::Measurement, TaskPeriod::Sd]);
    }

    #[test]
    fn unevaluable_timing_is_kept_verbatim() {
        let mut model = OptionModel::new();
        apply_header(&mut model, "#define HI_READ READ_BASE*2 //||\n", LoadMode::Merge);
        assert_eq!(model.timing(Timing::HiRead).as_str(), "READ_BASE*2");
    }

    #[test]
    fn flag_must_stand_alone_on_its_line() {
        let text = concat!(
            "  #define CONTINUOUS\n",
            "//#define STANDALONE\n",
            "#define RADAR 1\n",
            "#define LEGACY ///< comment\n",
            "#define VARIABLE_DUTY   \r\n",
        );
        let mut model = OptionModel::new();
        let report = apply_header(&mut model, text, LoadMode::Replace);
        assert_eq!(report.modes, vec![Mode::VariableDuty]);
    }

    #[test]
    fn runaway_nesting_keeps_raw_text_and_other_fields() {
        let depth = 200_000;
        let text = format!(
            "#define HI_READ {}1{} //||\n#define FIX_DELAY 30\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let mut model = OptionModel::new();
        let report = apply_header(&mut model, &text, LoadMode::Merge);

        assert_eq!(report.timings, vec![Timing::HiRead, Timing::FixDelay]);
        assert_eq!(model.timing(Timing::HiRead).as_str().len(), 2 * depth + 1);
        assert_eq!(model.timing(Timing::FixDelay).as_str(), "30");
    }

    #[test]
    fn merge_keeps_unmatched_modes() {
        let mut model = OptionModel::new();
        model.set_mode(Mode::Standalone, true);
        model.set_mode(Mode::Radar, true);

        apply_header(&mut model, "#define CONTINUOUS\n", LoadMode::Merge);
        assert!(model.mode(Mode::Standalone));
        assert!(model.mode(Mode::Radar));
        assert!(model.mode(Mode::Continuous));
    }

    #[test]
    fn no_survey_alone_merge_versus_replace() {
        let header = "#define NO_SURVEY\n";

        let mut merged = OptionModel::new();
        merged.set_mode(Mode::Radar, true);
        apply_header(&mut merged, header, LoadMode::Merge);
        assert!(merged.mode(Mode::NoSurvey));
        assert!(merged.mode(Mode::Radar));
        assert!(!merged.mode(Mode::Standalone));
        assert!(!merged.mode(Mode::Legacy));

        let mut replaced = OptionModel::new();
        replaced.set_mode(Mode::Radar, true);
        replaced.set_mode(Mode::Legacy, true);
        apply_header(&mut replaced, header, LoadMode::Replace);
        assert!(replaced.mode(Mode::NoSurvey));
        assert!(!replaced.mode(Mode::Radar));
        assert!(!replaced.mode(Mode::Legacy));
        assert!(!replaced.mode(Mode::Standalone));
    }

    #[test]
    fn conflicting_header_resolves_in_header_order() {
        let mut model = OptionModel::new();
        let report = apply_header(&mut model, "#define STANDALONE\n#define LEGACY\n", LoadMode::Replace);

        assert_eq!(report.modes, vec![Mode::Standalone, Mode::Legacy]);
        assert!(!model.mode(Mode::Standalone));
        assert!(model.mode(Mode::Legacy));
    }

    #[test]
    fn malformed_document_changes_nothing() {
        let mut model = OptionModel::new();
        model.reset();
        let before = model.snapshot().clone();

        let report = apply_header(&mut model, "\u{0}garbage\n#define\n#define HI_READ //||\n", LoadMode::Merge);
        assert_eq!(report, ParseReport::default());
        assert_eq!(*model.snapshot(), before);
        assert_eq!(report.modes_text(), "None");
    }

    #[test]
    fn names_do_not_match_as_prefixes() {
        let mut model = OptionModel::new();
        apply_header(&mut model, "#define HI_READ_MAX 5\n#define RADAR_TASK 3\n", LoadMode::Merge);
        assert_eq!(*model.snapshot(), Snapshot::default());
    }
}
