//! Mutual exclusion between the GNSS-related modes.
//!
//! STANDALONE, NO_SURVEY and LEGACY select different clock and sensor setups
//! in the firmware, so at most one of them may be defined. Enabling one clears
//! the modes it excludes and keeps them locked until it is disabled again.
//! CONTINUOUS, RADAR and VARIABLE_DUTY combine freely with everything.

use crate::model::{Mode, Snapshot};

/// Modes cleared and locked while `mode` is enabled.
pub fn excludes(mode: Mode) -> &'static [Mode] {
    match mode {
        Mode::Standalone => &[Mode::NoSurvey],
        Mode::NoSurvey => &[Mode::Standalone, Mode::Legacy],
        Mode::Legacy => &[Mode::NoSurvey, Mode::Standalone],
        _ => &[],
    }
}

/// The enabled mode holding `mode` locked, if any.
pub fn locked_by(snapshot: &Snapshot, mode: Mode) -> Option<Mode> {
    snapshot.enabled_modes().find(|m| excludes(*m).contains(&mode))
}

/// Modes that must be switched off once `mode` is written as `value`.
///
/// Besides the modes `mode` excludes, this also clears an enabled mode that
/// holds `mode` locked. Such a write can only come from a load, never from the
/// form, and the latest write wins.
pub fn cleared_by(snapshot: &Snapshot, mode: Mode, value: bool) -> Vec<Mode> {
    if !value {
        return Vec::new();
    }
    snapshot
        .enabled_modes()
        .filter(|m| *m != mode && (excludes(mode).contains(m) || excludes(*m).contains(&mode)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionModel;

    const EXCLUSIVE: [Mode; 3] = [Mode::Standalone, Mode::NoSurvey, Mode::Legacy];

    #[test]
    fn enabling_one_clears_the_other_two() {
        for mode in EXCLUSIVE {
            let mut model = OptionModel::new();
            for other in EXCLUSIVE {
                model.set_mode(other, true);
            }
            model.set_mode(mode, true);

            for other in EXCLUSIVE.into_iter().filter(|m| *m != mode) {
                assert!(!model.mode(other), "{} left {} enabled", mode, other);
            }
            assert!(model.mode(mode));
        }
    }

    #[test]
    fn standalone_locks_only_no_survey() {
        let mut model = OptionModel::new();
        model.set_mode(Mode::Standalone, true);

        assert_eq!(model.locked_by(Mode::NoSurvey), Some(Mode::Standalone));
        assert_eq!(model.locked_by(Mode::Legacy), None);
        assert_eq!(model.locked_by(Mode::Standalone), None);

        model.set_mode(Mode::Standalone, false);
        assert!(model.is_editable(Mode::NoSurvey));
    }

    #[test]
    fn no_survey_and_legacy_lock_both_others() {
        let mut model = OptionModel::new();
        model.set_mode(Mode::NoSurvey, true);
        assert_eq!(model.locked_by(Mode::Standalone), Some(Mode::NoSurvey));
        assert_eq!(model.locked_by(Mode::Legacy), Some(Mode::NoSurvey));

        model.set_mode(Mode::Legacy, true);
        assert!(!model.mode(Mode::NoSurvey));
        assert_eq!(model.locked_by(Mode::Standalone), Some(Mode::Legacy));
        assert_eq!(model.locked_by(Mode::NoSurvey), Some(Mode::Legacy));
        assert!(model.is_editable(Mode::Legacy));

        model.set_mode(Mode::Legacy, false);
        for mode in EXCLUSIVE {
            assert!(model.is_editable(mode));
        }
    }

    #[test]
    fn standalone_over_legacy_wins() {
        let mut model = OptionModel::new();
        model.set_mode(Mode::Legacy, true);
        model.set_mode(Mode::Standalone, true);

        assert!(model.mode(Mode::Standalone));
        assert!(!model.mode(Mode::Legacy));
    }

    #[test]
    fn independent_modes_are_untouched() {
        let mut model = OptionModel::new();
        for mode in [Mode::Continuous, Mode::Radar, Mode::VariableDuty] {
            model.set_mode(mode, true);
        }
        for mode in EXCLUSIVE {
            model.set_mode(mode, true);
        }
        assert!(model.mode(Mode::Continuous));
        assert!(model.mode(Mode::Radar));
        assert!(model.mode(Mode::VariableDuty));
        assert!(excludes(Mode::Radar).is_empty());
    }

    #[test]
    fn disabling_clears_nothing() {
        let snapshot = Snapshot::default();
        assert!(cleared_by(&snapshot, Mode::Legacy, false).is_empty());
    }
}
