mod fields;
mod snapshot;

use std::fmt;

use thiserror::Error;

pub use self::fields::{Field, Mode, TaskPeriod, Timing, UnknownField};
pub use self::snapshot::{Snapshot, TimingValue};
use crate::conflict;

/// A single effective change to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Mode {
        mode: Mode,
        value: bool,
        /// Set when the conflict rules switched the mode off.
        forced_by: Option<Mode>,
    },
    Timing {
        timing: Timing,
        value: TimingValue,
    },
    TaskPeriod {
        period: TaskPeriod,
        value: u32,
    },
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("{mode} is locked while {by} is enabled")]
    Locked { mode: Mode, by: Mode },
    #[error(transparent)]
    UnknownField(#[from] UnknownField),
    #[error("{period} takes a whole number of milliseconds, got `{value}`")]
    NotAnInteger { period: TaskPeriod, value: String },
    #[error("{mode} takes on/off, got `{value}`")]
    NotAFlag { mode: Mode, value: String },
    #[error("{timing} needs a single-line value without `//`")]
    BadTiming { timing: Timing },
}

type Listener = Box<dyn FnMut(&Change)>;

/// Current form state plus the subscribers watching it.
///
/// `set_*` writes come from loads and resets and are never refused. `edit_*`
/// writes come from the user and respect the conflict locks.
pub struct OptionModel {
    snapshot: Snapshot,
    listeners: Vec<Listener>,
}

impl fmt::Debug for OptionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionModel")
            .field("snapshot", &self.snapshot)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for OptionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionModel {
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            listeners: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn mode(&self, mode: Mode) -> bool {
        self.snapshot.mode(mode)
    }

    pub fn timing(&self, timing: Timing) -> &TimingValue {
        self.snapshot.timing(timing)
    }

    pub fn task_period(&self, period: TaskPeriod) -> u32 {
        self.snapshot.task_period(period)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Change) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn locked_by(&self, mode: Mode) -> Option<Mode> {
        conflict::locked_by(&self.snapshot, mode)
    }

    pub fn is_editable(&self, mode: Mode) -> bool {
        self.locked_by(mode).is_none()
    }

    pub fn set_mode(&mut self, mode: Mode, value: bool) {
        if self.snapshot.mode(mode) == value {
            return;
        }
        let cleared = conflict::cleared_by(&self.snapshot, mode, value);

        self.snapshot.put_mode(mode, value);
        self.notify(Change::Mode {
            mode,
            value,
            forced_by: None,
        });

        for other in cleared {
            self.snapshot.put_mode(other, false);
            self.notify(Change::Mode {
                mode: other,
                value: false,
                forced_by: Some(mode),
            });
        }
    }

    pub fn set_timing(&mut self, timing: Timing, value: TimingValue) {
        if *self.snapshot.timing(timing) == value {
            return;
        }
        self.snapshot.put_timing(timing, value.clone());
        self.notify(Change::Timing { timing, value });
    }

    pub fn set_task_period(&mut self, period: TaskPeriod, value: u32) {
        if self.snapshot.task_period(period) == value {
            return;
        }
        self.snapshot.put_task_period(period, value);
        self.notify(Change::TaskPeriod { period, value });
    }

    pub fn edit_mode(&mut self, mode: Mode, value: bool) -> Result<(), EditError> {
        if self.mode(mode) == value {
            return Ok(());
        }
        if let Some(by) = self.locked_by(mode) {
            return Err(EditError::Locked { mode, by });
        }
        self.set_mode(mode, value);
        Ok(())
    }

    /// Flips `mode`, returning its new value.
    pub fn toggle_mode(&mut self, mode: Mode) -> Result<bool, EditError> {
        let value = !self.mode(mode);
        self.edit_mode(mode, value)?;
        Ok(value)
    }

    pub fn edit_timing(&mut self, timing: Timing, text: &str) -> Result<(), EditError> {
        let text = text.trim();
        // A `//` would start the header comment and cut the value short on reload.
        if text.is_empty() || text.contains('\n') || text.contains("//") {
            return Err(EditError::BadTiming { timing });
        }
        self.set_timing(timing, TimingValue::new(text));
        Ok(())
    }

    pub fn edit_task_period(&mut self, period: TaskPeriod, text: &str) -> Result<(), EditError> {
        let value = text.trim().parse().map_err(|_| EditError::NotAnInteger {
            period,
            value: text.to_string(),
        })?;
        self.set_task_period(period, value);
        Ok(())
    }

    /// Edits any field by name, coercing `text` to the field's type.
    pub fn edit(&mut self, name: &str, text: &str) -> Result<Field, EditError> {
        let field: Field = name.parse()?;
        match field {
            Field::Mode(mode) => {
                let value = parse_flag(text).ok_or_else(|| EditError::NotAFlag {
                    mode,
                    value: text.to_string(),
                })?;
                self.edit_mode(mode, value)?
            }
            Field::Timing(timing) => self.edit_timing(timing, text)?,
            Field::TaskPeriod(period) => self.edit_task_period(period, text)?,
        }
        Ok(field)
    }

    pub fn clear_modes(&mut self) {
        for mode in Mode::ALL {
            self.set_mode(mode, false);
        }
    }

    /// Back to defaults, with the NO_SURVEY + RADAR setup most stations run.
    pub fn reset(&mut self) {
        self.clear_modes();
        for timing in Timing::ALL {
            self.set_timing(timing, TimingValue::new(timing.default_value()));
        }
        for period in TaskPeriod::ALL {
            self.set_task_period(period, period.default_value());
        }
        self.set_mode(Mode::NoSurvey, true);
        self.set_mode(Mode::Radar, true);
    }

    fn notify(&mut self, change: Change) {
        log::trace!("{:?}", change);
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
