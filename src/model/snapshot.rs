use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::fields::{Mode, TaskPeriod, Timing};
use crate::expr;

/// Timing values are kept as text so an expression typed by hand survives until
/// it is next evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimingValue(String);

impl TimingValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().trim().to_string())
    }

    /// Replaces evaluable text with its integer value, keeping it verbatim otherwise.
    pub fn normalized(text: &str) -> Self {
        match expr::eval(text) {
            Ok(v) => Self(v.to_string()),
            Err(e) => {
                log::debug!("keeping `{}` as written: {}", text.trim(), e);
                Self::new(text)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn evaluate(&self) -> Option<u64> {
        expr::eval(&self.0).ok()
    }
}

impl fmt::Display for TimingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Every value that ends up in a generated header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    modes: [bool; Mode::COUNT],
    timings: [TimingValue; Timing::COUNT],
    task_periods: [u32; TaskPeriod::COUNT],
}

impl Default for Snapshot {
    /// Every mode off, every value at its default.
    fn default() -> Self {
        Self {
            modes: [false; Mode::COUNT],
            timings: Timing::ALL.map(|t| TimingValue::new(t.default_value())),
            task_periods: TaskPeriod::ALL.map(TaskPeriod::default_value),
        }
    }
}

impl Snapshot {
    pub fn mode(&self, mode: Mode) -> bool {
        self.modes[mode.index()]
    }

    pub fn timing(&self, timing: Timing) -> &TimingValue {
        &self.timings[timing.index()]
    }

    pub fn task_period(&self, period: TaskPeriod) -> u32 {
        self.task_periods[period.index()]
    }

    pub fn enabled_modes(&self) -> impl Iterator<Item = Mode> + '_ {
        Mode::ALL.into_iter().filter(move |m| self.mode(*m))
    }

    pub(super) fn put_mode(&mut self, mode: Mode, value: bool) {
        self.modes[mode.index()] = value;
    }

    pub(super) fn put_timing(&mut self, timing: Timing, value: TimingValue) {
        self.timings[timing.index()] = value;
    }

    pub(super) fn put_task_period(&mut self, period: TaskPeriod, value: u32) {
        self.task_periods[period.index()] = value;
    }
}

struct Entries<V>(Vec<(&'static str, V)>);

impl<V: Serialize> Serialize for Entries<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

impl Serialize for Snapshot {
    /// Named maps in header order rather than bare arrays.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let modes = Entries(Mode::ALL.iter().map(|m| (m.name(), self.mode(*m))).collect());
        let timings = Entries(Timing::ALL.iter().map(|t| (t.name(), self.timing(*t))).collect());
        let task_periods = Entries(TaskPeriod::ALL.iter().map(|p| (p.name(), self.task_period(*p))).collect());

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("modes", &modes)?;
        map.serialize_entry("timings", &timings)?;
        map.serialize_entry("task_periods", &task_periods)?;
        map.end()
    }
}
