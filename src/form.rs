//! Line-driven terminal form over the option model.
//!
//! Every command runs to completion before the next line is read. Failures
//! print an `error:` block and leave the form usable.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate};
use log::warn;

use crate::header::LoadMode;
use crate::model::{Change, Mode, OptionModel, Timing};
use crate::project::{self, Project};

const HELP: &str = "\
commands:
  toggle <MODE>          flip a mode
  on <MODE> | off <MODE> switch a mode on or off
  set <NAME> <VALUE>     set a timing value or task period (or a mode, on/off)
  show                   redraw the form
  apply                  write src/setup.h in place (previous file kept as .backup)
  save <PATH>            write the header to PATH
  load <PATH>            load a header, replacing all modes
  reset                  restore defaults (NO_SURVEY + RADAR)
  help                   this text
  quit                   leave";

const CONFLICTS: &str = "Auto-resolves conflicts: STANDALONE x NO_SURVEY, LEGACY x NO_SURVEY/STANDALONE";

enum Flow {
    Continue,
    Quit,
}

pub struct Form {
    model: OptionModel,
    project: Project,
    status: String,
    notes: Rc<RefCell<Vec<String>>>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Form {
    pub fn new(project: Project) -> Self {
        let notes = Rc::new(RefCell::new(Vec::new()));
        let mut model = OptionModel::new();

        let sink = notes.clone();
        model.subscribe(move |change| {
            if let Change::Mode {
                mode,
                forced_by: Some(by),
                ..
            } = change
            {
                sink.borrow_mut().push(format!("{} switched off: conflicts with {}", mode, by));
            }
        });

        Self {
            model,
            project,
            status: "Ready - configure above and run `apply`".to_string(),
            notes,
            today: local_today,
        }
    }

    /// Fixes the date stamped into written headers.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn model(&self) -> &OptionModel {
        &self.model
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Pre-populates the form from the project header, if there is one.
    pub fn load_current(&mut self) {
        match self.project.load_current(&mut self.model) {
            Ok(Some(report)) => log::info!("current configuration: modes {}", report.modes_text()),
            Ok(None) => {}
            Err(e) => warn!("Error loading current config: {}", e),
        }
        self.notes.borrow_mut().clear();
    }

    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        self.draw(&mut out)?;
        for line in input.lines() {
            let line = line?;
            if let Flow::Quit = self.handle(&line, &mut out)? {
                break;
            }
        }
        out.flush()
    }

    fn handle(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let result = match cmd {
            "" | "show" => return self.draw(out).map(|_| Flow::Continue),
            "help" | "?" => {
                writeln!(out, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "toggle" => self.toggle(rest),
            "on" => self.switch(rest, true),
            "off" => self.switch(rest, false),
            "set" => self.set(rest),
            "apply" => self.apply(),
            "save" => self.save(rest),
            "load" => self.load(rest),
            "reset" => Ok(self.reset()),
            other => Err(anyhow!("unknown command `{}`, try `help`", other)),
        };

        for note in self.notes.borrow_mut().drain(..) {
            writeln!(out, "  {}", note)?;
        }
        match result {
            Ok(status) => self.status = status,
            Err(e) => {
                writeln!(out, "error: {:#}", e)?;
                self.status = format!("FAILED: {}", e);
            }
        }
        writeln!(out, "Status: {}", self.status)?;
        Ok(Flow::Continue)
    }

    fn toggle(&mut self, rest: &str) -> anyhow::Result<String> {
        let mode: Mode = rest.parse()?;
        let value = self.model.toggle_mode(mode)?;
        Ok(format!("{} {}", mode, on_off(value)))
    }

    fn switch(&mut self, rest: &str, value: bool) -> anyhow::Result<String> {
        let mode: Mode = rest.parse()?;
        self.model.edit_mode(mode, value)?;
        Ok(format!("{} {}", mode, on_off(value)))
    }

    fn set(&mut self, rest: &str) -> anyhow::Result<String> {
        let Some((name, value)) = rest.split_once(char::is_whitespace) else {
            bail!("usage: set <NAME> <VALUE>");
        };
        let field = self.model.edit(name, value)?;
        Ok(format!("{} = {}", field, value.trim()))
    }

    fn apply(&mut self) -> anyhow::Result<String> {
        let path = self
            .project
            .apply(&self.model, (self.today)())
            .context("Failed to apply configuration")?;
        Ok(format!(
            "Applied to {}! Ready to build: pio run --target upload",
            path.display()
        ))
    }

    fn save(&mut self, rest: &str) -> anyhow::Result<String> {
        if rest.is_empty() {
            bail!("usage: save <PATH>");
        }
        let path = Path::new(rest);
        project::save(&self.model, path, (self.today)(), &self.project.layout.backup_suffix).context("Save failed")?;
        Ok(format!("Saved as {}", file_name(path)))
    }

    fn load(&mut self, rest: &str) -> anyhow::Result<String> {
        if rest.is_empty() {
            bail!("usage: load <PATH>");
        }
        let path = Path::new(rest);
        let report = project::load(&mut self.model, path, LoadMode::Replace).context("Load failed")?;
        // Replace-mode loads clear every mode first; those are not conflicts.
        self.notes.borrow_mut().clear();
        Ok(format!("Loaded {} - Modes: {}", file_name(path), report.modes_text()))
    }

    fn reset(&mut self) -> String {
        self.model.reset();
        self.notes.borrow_mut().clear();
        "Reset complete - NO_SURVEY + RADAR enabled".to_string()
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "WaterSense Configuration")?;
        writeln!(out)?;
        writeln!(out, "Operating Modes")?;
        for pair in Mode::ALL.chunks(2) {
            let cells: Vec<String> = pair.iter().map(|m| self.mode_cell(*m)).collect();
            writeln!(out, "  {}", cells.join("  ").trim_end())?;
        }
        writeln!(out, "  {}", CONFLICTS)?;
        writeln!(out)?;
        writeln!(out, "Key Timing Settings")?;
        for pair in Timing::KEY.chunks(2) {
            let cells: Vec<String> = pair
                .iter()
                .map(|(t, label)| format!("{:<20} {:<8}", label, self.model.timing(*t)))
                .collect();
            writeln!(out, "  {}", cells.join("  ").trim_end())?;
        }
        writeln!(out)?;
        writeln!(out, "Status: {}", self.status)
    }

    fn mode_cell(&self, mode: Mode) -> String {
        let mark = match (self.model.mode(mode), self.model.is_editable(mode)) {
            (true, _) => "[x]",
            (false, true) => "[ ]",
            (false, false) => "[-]",
        };
        format!("{} {:<14} {:<22}", mark, mode, mode.summary())
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
