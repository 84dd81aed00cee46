use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::info;
use watersense_config::config::Layout;
use watersense_config::form::Form;
use watersense_config::header::LoadMode;
use watersense_config::logutil;
use watersense_config::model::{Mode, OptionModel, TaskPeriod, Timing};
use watersense_config::project::{self, Project};

/// Configure WaterSense operating modes and generate `setup.h`.
///
/// Without a subcommand an interactive form is opened.
#[derive(clap::Parser)]
#[clap(version)]
struct Cli {
    /// Firmware project root, the directory holding `src/`.
    #[clap(long, default_value = ".")]
    project: PathBuf,

    /// YAML file overriding where the header lives inside the project.
    #[clap(long)]
    layout: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the current configuration.
    Show {
        /// Print JSON instead of a table.
        #[clap(long)]
        json: bool,

        /// Read this header instead of the project's.
        #[clap(long)]
        file: Option<PathBuf>,
    },
    /// Write the project header in place, keeping a backup.
    Apply(Edits),
    /// Write the header to another file.
    Save {
        #[clap(short, long)]
        output: PathBuf,

        #[clap(flatten)]
        edits: Edits,
    },
}

/// Changes applied on top of the project header, in the order listed.
#[derive(clap::Args)]
struct Edits {
    /// Load this header first, switching off every mode it does not define.
    #[clap(long)]
    from: Option<PathBuf>,

    /// Restore defaults (NO_SURVEY + RADAR).
    #[clap(long)]
    reset: bool,

    /// Mode to switch off. Repeatable.
    #[clap(long)]
    disable: Vec<Mode>,

    /// Mode to switch on. Repeatable.
    #[clap(long)]
    enable: Vec<Mode>,

    /// `NAME=VALUE` for a timing value or task period. Repeatable.
    #[clap(long, value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{}`", s)),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn main() -> anyhow::Result<()> {
    logutil::init();

    let cli = Cli::parse();
    let layout = match &cli.layout {
        Some(path) => Layout::load(path)?,
        None => Layout::default(),
    };
    let project = Project::new(cli.project, layout);

    match cli.command {
        None => {
            let mut form = Form::new(project);
            form.load_current();
            form.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Command::Show { json, file }) => {
            let mut model = OptionModel::new();
            match file {
                Some(file) => {
                    project::load(&mut model, &file, LoadMode::Replace)?;
                }
                None => {
                    project.load_current(&mut model)?;
                }
            }
            show(&model, json)?;
        }
        Some(Command::Apply(edits)) => {
            let model = prepare(&project, edits)?;
            let path = project.apply(&model, today())?;
            info!("configuration saved to {}", path.display());
            println!("Ready to build and upload: pio run --target upload");
        }
        Some(Command::Save { output, edits }) => {
            let model = prepare(&project, edits)?;
            project::save(&model, &output, today(), &project.layout.backup_suffix)?;
            info!("saved as {}", output.display());
        }
    }

    Ok(())
}

fn prepare(project: &Project, edits: Edits) -> anyhow::Result<OptionModel> {
    let mut model = OptionModel::new();
    project.load_current(&mut model)?;

    if let Some(from) = &edits.from {
        let report = project::load(&mut model, from, LoadMode::Replace)?;
        info!("loaded {}: modes {}", from.display(), report.modes_text());
    }
    if edits.reset {
        model.reset();
    }
    for mode in edits.disable {
        model.edit_mode(mode, false)?;
    }
    for mode in edits.enable {
        model
            .edit_mode(mode, true)
            .with_context(|| format!("cannot enable {}", mode))?;
    }
    for (name, value) in &edits.set {
        model.edit(name, value).map_err(|e| anyhow!("--set {}={}: {}", name, value, e))?;
    }

    Ok(model)
}

fn show(model: &OptionModel, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(model.snapshot())?);
        return Ok(());
    }

    println!("{:20} {:8} note", "name", "value");
    for mode in Mode::ALL {
        let note = match model.locked_by(mode) {
            Some(by) => format!("locked by {}", by),
            None => mode.summary().to_string(),
        };
        let value = if model.mode(mode) { "on" } else { "off" };
        println!("{:20} {:8} {}", mode.name(), value, note);
    }
    for timing in Timing::ALL {
        println!("{:20} {:8} s", timing.name(), model.timing(timing));
    }
    for period in TaskPeriod::ALL {
        println!("{:20} {:8} ms", period.name(), model.task_period(period));
    }
    Ok(())
}
