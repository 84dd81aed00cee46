//! Reading and writing header files on disk.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};
use thiserror::Error;

use crate::config::Layout;
use crate::header::{self, LoadMode, ParseReport};
use crate::model::OptionModel;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Run this tool from the WaterSense project root directory: '{0}' folder not found")]
    MissingSourceDir(String),
    #[error("failed to read {path}: {err}")]
    Read { path: String, err: io::Error },
    #[error("failed to back up {path}: {err}")]
    Backup { path: String, err: io::Error },
    #[error("failed to write {path}: {err}")]
    Write { path: String, err: io::Error },
}

/// A firmware project checkout.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub layout: Layout,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.layout.source_dir)
    }

    pub fn header_path(&self) -> PathBuf {
        self.source_dir().join(&self.layout.header_file)
    }

    /// Loads the project header over the model, keeping modes it does not
    /// mention. `None` when the project has no header yet.
    pub fn load_current(&self, model: &mut OptionModel) -> Result<Option<ParseReport>, Error> {
        let path = self.header_path();
        if !path.exists() {
            debug!("no {} yet", path.display());
            return Ok(None);
        }
        load(model, &path, LoadMode::Merge).map(Some)
    }

    /// Writes the header in place, keeping the previous one as a backup.
    pub fn apply(&self, model: &OptionModel, date: NaiveDate) -> Result<PathBuf, Error> {
        let source_dir = self.source_dir();
        if !source_dir.is_dir() {
            return Err(Error::MissingSourceDir(self.layout.source_dir.display().to_string()));
        }
        let path = self.header_path();
        save(model, &path, date, &self.layout.backup_suffix)?;
        Ok(path)
    }
}

/// Reads `path` and applies it to `model`. On a read error the model is untouched.
pub fn load(model: &mut OptionModel, path: &Path, load: LoadMode) -> Result<ParseReport, Error> {
    let text = std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.display().to_string(),
        err,
    })?;
    info!("loading {}", path.display());
    Ok(header::apply_header(model, &text, load))
}

/// Renders the model to `path`, copying an existing file to `<path><backup_suffix>` first.
pub fn save(model: &OptionModel, path: &Path, date: NaiveDate, backup_suffix: &str) -> Result<(), Error> {
    let content = header::render(model.snapshot(), date);

    if path.exists() {
        let backup = backup_path(path, backup_suffix);
        std::fs::copy(path, &backup).map_err(|err| Error::Backup {
            path: path.display().to_string(),
            err,
        })?;
        debug!("backed up {} to {}", path.display(), backup.display());
    }

    std::fs::write(path, content).map_err(|err| Error::Write {
        path: path.display().to_string(),
        err,
    })?;
    info!("wrote {}", path.display());
    Ok(())
}

pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
