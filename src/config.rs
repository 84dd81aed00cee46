use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}
fn default_header_file() -> String {
    "setup.h".to_string()
}
fn default_backup_suffix() -> String {
    ".backup".to_string()
}

/// Where the firmware project keeps its header, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Layout {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "default_header_file")]
    pub header_file: String,
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            header_file: default_header_file(),
            backup_suffix: default_backup_suffix(),
        }
    }
}

impl Layout {
    /// Reads a YAML layout file. Missing keys take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading layout {}", path.display()))?;
        let layout = serde_yaml::from_str(&text).with_context(|| format!("parsing layout {}", path.display()))?;
        Ok(layout)
    }
}
