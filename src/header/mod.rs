//! The `setup.h` format: rendering a snapshot and reading one back.

mod parse;
mod render;

pub use parse::{apply_header, parse, LoadMode, ParseReport};
pub use render::{render, Header};
