pub mod config;
pub mod conflict;
pub mod expr;
pub mod form;
pub mod header;
pub mod logutil;
pub mod model;
pub mod project;
