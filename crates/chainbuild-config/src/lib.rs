//! Configuration discovery and parsing for chainbuild.
//!
//! This crate handles:
//! - Config file discovery (`build.<step>.<ext>` / `build.<ext>`)
//! - Loading JSON and YAML config files into flat mappings
//! - Parsing the declared successor list
//! - `${...}` interpolation of fetched string values

pub mod discovery;
pub mod error;
pub mod interpolate;
pub mod next;

pub use discovery::{CONFIG_EXTENSIONS, CONFIG_STEM};
pub use error::{ConfigError, ConfigResult};
pub use interpolate::Interpolator;
pub use next::parse_next;
