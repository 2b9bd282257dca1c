//! Core domain types and the step contract for chainbuild.
//!
//! This crate contains:
//! - The per-step state record and its resolved path set
//! - Event tags and the config key table
//! - Successor step descriptors
//! - The `Builder` lifecycle contract and the `Dispatcher` seam
//! - The error taxonomy

pub mod dispatch;
pub mod error;
pub mod events;
pub mod keymap;
pub mod next;
pub mod paths;
pub mod state;
pub mod step;

pub use dispatch::{DispatchRequest, Dispatcher, Scope};
pub use error::{Error, Result};
pub use events::EventSet;
pub use keymap::{ConfigKeyMap, StateField};
pub use next::{CopyInstruction, NextStepSpec};
pub use paths::{CONVENTION_DIRS, StepPaths};
pub use state::{ConfigMap, StepState};
pub use step::Builder;
