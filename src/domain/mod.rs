//! Domain types used throughout the fitting core.
//!
//! This module defines:
//!
//! - fit configuration (`FitMode`, `Bounds`, `FitConfig`)
//! - parameter vectors passed between optimizer and caller (`ParameterVector`)
//! - fit outputs (`FitResult`, `ConfidenceInterval`)

pub mod types;

pub use types::*;
