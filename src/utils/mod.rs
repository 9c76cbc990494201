//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`paths`]: Path cleaning, containment checks and project root discovery

/// Path manipulation and resolution utilities
pub mod paths;

pub use paths::{Resolved, clean, locate_root, make_absolute, relative_to, resolve};
