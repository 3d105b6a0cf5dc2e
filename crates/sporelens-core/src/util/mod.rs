//! Utility modules.
//!
//! # Modules
//!
//! - [`resolver`]: Config file location (explicit path, env var, platform dir)

pub mod resolver;
