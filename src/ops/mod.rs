//! High-level operations.
//!
//! This module contains the implementation of canticle commands.

pub mod get;
pub mod save;

pub use get::get;
pub use save::save;
