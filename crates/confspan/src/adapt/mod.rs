//! adapters from source notations to the typed domain models
//!
//! Adapters never touch a notation's syntax tree directly: everything goes
//! through [crate::accessor::ResourceAccess], so each adapter reads the
//! same whichever notation the configuration was written in.

pub mod hcl;
pub mod template;
