//! typed domain models produced by the adapters
//!
//! Every struct carries [crate::types::Metadata] for its declaration plus
//! tracked leaf values. Equality deliberately ignores metadata so models
//! built from different notations compare by configuration alone.

pub mod analyzer;
pub mod firewall;
pub mod storage;
