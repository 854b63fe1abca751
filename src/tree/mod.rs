//! Filesystem traversal
//!
//! Walks root directories and feeds each regular file through the digest engine.

pub mod path;
pub mod walker;
