//! md5list: recursive MD5 manifests
//!
//! Walks one or more root directories, fingerprints every regular file with a
//! streaming MD5 engine and writes one CSV manifest line per file. Entries that
//! cannot be read are reported and skipped without stopping the run.

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod format;
pub mod logging;
pub mod manifest;
pub mod scan;
pub mod tree;
