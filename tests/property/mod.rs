//! Property-based tests for the digest engine

mod chunking;
