//! Test support shared across crates
