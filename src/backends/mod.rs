//! Backends module - File system integration
//!
//! Provides:
//! - scan: HTML document discovery with the ignore crate

pub mod scan;
