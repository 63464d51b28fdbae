//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified result model (ResultItem)
//! - Rendering functions for different output formats
//! - Path normalization utilities
//! - Hashing and file metadata helpers
//! - File reading strategies

pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
