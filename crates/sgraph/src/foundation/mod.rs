//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Signals for object notifications
//! - Logging utilities

pub mod math;
pub mod signal;
pub mod logging;
