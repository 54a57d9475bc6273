//! Utility functions for code generation, URL processing, and database error inspection.
//!
//! - [`code_generator`] - Random short code generation
//! - [`url_normalizer`] - Scheme normalization for target URLs
//! - [`db_error`] - Classification of SQLx errors

pub mod code_generator;
pub mod db_error;
pub mod url_normalizer;
