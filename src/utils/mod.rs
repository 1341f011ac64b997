//! Utility functions shared by the service layer.
//!
//! - [`code_generator`] - Short code generation
//! - [`url_validator`] - URL validation for incoming links

pub mod code_generator;
pub mod url_validator;
