//! Error types for the core crate
//!
//! This module provides a consolidated error type for the core crate,
//! wrapping errors from record parsing, validation and configuration.

use thiserror::Error;
use std::io;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value failed validation (e.g. intensity out of range)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Stored bytes did not have the expected record shape
    #[error("Record parse error: {0}")]
    ParseError(String),

    /// Data serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// UTF-8 decoding error
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Convert a displayable error to a ValidationError
pub fn to_validation_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::ValidationError(err.to_string())
}

/// Convert a displayable error to a ParseError
pub fn to_parse_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::ParseError(err.to_string())
}

/// Convert a displayable error to a SerializationError
pub fn to_serialization_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::SerializationError(err.to_string())
}

/// Convert a displayable error to a ConfigError
pub fn to_config_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::ConfigError(err.to_string())
}
