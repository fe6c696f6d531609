//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Otx.
//! The Otx project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Otx Error Module
//!
//! This module defines the error type shared by every fallible operation in
//! Otx.
//!
//! ## Where Errors Occur
//!
//! Most of the core is infallible by contract: compiling a pipeline, checking
//! statement compatibility, simulating steps against a sample and diffing two
//! records never fail. Errors are reserved for the edges:
//!
//! - **Config**: configuration files that cannot be read or decoded
//! - **Validation**: step construction with a malformed configuration, an
//!   empty hand-edited program, unknown step identifiers
//! - **Ingest**: a sample upload that yields zero usable records
//! - **Io / Serde / Yaml**: wrapped lower-level failures
//!
//! ## Usage
//!
//! ```rust
//! use otx::errors::{Result, OtError};
//!
//! fn require_field(field: &str) -> Result<()> {
//!     if field.trim().is_empty() {
//!         return Err(OtError::validation("field path may not be empty"));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Otx.
pub type Result<T> = std::result::Result<T, OtError>;

/// Canonical error enumeration for Otx.
#[derive(Debug, Error, Serialize, Deserialize, PartialEq)]
pub enum OtError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// JSON serialization or deserialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// YAML decoding issues.
    #[error("yaml error: {0}")]
    Yaml(String),

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Configuration that could not be loaded or is inconsistent.
    #[error("config error: {message}")]
    Config { message: String },

    /// Sample input that yielded no usable telemetry records.
    #[error("ingest error: {message}")]
    Ingest { message: String },

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for OtError {
    fn from(err: io::Error) -> Self {
        OtError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OtError {
    fn from(err: serde_json::Error) -> Self {
        OtError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for OtError {
    fn from(err: serde_yaml::Error) -> Self {
        OtError::Yaml(err.to_string())
    }
}

impl OtError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        OtError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        OtError::Config {
            message: message.into(),
        }
    }

    /// Helper to construct ingest errors.
    pub fn ingest<T: Into<String>>(message: T) -> Self {
        OtError::Ingest {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        OtError::Internal(message.into())
    }
}
