// src/error.rs

use crate::manifest::fmri::FmriError;
use thiserror::Error;

/// Core error types for ips2deb
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest syntax error
    #[error("Manifest parse error at line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    /// Malformed package FMRI
    #[error("Invalid FMRI: {0}")]
    Fmri(#[from] FmriError),

    /// An action lacks an attribute the converter needs
    #[error("{action} action is missing required attribute '{attr}'")]
    MissingAttribute { action: String, attr: String },

    /// Mode attribute is not an octal number
    #[error("Invalid file mode: {0}")]
    InvalidMode(String),

    /// Payload could not be located in any proto directory
    #[error("Couldn't find {0} in supplied directories")]
    MissingPayload(String),

    /// Manifest uses a construct that has no Debian rendition
    #[error("{package}: {message}")]
    Unsupported { package: String, message: String },

    /// Lookup tables or command line options are unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using ips2deb's Error type
pub type Result<T> = std::result::Result<T, Error>;
