//! Error types shared by the library.

use std::path::PathBuf;

use thiserror::Error;

use crate::app::DashboardState;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    /// A color name outside the surface's palette. This is a wiring mistake,
    /// never a display condition, so it is not swallowed.
    #[error("the '{name}' color isn't recognized: {recognized}")]
    UnknownColor { name: String, recognized: String },

    #[error("invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("configuration parse failure in {path}: {details}")]
    ConfigParse { path: PathBuf, details: String },

    #[error("IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable network interface: {details}")]
    NoInterface { details: String },

    #[error("event source failure: {details}")]
    Source { details: String },

    #[error("terminal failure: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("dashboard is {actual:?}, expected {expected:?}")]
    InvalidState {
        actual: DashboardState,
        expected: DashboardState,
    },
}
