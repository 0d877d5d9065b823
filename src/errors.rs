// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for infrastructure operations

use thiserror::Error;

/// Errors that can occur while driving the provisioning engine
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// The engine binary could not be spawned
    #[error("Failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// An engine command exited unsuccessfully
    #[error("`terraform {command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The definition set reported validation errors
    #[error("Definition set is invalid: {0}")]
    InvalidDefinitions(String),

    /// Input configuration was rejected before the engine was invoked
    #[error(transparent)]
    Inputs(#[from] crate::inputs::InputsError),

    /// Requested output is not declared or has no value
    #[error("Output not found: {0}")]
    OutputNotFound(String),

    /// Filesystem error while preparing a working copy
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for InfrastructureError {
    fn from(err: std::io::Error) -> Self {
        InfrastructureError::Workspace(err.to_string())
    }
}
