// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("INI error: {0}")]
    Ini(#[from] ini::Error),

    #[error("Template field missing: {0}")]
    MissingField(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid setting [{section}] {key} = {value:?}")]
    Settings {
        section: String,
        key: String,
        value: String,
    },

    #[error("Invalid keyspace: {0}")]
    InvalidKeyspace(String),

    #[error("Invalid durability level: {0}. Must be 0 to 3")]
    InvalidDurability(u8),

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Query failed ({code}): {message}")]
    Query { code: u32, message: String },

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Temporary failure: {0}")]
    TemporaryFailure(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Collection not connected: {0}")]
    UnknownCollection(String),

    #[error("Management request failed: {0}")]
    Management(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Query service error code for a request that exceeded its timeout.
const QUERY_TIMEOUT_CODE: u32 = 1080;

impl Error {
    /// Whether the failure is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::TemporaryFailure(_) | Error::Timeout(_) => true,
            Error::Query { code, .. } => *code == QUERY_TIMEOUT_CODE,
            Error::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.as_u16() == 429 || s.as_u16() == 503)
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
