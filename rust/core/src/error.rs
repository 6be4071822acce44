// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for configurator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the viewer session, the registry and selection storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Viewer runtime not available after {attempts} attempts")]
    RuntimeUnavailable { attempts: u32 },

    #[error("Viewer initialization failed: {0}")]
    InitFailed(String),

    #[error("Viewer reported an error during {op}: {message}")]
    Viewer { op: &'static str, message: String },

    #[error("Viewer dropped the callback for {0}")]
    CallbackDropped(&'static str),

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<cacache::Error> for Error {
    fn from(err: cacache::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
