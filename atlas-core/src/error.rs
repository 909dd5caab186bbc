//! src/error.rs
//! ============================================================================
//! # Error taxonomy for Atlas
//!
//! Three layers of failure live here:
//! - [`FetchError`]: a bulk or single-country lookup against the remote API
//!   failed. Caught by the view pipeline and turned into a visible error state.
//! - [`ResolutionError`]: the border-name batch lookup failed. Never shown to
//!   the user; callers degrade to echoing the raw codes.
//! - [`AppError`]: building the API client and persisting preferences.
//!   Config loading and logging setup report through `anyhow` instead.

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::model::country::CountryCode;

/// Failure of a bulk or single-country request.
///
/// Stored inside task results and view state, so it only carries owned
/// strings and stays `Clone`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The API answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The body did not match the requested field set.
    #[error("could not decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// A detail lookup succeeded but produced no country.
    #[error("no country found for code {0}")]
    NotFound(String),
}

impl FetchError {
    pub fn status<S: Into<String>>(endpoint: S, status: u16) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
        }
    }

    pub fn transport<S1: Into<String>, S2: Into<String>>(endpoint: S1, reason: S2) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn decode<S1: Into<String>, S2: Into<String>>(endpoint: S1, reason: S2) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Short message suitable for an error banner.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Status { .. } | Self::Transport { .. } | Self::Decode { .. } => {
                "Could not load country data. Please try again later."
            }
            Self::NotFound(_) => "Country not found.",
        }
    }
}

/// Failure of the border-name batch lookup. Only ever logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not resolve names for [{codes}]: {source}")]
pub struct ResolutionError {
    pub codes: String,
    #[source]
    pub source: FetchError,
}

impl ResolutionError {
    pub fn new(codes: &[CountryCode], source: FetchError) -> Self {
        Self {
            codes: codes
                .iter()
                .map(CountryCode::as_str)
                .collect::<Vec<_>>()
                .join(","),
            source,
        }
    }
}

/// Failures of the shell pieces that sit below `anyhow`.
#[derive(Debug, Error)]
pub enum AppError {
    /// TOML parsing error.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config or preference file I/O error with path.
    #[error("Failed to access {path:?}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Building the HTTP client failed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Invalid API base URL in config or on the command line.
    #[error("Invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl AppError {
    pub fn file_access<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_base_url<S1: Into<String>, S2: Into<String>>(url: S1, reason: S2) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        let err = FetchError::status("/all", 503);
        assert_eq!(err.to_string(), "/all returned HTTP 503");
        assert_eq!(
            err.user_message(),
            "Could not load country data. Please try again later."
        );
        assert_eq!(
            FetchError::NotFound("ZZZ".into()).user_message(),
            "Country not found."
        );
    }

    #[test]
    fn test_resolution_error_joins_codes() {
        let err = ResolutionError::new(
            &[CountryCode::from("FRA"), CountryCode::from("DEU")],
            FetchError::transport("/alpha", "connection refused"),
        );
        assert_eq!(err.codes, "FRA,DEU");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_app_error_names_the_file() {
        let err = AppError::file_access(
            "/tmp/atlas/preferences.toml",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("preferences.toml"));
        assert!(message.contains("denied"));
        assert!(matches!(
            AppError::invalid_base_url("nope", "relative URL without a base"),
            AppError::InvalidBaseUrl { .. }
        ));
    }
}
