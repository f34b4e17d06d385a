#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

//! Headless application core for ISAAC, a role-based dashboard for a
//! traffic-incident investigation platform.
//!
//! The core is a pure event-driven state machine: a shell (web, desktop,
//! mobile) feeds [`Event`]s into [`App::update`] and executes the effects
//! the core requests back (HTTP calls, media uploads, timers, document
//! downloads, render notifications). The core itself never performs I/O.
//!
//! The interesting machinery lives in:
//! - [`staging`]: the evidence staging area used by the incident wizard,
//! - [`pipeline`]: the sequential incident submission pipeline,
//! - [`formatter`]: the shared free-text analysis formatter,
//! - [`pdf`]: the paginating A4 report renderer.

pub mod analysis;
pub mod api;
pub mod app;
pub mod capabilities;
pub mod event;
pub mod formatter;
pub mod model;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod pipeline;
pub mod staging;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use app::{App, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::Model;

// --- Tunables ---

/// Base URL of the backend REST API. The shell proxies or rewrites this
/// host in environments that sit behind a gateway.
pub const API_BASE_URL: &str = "https://api.isaac.example.com";

pub const MAX_EVIDENCE_ITEMS: usize = 50;
pub const MAX_VEHICLES: usize = 20;
pub const MAX_PERSONS: usize = 50;
pub const MAX_TAGS_PER_EVIDENCE: usize = 16;

/// Base delay between staged-upload progress ticks.
pub const UPLOAD_TICK_BASE_MS: u64 = 120;
/// Random extra delay added to each progress tick.
pub const UPLOAD_TICK_JITTER_MS: u64 = 180;
/// Minimum progress gained per tick; keeps the asymptotic curve finite.
pub const UPLOAD_PROGRESS_FLOOR: u8 = 7;

/// Header-line length threshold for the analysis panel formatter.
pub const ANALYSIS_HEADER_THRESHOLD: usize = 50;
/// Header-line length threshold for chat bubbles, which tolerate longer
/// headings.
pub const CHAT_HEADER_THRESHOLD: usize = 100;

pub const TOAST_DURATION_MS: u64 = 5000;

// --- Error taxonomy ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    UserResolution,
    Serialization,
    Deserialization,
    Media,
    NotFound,
    Server,
    Export,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Validation => "VALIDATION_ERROR",
            Self::UserResolution => "USER_RESOLUTION_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Media => "MEDIA_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Server => "SERVER_ERROR",
            Self::Export => "EXPORT_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Timeout | Self::Server | Self::Media => ErrorSeverity::Transient,
            Self::Validation | Self::UserResolution | Self::NotFound | Self::Export | Self::Unknown => {
                ErrorSeverity::Permanent
            }
            Self::Serialization | Self::Deserialization => ErrorSeverity::Fatal,
        }
    }
}

/// An error surfaced to the user, carrying enough context for logging
/// without leaking internals into the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub context: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            context: context.into(),
        }
    }

    #[must_use]
    pub fn network(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, context)
    }

    #[must_use]
    pub fn validation(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, context)
    }

    #[must_use]
    pub fn user_resolution(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserResolution, context)
    }

    #[must_use]
    pub fn serialization(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, context)
    }

    #[must_use]
    pub fn deserialization(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Deserialization, context)
    }

    #[must_use]
    pub fn media(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Media, context)
    }

    #[must_use]
    pub fn server(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, context)
    }

    #[must_use]
    pub fn export(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Export, context)
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.severity == ErrorSeverity::Transient
    }

    /// Canned, user-safe message; validation errors pass their context
    /// through because it names the offending field.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => "A network error occurred. Please try again.".into(),
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::Validation => self.context.clone(),
            ErrorKind::UserResolution => {
                "Could not resolve the current user session. Please sign in again.".into()
            }
            ErrorKind::Serialization | ErrorKind::Deserialization => {
                "The server sent an unexpected response.".into()
            }
            ErrorKind::Media => "Media upload failed.".into(),
            ErrorKind::NotFound => "The requested record was not found.".into(),
            ErrorKind::Server => "The server rejected the request.".into(),
            ErrorKind::Export => "Could not generate the PDF report.".into(),
            ErrorKind::Unknown => "Something went wrong.".into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.context)
    }
}

impl std::error::Error for AppError {}

// --- Toasts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastKind {
    Success,
    Destructive,
}

/// The uniform feedback channel: every async outcome that matters to the
/// user becomes a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            duration_ms: TOAST_DURATION_MS,
        }
    }

    #[must_use]
    pub fn destructive(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Destructive,
            duration_ms: TOAST_DURATION_MS,
        }
    }
}

/// Milliseconds since the Unix epoch, or 0 when the platform clock is
/// unavailable.
#[must_use]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AppError::network("boom").code(), "NETWORK_ERROR");
        assert_eq!(AppError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(
            AppError::user_resolution("no session").code(),
            "USER_RESOLUTION_ERROR"
        );
    }

    #[test]
    fn validation_messages_pass_context_through() {
        let err = AppError::validation("Location is required");
        assert_eq!(err.user_facing_message(), "Location is required");
    }

    #[test]
    fn network_errors_are_retryable() {
        assert!(AppError::network("offline").is_retryable());
        assert!(!AppError::validation("missing").is_retryable());
        assert!(!AppError::deserialization("bad json").is_retryable());
    }

    #[test]
    fn toast_constructors_set_kind() {
        assert_eq!(ToastMessage::success("ok").kind, ToastKind::Success);
        assert_eq!(
            ToastMessage::destructive("nope").kind,
            ToastKind::Destructive
        );
    }
}
