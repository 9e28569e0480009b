use serde::Deserialize;
use std::fmt::Display;
use thiserror::Error;

/// What went wrong while talking to the PostHub API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// `401`: missing, expired or rejected access token.
    Unauthorized,
    /// `403`: signed in but not allowed, e.g. editing someone else's post.
    Forbidden,
    /// `404`
    NotFound,
    /// Other `4xx` responses, usually failed validation or bad credentials.
    Rejected(u16),
    /// `5xx`
    Server(u16),
    /// Any other unsuccessful status.
    Status(u16),
    Timeout,
    /// The request never got a response (DNS, refused connection...).
    Network,
    /// The response body could not be decoded.
    Decode,
    /// The request could not be built.
    Request,
}

impl ApiErrorKind {
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400..=499 => Self::Rejected(status),
            500..=599 => Self::Server(status),
            _ => Self::Status(status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ApiError {
    kind: ApiErrorKind,
    detail: Option<String>,
}

impl ApiError {
    #[must_use]
    pub fn new(kind: ApiErrorKind) -> Self {
        Self { kind, detail: None }
    }

    #[must_use]
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..self
        }
    }

    /// Builds an error from an unsuccessful response and its body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::from_status(status),
            detail: parse_detail(body),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// Human readable message sent by the server, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The server's message verbatim, or `fallback` without one.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail.as_deref().unwrap_or(fallback).to_string()
    }

    /// Whether trying again later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::Timeout | ApiErrorKind::Network | ApiErrorKind::Server(..)
        )
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(detail) = &self.detail {
            return f.write_str(detail);
        }

        match self.kind {
            ApiErrorKind::Unauthorized => f.write_str("Authentication required"),
            ApiErrorKind::Forbidden => f.write_str("Not allowed to perform this action"),
            ApiErrorKind::NotFound => f.write_str("Not found"),
            ApiErrorKind::Rejected(status) => write!(f, "Request was rejected (status {status})"),
            ApiErrorKind::Server(status) => write!(f, "Server error (status {status})"),
            ApiErrorKind::Status(status) => write!(f, "Unexpected response (status {status})"),
            ApiErrorKind::Timeout => f.write_str("Request timed out"),
            ApiErrorKind::Network => f.write_str("Could not reach the server"),
            ApiErrorKind::Decode => f.write_str("Received an unreadable response"),
            ApiErrorKind::Request => f.write_str("Could not build the request"),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Validation(Vec<ValidationIssue>),
    Other(serde_json::Value),
}

/// One entry of a request validation failure (`422`).
#[derive(Deserialize)]
struct ValidationIssue {
    msg: String,
}

/// Pulls the human readable `detail` out of an error payload.
fn parse_detail(body: &str) -> Option<String> {
    let body = serde_json::from_str::<ErrorBody>(body).ok()?;
    match body.detail {
        Detail::Message(message) if !message.is_empty() => Some(message),
        Detail::Validation(issues) if !issues.is_empty() => Some(
            issues
                .into_iter()
                .map(|issue| issue.msg)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}
