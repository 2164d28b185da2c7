//! Errors raised at the crate boundary. The validation passes themselves
//! never fail; they annotate the document instead.

use thiserror::Error;

/// Failure to turn XML text into a [`crate::document::Document`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read error for {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("XML syntax error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("malformed markup at byte {position}: {message}")]
    Malformed { position: u64, message: String },
    #[error("unexpected closing tag </{found}> at byte {position}")]
    UnbalancedTag { found: String, position: u64 },
    #[error("document ended inside <{open}>")]
    Truncated { open: String },
    #[error("document has no root element")]
    Empty,
    #[error("expected root element <project>, found <{0}>")]
    NotAProject(String),
}

/// Failure to load a [`crate::rules::config::ValidatorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read error for {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to write the annotated document back out.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
