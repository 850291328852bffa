//! Error types
//!
//! Only configuration input can fail loudly. Everything at runtime (missing
//! DOM nodes, unavailable audio) is logged and skipped by the caller.

use thiserror::Error;

pub type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Invalid tuning: {message}")]
    Tuning { message: String },

    #[error("Vocabulary `{name}` has no words")]
    EmptyVocabulary { name: String },

    #[error("Word `{word}` has no parts")]
    EmptyWord { word: String },

    #[error("Missing page element: #{id}")]
    MissingElement { id: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl RunnerError {
    pub fn tuning<S: Into<String>>(message: S) -> Self {
        Self::Tuning {
            message: message.into(),
        }
    }

    pub fn missing_element<S: Into<String>>(id: S) -> Self {
        Self::MissingElement { id: id.into() }
    }

    pub fn io<S: Into<String>>(path: S, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
