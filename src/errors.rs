use thiserror::Error;

/// Errors that can occur while normalizing or resolving interaction data.
///
/// Missing mappings are not errors: they are routed to the unresolved
/// diagnostic stream and never surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("malformed record: {message} (path: {path}, line: {line:?})")]
    MalformedRecord {
        message: String,
        path: String,
        line: Option<u64>,
    },

    #[error("empty input: no interaction records to normalize")]
    EmptyInput,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Builds a `MalformedRecord` error without file context, for parsers that
    /// operate on a single value. Callers attach path and line via
    /// [`PipelineError::at`].
    pub fn malformed(message: impl Into<String>) -> Self {
        PipelineError::MalformedRecord {
            message: message.into(),
            path: String::new(),
            line: None,
        }
    }

    /// Attaches a source path and line number to a `MalformedRecord` error.
    /// Other variants are returned unchanged.
    pub fn at(self, path: &str, line: u64) -> Self {
        match self {
            PipelineError::MalformedRecord { message, .. } => PipelineError::MalformedRecord {
                message,
                path: path.to_string(),
                line: Some(line),
            },
            other => other,
        }
    }

    /// Returns `true` for per-record parse failures, the only errors that the
    /// lenient reader mode may skip.
    pub fn is_malformed(&self) -> bool {
        matches!(self, PipelineError::MalformedRecord { .. })
    }
}

/// Convenience alias for results using `PipelineError`.
pub type Result<T> = std::result::Result<T, PipelineError>;
