use annotype_parser::ParseError;
use thiserror::Error;

/// Errors from batch operations over result tables.
#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("malformed type annotation {input:?} for {site}: {source}")]
    Parse {
        site: String,
        input: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to start {jobs} worker threads: {source}")]
    ThreadPool {
        jobs: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResultsError>;
