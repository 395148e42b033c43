use thiserror::Error;

/// Per-item normalization failures. These are recovered by the pipeline:
/// the offending record is dropped and the batch continues.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("record has no DOI")]
    MissingDoi,
}

/// Failures while fetching or saving raw pages. A fetch error stops
/// pagination but does not abort the run; pages already on disk still flow
/// through the pipeline.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("could not write page file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode page body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Database failures. All variants are fatal to the run.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("could not create connection pool: {error}")]
    Pool { error: sqlx::Error },
    #[error("could not ensure destination table: {error}")]
    Schema { error: sqlx::Error },
    #[error("{command} failed, batch rolled back: {error}")]
    Load { command: String, error: sqlx::Error },
}
