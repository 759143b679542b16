use thiserror::Error;

/// Common error type shared by the stonecat crates
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}
