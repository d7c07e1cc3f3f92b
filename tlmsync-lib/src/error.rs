#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A sync pattern that is not exactly [SYNC_PATTERN_BITS](crate::framing::SYNC_PATTERN_BITS)
    /// binary values.
    #[error("Invalid sync pattern: {0}")]
    InvalidSyncPattern(String),

    /// Correlation window or threshold outside of the sync pattern bounds.
    #[error("Invalid correlation config: {0}")]
    CorrelationConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
