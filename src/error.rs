use thiserror::Error;

/// Errors surfaced by the payment demo.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured base URL of the payment page does not parse.
    #[error("Invalid base URL {input:?}: {source}")]
    InvalidBaseUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// The browser could not be launched or reported failure.
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
