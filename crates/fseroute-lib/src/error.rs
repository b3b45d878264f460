use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the route finder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a starting airport is not present in the airport database.
    #[error("unknown airport code: {code}{}", format_suggestions(.suggestions))]
    UnknownAirport {
        code: String,
        suggestions: Vec<String>,
    },

    /// Raised when search parameters cannot produce any route.
    #[error("invalid search parameters: {message}")]
    InvalidSearch { message: String },

    /// The job feed answered, but with an error message instead of assignments.
    #[error("job feed for {airport} unavailable: {message}")]
    FeedUnavailable { airport: String, message: String },

    /// No FSEconomy access key could be found.
    #[error(
        "no FSEconomy access key found; set FSE_ACCESS_KEY or paste the key into a file named key.txt"
    )]
    MissingAccessKey,

    /// The airport database could not be used.
    #[error("invalid airport data: {message}")]
    AirportData { message: String },

    /// Raised when a required file does not exist.
    #[error("file not found at {path}")]
    FileNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for configuration and cache")]
    ProjectDirsUnavailable,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for CSV decoding errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether this error means the job source could not be asked at all,
    /// as opposed to a problem with local configuration.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::FeedUnavailable { .. } | Error::Io(_)
        )
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
