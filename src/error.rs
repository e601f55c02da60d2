use thiserror::Error;

/// Failures reported by a recipe provider
///
/// The display text is the message shown to the user next to the retry
/// control, so it is kept verbatim all the way up to the search coordinator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete in time
    #[error("Request timeout. Please check your internet connection.")]
    NetworkTimeout,

    /// The provider rejected the API key (HTTP 401)
    #[error("Invalid API key. Please check your Spoonacular API key.")]
    AuthFailure,

    /// The account ran out of quota (HTTP 402)
    #[error("API quota exceeded. Please upgrade your Spoonacular plan.")]
    QuotaExceeded,

    /// The provider answered with a 5xx status
    #[error("Server error. Please try again later.")]
    ServerError,

    /// Anything else: other statuses, connection failures, undecodable bodies
    #[error("Failed to fetch data. Please try again.")]
    Unknown,
}

impl FetchError {
    /// Classify an HTTP status code that was not a success
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => FetchError::AuthFailure,
            402 => FetchError::QuotaExceeded,
            s if s >= 500 => FetchError::ServerError,
            _ => FetchError::Unknown,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::NetworkTimeout
        } else if let Some(status) = err.status() {
            FetchError::from_status(status.as_u16())
        } else {
            FetchError::Unknown
        }
    }
}

/// Failures reported by a translator
///
/// These never reach the user: the translation overlay falls back to the
/// source text and logs the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Network(String),

    #[error("Translation service answered with status {status}")]
    Api { status: u16 },

    #[error("Malformed translation response: {0}")]
    Malformed(String),

    #[error("Translation unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        TranslationError::Network(err.to_string())
    }
}

/// Failures of the local key-value store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the session service
#[derive(Error, Debug)]
pub enum SessionError {
    /// Favorites can only be changed while someone is logged in
    #[error("No user is logged in")]
    NotAuthenticated,

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised by the locale preference service
#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("Failed to persist language preference: {0}")]
    Storage(#[from] StorageError),
}

/// Top-level error for the convenience API and the command line front end
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Translation(#[from] TranslationError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Locale(#[from] LocaleError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    /// A collaborator could not be constructed from the configuration
    #[error("Setup error: {0}")]
    Setup(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
