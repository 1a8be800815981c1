use axum::http::StatusCode;
use thiserror::Error;

/// Startup and runtime errors for the server process
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),
}

/// Errors surfaced to a client asking for a player page
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Missing URL parameter")]
    MissingUrl,

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl EmbedError {
    pub fn status(&self) -> StatusCode {
        match self {
            EmbedError::MissingUrl => StatusCode::BAD_REQUEST,
            EmbedError::NotFound(_) => StatusCode::NOT_FOUND,
            EmbedError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Title and message shown on the error page
    pub fn page_text(&self) -> (&'static str, &'static str) {
        match self {
            EmbedError::MissingUrl => (
                "Missing URL Parameter",
                "Please provide a video URL using the ?url= parameter",
            ),
            EmbedError::NotFound(_) => (
                "Page Not Found",
                "The page you are looking for does not exist.",
            ),
            EmbedError::Render(_) => (
                "Video Not Available",
                "This video is currently not available for streaming.",
            ),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ServerError>;
