use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or HTTP-layer failure; no application payload was available.
    #[error("{0}")]
    Transport(String),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Application(String),

    #[error("No articles to export. Load news first.")]
    EmptyExport,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Human-readable text shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application(_))
    }
}
