use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("gradient needs at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),

    #[error("palette has {colors} colors but {sections} sections were requested")]
    PaletteTooShort { colors: usize, sections: usize },

    #[error("a publisher is already attached to this visual store")]
    PublisherActive,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("browser api unavailable: {0}")]
    Unavailable(&'static str),

    #[error("section element not found: {0}")]
    MissingSection(String),
}

impl From<serde_json::Error> for PortfolioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
