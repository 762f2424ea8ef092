//! Custom error types for the analyzer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Price source failed for {symbol}: {message}")]
    PriceSource {
        symbol: String,
        message: String,
    },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Storage error: {context}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AnalyzerError {
    pub fn price_source(symbol: &str, message: impl Into<String>) -> Self {
        AnalyzerError::PriceSource {
            symbol: symbol.to_string(),
            message: message.into(),
        }
    }

    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        AnalyzerError::Storage {
            context: context.into(),
            source,
        }
    }

    pub fn parsing(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AnalyzerError::DataParsing {
            context: context.into(),
            source: source.into(),
        }
    }
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
