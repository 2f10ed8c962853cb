//! Error taxonomy for quote acquisition.
//!
//! Every failure a provider client or the batch fetcher can produce is one of the
//! [`QuoteError`] variants. The display text is what the dashboard shows verbatim, so
//! keep it stable.

use std::fmt::Display;
use std::num::ParseFloatError;
use thiserror::Error;

/// The two supported quote sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Finnhub: quote + company profile, 60 calls per minute on the free tier.
    Primary,
    /// Alpha Vantage: GLOBAL_QUOTE, 5 calls per minute on the free tier.
    Secondary,
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ProviderKind::Primary => "Finnhub",
                ProviderKind::Secondary => "Alpha Vantage",
            }
        )
    }
}

#[derive(Error, Debug)]
pub enum QuoteError {
    /// Neither credential is present. Raised before any network activity.
    #[error(
        "No API keys configured. Please add FINNHUB_API_KEY or ALPHA_VANTAGE_API_KEY to your environment."
    )]
    NoProviderConfigured,

    /// A provider endpoint answered with a non-2xx status.
    #[error("{provider} {endpoint} API error: {status}")]
    ProviderHttp {
        provider: ProviderKind,
        endpoint: &'static str,
        status: u16,
    },

    /// The payload carried a provider notice (rate limit, usage, bad key) instead of data.
    #[error("{provider}: {text}")]
    ProviderMessage { provider: ProviderKind, text: String },

    /// A required field is missing or malformed.
    #[error("Invalid {provider} response for {symbol}: {reason}")]
    InvalidResponse {
        provider: ProviderKind,
        symbol: String,
        reason: String,
    },

    /// The secondary provider's percent-change string is not a number.
    #[error("Invalid change percent {value:?} for {symbol}: {source}")]
    NumericParse {
        symbol: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    /// Transport failure: connect, timeout, or body read.
    #[error("Request to {provider} failed: {source}")]
    Network {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },
}

impl QuoteError {
    /// True when the user most likely has to set up or fix an API key.
    pub fn needs_api_key(&self) -> bool {
        match self {
            QuoteError::NoProviderConfigured => true,
            QuoteError::ProviderHttp { status, .. } => matches!(status, 401 | 403),
            // Alpha Vantage reports bad or demo keys as a 200 notice.
            QuoteError::ProviderMessage { text, .. } => {
                let text = text.to_lowercase();
                text.contains("api key") || text.contains("apikey")
            }
            _ => false,
        }
    }

    pub(crate) fn invalid(provider: ProviderKind, symbol: &str, reason: impl Into<String>) -> Self {
        QuoteError::InvalidResponse {
            provider,
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
