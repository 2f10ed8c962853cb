//! Quote record and the provider capability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{ProviderKind, QuoteError};

/// Provider-independent quote for one symbol at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Always the requested symbol, never a provider-side rename.
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    /// Display name, the symbol when the provider has none.
    pub company_name: String,
    // Reserved, no provider fills these yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError>;
}

/// Trims and upper-cases symbols, dropping blanks and repeats so a batch is an ordered set.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if !symbol.is_empty() && !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    seen
}
