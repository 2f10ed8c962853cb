//! Finnhub quote provider (primary).
//!
//! Each symbol costs two calls, `/api/v1/quote` and `/api/v1/stock/profile2`, issued
//! together. The free tier allows 60 calls per minute.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::normalize::{FinnhubProfile, FinnhubQuote, normalize_primary};
use super::util::{build_client, get_json};
use crate::core::{ProviderKind, Quote, QuoteError, QuoteProvider};

const QUOTE_PATH: &str = "/api/v1/quote";
const PROFILE_PATH: &str = "/api/v1/stock/profile2";

pub struct FinnhubProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        FinnhubProvider {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Primary
    }

    #[instrument(name = "FinnhubQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let query = [("symbol", symbol), ("token", self.api_key.as_str())];
        let quote_url = format!("{}{}", self.base_url, QUOTE_PATH);
        let profile_url = format!("{}{}", self.base_url, PROFILE_PATH);

        // Both calls are in flight together; the quote outcome is checked first.
        let (quote, profile) = tokio::join!(
            get_json::<FinnhubQuote>(
                &self.client,
                ProviderKind::Primary,
                "quote",
                &quote_url,
                &query,
                symbol,
            ),
            get_json::<FinnhubProfile>(
                &self.client,
                ProviderKind::Primary,
                "profile",
                &profile_url,
                &query,
                symbol,
            ),
        );
        let quote = quote?;
        let profile = profile?;

        if let Some(text) = quote.error.as_deref().filter(|text| !text.is_empty()) {
            return Err(QuoteError::ProviderMessage {
                provider: ProviderKind::Primary,
                text: text.to_string(),
            });
        }

        let result = normalize_primary(symbol, &quote, &profile)?;
        debug!(price = result.price, "Received Finnhub quote");
        Ok(result)
    }
}
