//! Alpha Vantage quote provider (secondary).
//!
//! One `GLOBAL_QUOTE` call per symbol. The free tier allows 5 calls per minute, and
//! over-quota requests still answer 200 with an `Information` or `Note` notice.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::normalize::{GlobalQuoteResponse, normalize_secondary};
use super::util::{build_client, get_json};
use crate::core::{ProviderKind, Quote, QuoteError, QuoteProvider};

const QUERY_PATH: &str = "/query";

pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        AlphaVantageProvider {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn check_api_message(response: &GlobalQuoteResponse) -> Result<(), QuoteError> {
        let message = response
            .information
            .as_ref()
            .or(response.note.as_ref())
            .or(response.error_message.as_ref());

        match message {
            Some(text) => {
                warn!("Alpha Vantage notice: {}", text);
                Err(QuoteError::ProviderMessage {
                    provider: ProviderKind::Secondary,
                    text: text.clone(),
                })
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Secondary
    }

    #[instrument(name = "AlphaVantageQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let url = format!("{}{}", self.base_url, QUERY_PATH);
        let query = [
            ("function", "GLOBAL_QUOTE"),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];

        let response: GlobalQuoteResponse = get_json(
            &self.client,
            ProviderKind::Secondary,
            "GLOBAL_QUOTE",
            &url,
            &query,
            symbol,
        )
        .await?;

        Self::check_api_message(&response)?;

        let result = normalize_secondary(symbol, &response)?;
        debug!(price = result.price, "Received Alpha Vantage quote");
        Ok(result)
    }
}
