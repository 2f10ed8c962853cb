use crate::core::{ProviderKind, QuoteError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client() -> Client {
    Client::builder()
        .user_agent("tickerboard/0.1")
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// One provider GET call for `symbol`.
///
/// Non-2xx answers become [`QuoteError::ProviderHttp`] tagged with `endpoint`; a body
/// that is not the expected JSON shape becomes [`QuoteError::InvalidResponse`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: ProviderKind,
    endpoint: &'static str,
    url: &str,
    query: &[(&str, &str)],
    symbol: &str,
) -> Result<T, QuoteError> {
    debug!(%provider, endpoint, url, "Requesting quote data");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| QuoteError::Network { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(QuoteError::ProviderHttp {
            provider,
            endpoint,
            status: status.as_u16(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|source| QuoteError::Network { provider, source })?;

    serde_json::from_str(&text).map_err(|e| {
        error!(
            error = ?e,
            response = %text,
            "Failed to parse {} {} response", provider, endpoint
        );
        QuoteError::invalid(provider, symbol, format!("malformed {endpoint} payload: {e}"))
    })
}
