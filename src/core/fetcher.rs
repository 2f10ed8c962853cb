//! Batch quote fetching across the two providers.
//!
//! A batch picks exactly one provider, then walks the symbols one at a time with a
//! minimum spacing between call starts so the provider's per-minute quota holds. The
//! first failure ends the batch; there are no partial results.
//!
//! Dropping the future returned by [`QuoteFetcher::get_quotes`] cancels the batch,
//! including any HTTP request still in flight.

use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use super::config::{ApiCredentials, ProvidersConfig};
use super::error::{ProviderKind, QuoteError};
use super::quote::{Quote, QuoteProvider};
use crate::providers::{AlphaVantageProvider, FinnhubProvider};

/// Spacing between call starts on the primary provider, in pacing units.
pub const PRIMARY_SPACING_UNITS: u32 = 1;
/// Spacing between call starts on the secondary provider (5 calls per minute).
pub const SECONDARY_SPACING_UNITS: u32 = 12;

/// Minimum spacing between consecutive per-symbol calls, per provider.
///
/// `None` lifts pacing for that provider and lets the batch run all calls at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub primary: Option<Duration>,
    pub secondary: Option<Duration>,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::with_unit(Duration::from_secs(1))
    }
}

impl PacingPolicy {
    pub fn with_unit(unit: Duration) -> Self {
        PacingPolicy {
            primary: Some(unit * PRIMARY_SPACING_UNITS),
            secondary: Some(unit * SECONDARY_SPACING_UNITS),
        }
    }

    pub fn unpaced() -> Self {
        PacingPolicy {
            primary: None,
            secondary: None,
        }
    }

    pub fn spacing_for(&self, provider: ProviderKind) -> Option<Duration> {
        match provider {
            ProviderKind::Primary => self.primary,
            ProviderKind::Secondary => self.secondary,
        }
    }
}

/// How one batch will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPlan {
    Paced {
        provider: ProviderKind,
        spacing: Duration,
    },
    Unconstrained {
        provider: ProviderKind,
    },
}

impl ExecutionPlan {
    pub fn provider(&self) -> ProviderKind {
        match self {
            ExecutionPlan::Paced { provider, .. } | ExecutionPlan::Unconstrained { provider } => {
                *provider
            }
        }
    }
}

/// Picks the provider for a batch. The primary wins whenever it is available.
pub fn select_provider(
    primary_available: bool,
    secondary_available: bool,
) -> Result<ProviderKind, QuoteError> {
    match (primary_available, secondary_available) {
        (true, _) => Ok(ProviderKind::Primary),
        (false, true) => Ok(ProviderKind::Secondary),
        (false, false) => Err(QuoteError::NoProviderConfigured),
    }
}

pub struct QuoteFetcher {
    primary: Option<Arc<dyn QuoteProvider>>,
    secondary: Option<Arc<dyn QuoteProvider>>,
    pacing: PacingPolicy,
}

impl QuoteFetcher {
    pub fn new(
        primary: Option<Arc<dyn QuoteProvider>>,
        secondary: Option<Arc<dyn QuoteProvider>>,
    ) -> Self {
        QuoteFetcher {
            primary,
            secondary,
            pacing: PacingPolicy::default(),
        }
    }

    /// Builds HTTP clients for every provider that has a credential.
    pub fn from_config(providers: &ProvidersConfig, credentials: &ApiCredentials) -> Self {
        let primary = credentials.finnhub.as_deref().map(|key| {
            Arc::new(FinnhubProvider::new(&providers.finnhub.base_url, key))
                as Arc<dyn QuoteProvider>
        });
        let secondary = credentials.alpha_vantage.as_deref().map(|key| {
            Arc::new(AlphaVantageProvider::new(
                &providers.alpha_vantage.base_url,
                key,
            )) as Arc<dyn QuoteProvider>
        });
        debug!(
            primary = primary.is_some(),
            secondary = secondary.is_some(),
            "Configured quote providers"
        );
        Self::new(primary, secondary)
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn plan(&self) -> Result<ExecutionPlan, QuoteError> {
        let provider = select_provider(self.primary.is_some(), self.secondary.is_some())?;
        Ok(match self.pacing.spacing_for(provider) {
            Some(spacing) => ExecutionPlan::Paced { provider, spacing },
            None => ExecutionPlan::Unconstrained { provider },
        })
    }

    fn provider(&self, kind: ProviderKind) -> Result<&dyn QuoteProvider, QuoteError> {
        let provider = match kind {
            ProviderKind::Primary => self.primary.as_deref(),
            ProviderKind::Secondary => self.secondary.as_deref(),
        };
        provider.ok_or(QuoteError::NoProviderConfigured)
    }

    /// Fetches quotes for `symbols`, in the same order, or the first error.
    pub async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteError> {
        self.get_quotes_with_progress(symbols, &|_| {}).await
    }

    /// Like [`get_quotes`](Self::get_quotes), calling `on_quote` after each symbol succeeds.
    pub async fn get_quotes_with_progress(
        &self,
        symbols: &[String],
        on_quote: &(dyn Fn(&Quote) + Send + Sync),
    ) -> Result<Vec<Quote>, QuoteError> {
        let plan = self.plan()?;
        let provider = self.provider(plan.provider())?;
        info!(
            provider = %plan.provider(),
            symbols = symbols.len(),
            "Fetching quote batch"
        );

        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        match plan {
            ExecutionPlan::Paced { spacing, .. } => {
                fetch_paced(provider, symbols, spacing, on_quote).await
            }
            ExecutionPlan::Unconstrained { .. } => {
                fetch_unconstrained(provider, symbols, on_quote).await
            }
        }
    }
}

async fn fetch_one(provider: &dyn QuoteProvider, symbol: &str) -> Result<Quote, QuoteError> {
    provider.fetch_quote(symbol).await.inspect_err(|e| {
        warn!(
            provider = %provider.kind(),
            symbol = %symbol,
            error = %e,
            "Failed to fetch quote"
        );
    })
}

/// One call at a time; call N+1 starts once call N finished and `spacing` has passed
/// since call N started.
async fn fetch_paced(
    provider: &dyn QuoteProvider,
    symbols: &[String],
    spacing: Duration,
    on_quote: &(dyn Fn(&Quote) + Send + Sync),
) -> Result<Vec<Quote>, QuoteError> {
    let mut quotes = Vec::with_capacity(symbols.len());
    for (index, symbol) in symbols.iter().enumerate() {
        let started = Instant::now();
        let quote = fetch_one(provider, symbol).await?;
        on_quote(&quote);
        quotes.push(quote);

        if index + 1 < symbols.len() {
            let next_start = started + spacing;
            debug!(
                wait_ms = next_start
                    .saturating_duration_since(Instant::now())
                    .as_millis() as u64,
                "Pacing before next symbol"
            );
            sleep_until(next_start).await;
        }
    }
    Ok(quotes)
}

/// All calls at once. Results keep input order; the first error wins.
async fn fetch_unconstrained(
    provider: &dyn QuoteProvider,
    symbols: &[String],
    on_quote: &(dyn Fn(&Quote) + Send + Sync),
) -> Result<Vec<Quote>, QuoteError> {
    try_join_all(symbols.iter().map(|symbol| async move {
        let quote = fetch_one(provider, symbol).await?;
        on_quote(&quote);
        Ok::<_, QuoteError>(quote)
    }))
    .await
}
