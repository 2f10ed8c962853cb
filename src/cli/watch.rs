use super::quotes::{self, QuoteOptions};
use super::ui;
use crate::core::market::MarketHours;
use crate::core::{Quote, QuoteError, QuoteFetcher};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Market label line, e.g. `Market Open` or `Market Closed (Prices from last trading day)`.
pub fn market_label(market: &MarketHours, now: NaiveDateTime) -> String {
    if market.is_open_at(now) {
        ui::style_text("Market Open", ui::StyleType::Positive)
    } else {
        format!(
            "{} {}",
            ui::style_text("Market Closed", ui::StyleType::Negative),
            ui::style_text("(Prices from last trading day)", ui::StyleType::Subtle)
        )
    }
}

/// Renders one poll cycle: header plus quotes, or the error text.
pub fn render_cycle(
    result: &Result<Vec<Quote>, QuoteError>,
    options: &QuoteOptions,
    market: &MarketHours,
    now: NaiveDateTime,
) -> Result<String> {
    let label = market_label(market, now);
    Ok(match result {
        Ok(quotes) => format!(
            "Last updated: {} • {}\n\n{}",
            now.format("%H:%M:%S"),
            label,
            quotes::render(quotes, options)?
        ),
        Err(e) => format!("{}\n\n{}", label, quotes::describe_error(e)),
    })
}

/// Polls every `refresh` until Ctrl-C. A failed cycle is shown and retried on the next tick.
///
/// Cycles never overlap: a slow paced batch delays the next tick instead of racing it.
pub async fn run(
    fetcher: &QuoteFetcher,
    symbols: &[String],
    refresh: Duration,
    options: &QuoteOptions,
) -> Result<()> {
    let market = MarketHours::default();
    let mut ticker = tokio::time::interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut first = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        // Ctrl-C drops the in-flight batch, which cancels its HTTP requests.
        let result = tokio::select! {
            result = fetcher.get_quotes(symbols) => result,
            _ = tokio::signal::ctrl_c() => break,
        };
        if let Err(e) = &result {
            warn!(error = %e, "Poll cycle failed, retrying on next tick");
        }

        if !first {
            ui::print_separator();
        }
        first = false;
        println!(
            "{}",
            render_cycle(&result, options, &market, Local::now().naive_local())?
        );
    }

    info!("Stopped watching quotes");
    Ok(())
}
