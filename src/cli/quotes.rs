use super::ui;
use crate::core::{Quote, QuoteError, QuoteFetcher};
use anyhow::{Context, Result};
use clap::ValueEnum;
use comfy_table::Cell;

const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ViewMode {
    #[default]
    Table,
    Chart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortField {
    #[default]
    Symbol,
    Price,
    Change,
    ChangePercent,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteOptions {
    pub view: ViewMode,
    pub search: Option<String>,
    pub sort: SortField,
    pub descending: bool,
    pub json: bool,
}

/// Case-insensitive match on symbol or company name. A blank term keeps everything.
pub fn filter_quotes<'a>(quotes: &'a [Quote], term: Option<&str>) -> Vec<&'a Quote> {
    let term = term.map(str::trim).unwrap_or_default().to_lowercase();
    quotes
        .iter()
        .filter(|quote| {
            term.is_empty()
                || quote.symbol.to_lowercase().contains(&term)
                || quote.company_name.to_lowercase().contains(&term)
        })
        .collect()
}

pub fn sort_quotes(quotes: &mut [&Quote], field: SortField, descending: bool) {
    quotes.sort_by(|a, b| {
        let ordering = match field {
            SortField::Symbol => a.symbol.cmp(&b.symbol),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Change => a.change.total_cmp(&b.change),
            SortField::ChangePercent => a.change_percent.total_cmp(&b.change_percent),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

pub fn render_table(quotes: &[&Quote]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Company"),
        ui::header_cell("Price"),
        ui::header_cell("Change"),
        ui::header_cell("Change %"),
    ]);

    for quote in quotes {
        table.add_row(vec![
            Cell::new(&quote.symbol),
            Cell::new(&quote.company_name),
            ui::number_cell(quote.price),
            ui::change_cell(quote.change, ""),
            ui::change_cell(quote.change_percent, "%"),
        ]);
    }
    table.to_string()
}

/// One horizontal price bar per quote, scaled to the highest price.
pub fn render_chart(quotes: &[&Quote]) -> String {
    let max_price = quotes.iter().map(|q| q.price).fold(0.0_f64, f64::max);
    let label_width = quotes.iter().map(|q| q.symbol.len()).max().unwrap_or(0);

    quotes
        .iter()
        .map(|quote| {
            let filled = if max_price > 0.0 {
                ((quote.price / max_price) * CHART_WIDTH as f64).round() as usize
            } else {
                0
            };
            let bar = format!(
                "{}{}",
                "█".repeat(filled),
                "░".repeat(CHART_WIDTH.saturating_sub(filled))
            );
            format!(
                "{:<label_width$}  {}  {:>10.2}",
                quote.symbol,
                ui::style_text(&bar, ui::signed_style(quote.change)),
                quote.price
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies search and sort, then renders in the requested view.
pub fn render(quotes: &[Quote], options: &QuoteOptions) -> Result<String> {
    let mut visible = filter_quotes(quotes, options.search.as_deref());
    sort_quotes(&mut visible, options.sort, options.descending);

    if options.json {
        return serde_json::to_string_pretty(&visible).context("Failed to serialize quotes");
    }
    if visible.is_empty() {
        return Ok(ui::style_text("No quotes match the search.", ui::StyleType::Subtle));
    }
    Ok(match options.view {
        ViewMode::Table => render_table(&visible),
        ViewMode::Chart => render_chart(&visible),
    })
}

/// Human-readable failure text, with setup steps when a key is missing or rejected.
pub fn describe_error(error: &QuoteError) -> String {
    let mut text = ui::style_text(&error.to_string(), ui::StyleType::Error);
    if error.needs_api_key() {
        text.push_str("\n\n");
        text.push_str(&setup_instructions());
    }
    text
}

pub fn setup_instructions() -> String {
    format!(
        "To get real stock data, you need a free API key:\n\
         \n  Option 1 - Finnhub (recommended): get a key at https://finnhub.io\n    \
         export {}=your_key_here\n\
         \n  Option 2 - Alpha Vantage: get a key at https://www.alphavantage.co/support/#api-key\n    \
         export {}=your_key_here",
        crate::core::config::FINNHUB_API_KEY_VAR,
        crate::core::config::ALPHA_VANTAGE_API_KEY_VAR,
    )
}

pub async fn run(fetcher: &QuoteFetcher, symbols: &[String], options: &QuoteOptions) -> Result<()> {
    let pb = ui::new_progress_bar(symbols.len() as u64);
    pb.set_message("Fetching quotes...");

    let result = fetcher
        .get_quotes_with_progress(symbols, &|_| pb.inc(1))
        .await;
    pb.finish_and_clear();

    match result {
        Ok(quotes) => {
            println!("{}", render(&quotes, options)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", describe_error(&e));
            Err(e).context("Failed to fetch stock data")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, name: &str, price: f64, change: f64, change_percent: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            change,
            change_percent,
            company_name: name.to_string(),
            volume: None,
            market_cap: None,
        }
    }

    fn sample() -> Vec<Quote> {
        vec![
            quote("MSFT", "Microsoft Corporation", 410.1, -3.2, -0.77),
            quote("AAPL", "Apple Inc", 150.25, 1.5, 1.01),
            quote("TSLA", "Tesla Inc", 250.0, 10.0, 4.17),
        ]
    }

    #[test]
    fn test_filter_matches_symbol_or_company() {
        let quotes = sample();
        let by_symbol: Vec<_> = filter_quotes(&quotes, Some("aap"))
            .into_iter()
            .map(|q| q.symbol.as_str())
            .collect();
        assert_eq!(by_symbol, vec!["AAPL"]);

        let by_name: Vec<_> = filter_quotes(&quotes, Some("INC"))
            .into_iter()
            .map(|q| q.symbol.as_str())
            .collect();
        assert_eq!(by_name, vec!["AAPL", "TSLA"]);

        assert_eq!(filter_quotes(&quotes, Some("  ")).len(), 3);
        assert_eq!(filter_quotes(&quotes, None).len(), 3);
    }

    #[test]
    fn test_sort_by_each_field() {
        let quotes = sample();
        let mut visible = filter_quotes(&quotes, None);

        sort_quotes(&mut visible, SortField::Symbol, false);
        let order: Vec<_> = visible.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "TSLA"]);

        sort_quotes(&mut visible, SortField::Price, true);
        let order: Vec<_> = visible.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(order, vec!["MSFT", "TSLA", "AAPL"]);

        sort_quotes(&mut visible, SortField::ChangePercent, false);
        let order: Vec<_> = visible.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(order, vec!["MSFT", "AAPL", "TSLA"]);
    }

    #[test]
    fn test_render_json_is_filtered_and_sorted() {
        let options = QuoteOptions {
            search: Some("inc".to_string()),
            sort: SortField::Price,
            descending: true,
            json: true,
            ..Default::default()
        };
        let json = render(&sample(), &options).unwrap();
        let parsed: Vec<Quote> = serde_json::from_str(&json).unwrap();
        let order: Vec<_> = parsed.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(order, vec!["TSLA", "AAPL"]);
        assert!(json.contains("\"changePercent\""));
    }

    #[test]
    fn test_render_table_contains_rows() {
        let quotes = sample();
        let table = render_table(&filter_quotes(&quotes, None));
        assert!(table.contains("Symbol"));
        assert!(table.contains("Apple Inc"));
        assert!(table.contains("150.25"));
        assert!(table.contains("-3.20"));
    }

    #[test]
    fn test_render_chart_one_line_per_quote() {
        let quotes = sample();
        let chart = render_chart(&filter_quotes(&quotes, None));
        assert_eq!(chart.lines().count(), 3);
        assert!(chart.contains("410.10"));
    }

    #[test]
    fn test_describe_error_adds_setup_for_missing_keys() {
        let text = describe_error(&QuoteError::NoProviderConfigured);
        assert!(text.contains("API key"));
        assert!(text.contains("FINNHUB_API_KEY=your_key_here"));

        let text = describe_error(&QuoteError::ProviderMessage {
            provider: crate::core::ProviderKind::Secondary,
            text: "rate limit".to_string(),
        });
        assert!(!text.contains("your_key_here"));
    }

    #[test]
    fn test_describe_error_adds_setup_for_rejected_key_notice() {
        let text = describe_error(&QuoteError::ProviderMessage {
            provider: crate::core::ProviderKind::Secondary,
            text: "the parameter apikey is invalid or missing. Please claim your free API key."
                .to_string(),
        });
        assert!(text.contains("apikey is invalid"));
        assert!(text.contains("ALPHA_VANTAGE_API_KEY=your_key_here"));
    }
}
