//! Raw provider payloads and their mapping onto [`Quote`].
//!
//! Normalization is pure: no I/O, no logging beyond what the caller does with the error.

use serde::Deserialize;

use crate::core::{ProviderKind, Quote, QuoteError};

/// Finnhub `/api/v1/quote` body.
#[derive(Debug, Default, Deserialize)]
pub struct FinnhubQuote {
    /// Current price
    pub c: Option<f64>,
    /// Change
    pub d: Option<f64>,
    /// Percent change
    pub dp: Option<f64>,
    /// High price of the day
    pub h: Option<f64>,
    /// Low price of the day
    pub l: Option<f64>,
    /// Open price of the day
    pub o: Option<f64>,
    /// Previous close
    pub pc: Option<f64>,
    pub error: Option<String>,
}

/// Finnhub `/api/v1/stock/profile2` body. Unknown symbols come back as `{}`.
#[derive(Debug, Default, Deserialize)]
pub struct FinnhubProfile {
    pub name: Option<String>,
}

/// Alpha Vantage `GLOBAL_QUOTE` body.
#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    pub global_quote: Option<GlobalQuote>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "09. change")]
    pub change: Option<String>,
    #[serde(rename = "10. change percent")]
    pub change_percent: Option<String>,
}

pub fn normalize_primary(
    symbol: &str,
    quote: &FinnhubQuote,
    profile: &FinnhubProfile,
) -> Result<Quote, QuoteError> {
    let provider = ProviderKind::Primary;
    // Finnhub answers unknown symbols with c = 0 rather than an error.
    let price = match quote.c {
        Some(price) if price > 0.0 && price.is_finite() => price,
        _ => return Err(QuoteError::invalid(provider, symbol, "no current price")),
    };

    let company_name = profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(symbol)
        .to_string();

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        change: quote.d.unwrap_or(0.0),
        change_percent: quote.dp.unwrap_or(0.0),
        company_name,
        volume: None,
        market_cap: None,
    })
}

pub fn normalize_secondary(
    symbol: &str,
    response: &GlobalQuoteResponse,
) -> Result<Quote, QuoteError> {
    let provider = ProviderKind::Secondary;
    let quote = response
        .global_quote
        .as_ref()
        .ok_or_else(|| QuoteError::invalid(provider, symbol, "missing Global Quote object"))?;

    let price = match non_blank(&quote.price) {
        None => return Err(QuoteError::invalid(provider, symbol, "missing price")),
        Some(raw) => match raw.parse::<f64>() {
            Ok(price) if price >= 0.0 && price.is_finite() => price,
            _ => {
                return Err(QuoteError::invalid(
                    provider,
                    symbol,
                    format!("price {raw:?} is not a valid number"),
                ));
            }
        },
    };

    let change = match non_blank(&quote.change) {
        None => 0.0,
        Some(raw) => match raw.parse::<f64>() {
            Ok(change) if change.is_finite() => change,
            _ => {
                return Err(QuoteError::invalid(
                    provider,
                    symbol,
                    format!("change {raw:?} is not a number"),
                ));
            }
        },
    };

    let change_percent = match non_blank(&quote.change_percent) {
        None => 0.0,
        Some(raw) => parse_percent(symbol, raw)?,
    };

    // GLOBAL_QUOTE carries no company name; the echoed ticker stands in for it.
    let company_name = non_blank(&quote.symbol).unwrap_or(symbol).to_string();

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        change,
        change_percent,
        company_name,
        volume: None,
        market_cap: None,
    })
}

/// Parses `"1.23%"` into `1.23`. `NaN` and infinities are rejected.
fn parse_percent(symbol: &str, raw: &str) -> Result<f64, QuoteError> {
    let number = raw.strip_suffix('%').unwrap_or(raw).trim();
    let value = number
        .parse::<f64>()
        .map_err(|source| QuoteError::NumericParse {
            symbol: symbol.to_string(),
            value: raw.to_string(),
            source,
        })?;
    if !value.is_finite() {
        return Err(QuoteError::invalid(
            ProviderKind::Secondary,
            symbol,
            format!("change percent {raw:?} is not a finite number"),
        ));
    }
    Ok(value)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_quote(json: &str) -> GlobalQuoteResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_primary_payload_maps_to_quote() {
        let quote: FinnhubQuote = serde_json::from_str(r#"{"c":150.25,"d":1.5,"dp":1.01}"#).unwrap();
        let profile: FinnhubProfile = serde_json::from_str(r#"{"name":"Apple Inc."}"#).unwrap();

        let result = normalize_primary("AAPL", &quote, &profile).unwrap();
        assert_eq!(
            result,
            Quote {
                symbol: "AAPL".to_string(),
                price: 150.25,
                change: 1.5,
                change_percent: 1.01,
                company_name: "Apple Inc.".to_string(),
                volume: None,
                market_cap: None,
            }
        );
    }

    #[test]
    fn test_primary_defaults_change_and_name() {
        let quote: FinnhubQuote =
            serde_json::from_str(r#"{"c":12.0,"d":null,"dp":null,"pc":12.0}"#).unwrap();
        let profile: FinnhubProfile = serde_json::from_str("{}").unwrap();

        let result = normalize_primary("XYZ", &quote, &profile).unwrap();
        assert_eq!(result.change, 0.0);
        assert_eq!(result.change_percent, 0.0);
        assert_eq!(result.company_name, "XYZ");
    }

    #[test]
    fn test_primary_zero_or_missing_price_is_invalid() {
        let profile = FinnhubProfile::default();
        for body in [r#"{"c":0,"d":null,"dp":null}"#, r#"{"d":1.0}"#] {
            let quote: FinnhubQuote = serde_json::from_str(body).unwrap();
            let err = normalize_primary("NOPE", &quote, &profile).unwrap_err();
            assert!(
                matches!(err, QuoteError::InvalidResponse { ref symbol, .. } if symbol == "NOPE"),
                "unexpected error: {err:?}"
            );
        }
    }

    #[test]
    fn test_secondary_strips_percent_suffix() {
        let response = global_quote(
            r#"{"Global Quote": {
                "01. symbol": "IBM",
                "05. price": "172.5000",
                "09. change": "-2.1000",
                "10. change percent": "1.23%"
            }}"#,
        );
        let result = normalize_secondary("IBM", &response).unwrap();
        assert_eq!(result.symbol, "IBM");
        assert_eq!(result.price, 172.5);
        assert_eq!(result.change, -2.1);
        assert_eq!(result.change_percent, 1.23);
        assert_eq!(result.company_name, "IBM");
    }

    #[test]
    fn test_secondary_keeps_requested_symbol() {
        let response = global_quote(
            r#"{"Global Quote": {"01. symbol": "BRK-B", "05. price": "400.00"}}"#,
        );
        let result = normalize_secondary("BRK.B", &response).unwrap();
        assert_eq!(result.symbol, "BRK.B");
        assert_eq!(result.company_name, "BRK-B");
        assert_eq!(result.change, 0.0);
        assert_eq!(result.change_percent, 0.0);
    }

    #[test]
    fn test_secondary_missing_price_is_invalid() {
        for body in [r#"{"Global Quote": {}}"#, r#"{}"#, r#"{"Global Quote": {"05. price": ""}}"#] {
            let err = normalize_secondary("IBM", &global_quote(body)).unwrap_err();
            assert!(matches!(err, QuoteError::InvalidResponse { .. }), "{body}: {err:?}");
        }
    }

    #[test]
    fn test_secondary_bad_percent_fails_the_quote() {
        let response = global_quote(
            r#"{"Global Quote": {"05. price": "10.0", "10. change percent": "n/a%"}}"#,
        );
        let err = normalize_secondary("IBM", &response).unwrap_err();
        match err {
            QuoteError::NumericParse { symbol, value, .. } => {
                assert_eq!(symbol, "IBM");
                assert_eq!(value, "n/a%");
            }
            other => panic!("expected NumericParse, got {other:?}"),
        }

        for (change, percent) in [("inf", "1.0%"), ("0.5", "NaN%"), ("0.5", "-infinity%")] {
            let body = format!(
                r#"{{"Global Quote": {{"05. price": "10.0", "09. change": "{change}", "10. change percent": "{percent}"}}}}"#
            );
            let err = normalize_secondary("IBM", &global_quote(&body)).unwrap_err();
            assert!(
                matches!(err, QuoteError::InvalidResponse { ref symbol, .. } if symbol == "IBM"),
                "{change} / {percent}: {err:?}"
            );
        }
    }

    #[test]
    fn test_secondary_name_falls_back_to_requested_symbol() {
        let response = global_quote(r#"{"Global Quote": {"01. symbol": " ", "05. price": "5.0"}}"#);
        let result = normalize_secondary("IBM", &response).unwrap();
        assert_eq!(result.company_name, "IBM");
    }
}
