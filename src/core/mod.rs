//! Core quote abstractions

pub mod config;
pub mod error;
pub mod fetcher;
pub mod log;
pub mod market;
pub mod quote;

// Re-export main types for cleaner imports
pub use error::{ProviderKind, QuoteError};
pub use fetcher::{ExecutionPlan, PacingPolicy, QuoteFetcher};
pub use quote::{Quote, QuoteProvider};
