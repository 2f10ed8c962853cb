pub mod alpha_vantage;
pub mod finnhub;
pub mod normalize;
pub(crate) mod util;

pub use alpha_vantage::AlphaVantageProvider;
pub use finnhub::FinnhubProvider;
