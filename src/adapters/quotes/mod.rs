//! Market Data Adapter
//!
//! Latest prices and OHLC bars from the public chart API.
//!
//! Sub-modules:
//! - `client`: HTTP client with pacing and retries
//! - `types`: Chart response types and bar conversion
//! - `yahoo`: `QuoteSource` / `BarSource` implementation

pub mod client;
pub mod types;
pub mod yahoo;

pub use client::{QuoteClient, QuoteClientConfig};
pub use yahoo::YahooQuoteSource;
