//! Instrument identifiers and the default tracking universe.
//!
//! Symbols are carried in their Yahoo Finance form (`RELIANCE.NS`) at
//! the ports boundary and stripped of the exchange suffix for display
//! and persistence.

/// Lightweight instrument identifier used at the ports boundary.
pub type Symbol = String;

/// Exchange suffix appended to NSE symbols by the quote provider.
pub const NSE_SUFFIX: &str = ".NS";

/// NIFTY 50 constituents with verified Yahoo Finance tickers.
pub const NIFTY_50: [&str; 50] = [
    "ADANIENT.NS", "ADANIPORTS.NS", "APOLLOHOSP.NS", "ASIANPAINT.NS", "AXISBANK.NS",
    "BAJAJ-AUTO.NS", "BAJFINANCE.NS", "BAJAJFINSV.NS", "BHARTIARTL.NS", "BPCL.NS",
    "BRITANNIA.NS", "CIPLA.NS", "COALINDIA.NS", "DIVISLAB.NS", "DRREDDY.NS",
    "EICHERMOT.NS", "GRASIM.NS", "HCLTECH.NS", "HDFCBANK.NS", "HDFCLIFE.NS",
    "HEROMOTOCO.NS", "HINDALCO.NS", "HINDUNILVR.NS", "ICICIBANK.NS", "ITC.NS",
    "INDUSINDBK.NS", "INFY.NS", "JSWSTEEL.NS", "KOTAKBANK.NS", "LT.NS",
    "LTIM.NS", "M&M.NS", "MARUTI.NS", "NESTLEIND.NS", "NTPC.NS",
    "ONGC.NS", "POWERGRID.NS", "RELIANCE.NS", "SBILIFE.NS", "SBIN.NS",
    "SHRIRAMFIN.NS", "SUNPHARMA.NS", "TCS.NS", "TATACONSUM.NS", "TATAMOTORS.NS",
    "TATASTEEL.NS", "TECHM.NS", "TITAN.NS", "ULTRACEMCO.NS", "WIPRO.NS",
];

/// The default universe as owned symbols, in index order.
pub fn nifty_50() -> Vec<Symbol> {
    NIFTY_50.iter().map(|s| (*s).to_string()).collect()
}

/// Strip the exchange suffix for human-facing output.
pub fn display_symbol(symbol: &str) -> &str {
    symbol.strip_suffix(NSE_SUFFIX).unwrap_or(symbol)
}

/// A quoted price is usable only if it is finite and strictly positive.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
