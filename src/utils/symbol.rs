// src/utils/symbol.rs

/// Strips the quote suffix: "ETHUSDT" -> "ETH". Symbols that are only the
/// suffix, or do not end with it, come back unchanged.
pub fn coin_of<'a>(symbol: &'a str, quote_suffix: &str) -> &'a str {
    match symbol.strip_suffix(quote_suffix) {
        Some(coin) if !coin.is_empty() => coin,
        _ => symbol,
    }
}

/// Exchange coin back to the caller's convention: "ETH" -> "ETHUSDT".
pub fn symbol_of(coin: &str, quote_suffix: &str) -> String {
    format!("{}{}", coin, quote_suffix)
}
