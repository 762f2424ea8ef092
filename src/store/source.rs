//! Read-side contract for price history

use crate::{errors::AnalyzerResult, types::PriceObservation};

/// Anything that can hand out a symbol's price history.
///
/// Implementations may return observations in any order and may include
/// several observations at the same instant; consumers sort as needed.
pub trait QuoteSource {
    /// Quotes for `symbol`, limited to the trailing `days` when given.
    /// An unknown symbol yields an empty list.
    fn get_quotes(&self, symbol: &str, days: Option<u32>) -> AnalyzerResult<Vec<PriceObservation>>;
}

impl<T: QuoteSource + ?Sized> QuoteSource for &T {
    fn get_quotes(&self, symbol: &str, days: Option<u32>) -> AnalyzerResult<Vec<PriceObservation>> {
        (**self).get_quotes(symbol, days)
    }
}
