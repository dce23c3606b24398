use crate::models::summary::DashboardSummary;
use crate::models::trade::Trade;

/// Computes the dashboard headline numbers.
///
/// Pure arithmetic over what the server returned; trades themselves are
/// never given derived fields.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, trades: &[Trade]) -> DashboardSummary {
        DashboardSummary {
            total_trades: trades.len(),
            open_trades: trades.iter().filter(|t| t.is_open()).count(),
            total_profit_loss: trades.iter().map(|t| t.profit_loss.unwrap_or(0.0)).sum(),
        }
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
