use serde::{Deserialize, Serialize};

/// Headline numbers shown above the trades table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_trades: usize,
    pub open_trades: usize,
    /// Sum of `profit_loss`; trades without one count as 0.
    pub total_profit_loss: f64,
}

/// Two-decimal display of an optional amount, `N/A` when absent.
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

/// Two-decimal display of an optional percentage with a `%` suffix.
pub fn format_percentage(value: Option<f64>) -> String {
    format!("{}%", format_amount(value))
}
