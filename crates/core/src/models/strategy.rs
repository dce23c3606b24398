use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A journaled trading strategy note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(deserialize_with = "super::wire_date::deserialize")]
    pub date: DateTime<Utc>,

    pub content: String,

    #[serde(rename = "userId", alias = "ownerId", default)]
    pub owner_id: String,
}

/// Raw values of the strategy form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyInput {
    pub date: String,
    pub content: String,
}

impl StrategyInput {
    pub fn new(date: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            content: content.into(),
        }
    }

    /// Prefill the edit form from an existing strategy.
    pub fn from_strategy(strategy: &Strategy) -> Self {
        Self {
            date: strategy.date.date_naive().format("%Y-%m-%d").to_string(),
            content: strategy.content.clone(),
        }
    }
}

/// Validated JSON body for strategy create/update: `{date, content}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPayload {
    pub date: NaiveDate,
    pub content: String,
}

/// Sort direction for strategy listings (by date).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    /// Newest first (default for display)
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and sort parameters of a strategy listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StrategyQuery {
    /// Only strategies on this day.
    pub date: Option<NaiveDate>,
    pub sort: SortOrder,
}

impl StrategyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Query-string pairs; an absent date is omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        pairs.push(("sort", self.sort.to_string()));
        pairs
    }
}
