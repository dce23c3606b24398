use serde_json::Value;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::http::JournalApi;
use crate::models::summary::DashboardSummary;
use crate::models::trade::{Trade, TradeFormInput};
use crate::validation::{Schema, TradeSchema};

use super::mutation_service::{MutationKind, MutationService};
use super::query_cache::{Collection, QueryCache, QueryKey};
use super::summary_service::SummaryService;

/// Trade reads (cached) and mutations (validated, tracked, invalidating).
pub struct TradeService {
    api: Arc<dyn JournalApi>,
    cache: Arc<QueryCache>,
    mutations: Arc<MutationService>,
}

impl TradeService {
    pub fn new(api: Arc<dyn JournalApi>, cache: Arc<QueryCache>, mutations: Arc<MutationService>) -> Self {
        Self {
            api,
            cache,
            mutations,
        }
    }

    /// Cache key of the full trade listing.
    pub fn list_key() -> QueryKey {
        QueryKey::new(Collection::Trades)
    }

    /// Cache key of a single trade.
    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::new(Collection::Trades).with_param("id", id)
    }

    pub async fn list(&self) -> Result<Vec<Trade>, CoreError> {
        self.cache
            .fetch(Self::list_key(), || self.api.list_trades())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Trade, CoreError> {
        self.cache
            .fetch(Self::detail_key(id), || self.api.get_trade(id))
            .await
    }

    /// Validate a new trade (image required) and create it.
    pub async fn create(&self, input: &TradeFormInput) -> Result<Trade, CoreError> {
        let submission = TradeSchema::for_mode(false).validate(input)?;
        let api = self.api.clone();
        self.mutations
            .execute(Collection::Trades, MutationKind::Create, async move {
                api.create_trade(&submission).await
            })
            .await
    }

    /// Validate an edit (image optional) and update trade `id`.
    pub async fn update(&self, id: &str, input: &TradeFormInput) -> Result<Trade, CoreError> {
        let submission = TradeSchema::for_mode(true).validate(input)?;
        let (api, id) = (self.api.clone(), id.to_string());
        self.mutations
            .execute(Collection::Trades, MutationKind::Update, async move {
                api.update_trade(&id, &submission).await
            })
            .await
    }

    /// Form submit: updates `existing` when editing, creates otherwise.
    pub async fn submit(&self, existing: Option<&Trade>, input: &TradeFormInput) -> Result<Trade, CoreError> {
        match existing {
            Some(trade) => self.update(&trade.id, input).await,
            None => self.create(input).await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<Value, CoreError> {
        let (api, id) = (self.api.clone(), id.to_string());
        self.mutations
            .execute(Collection::Trades, MutationKind::Delete, async move {
                api.delete_trade(&id).await
            })
            .await
    }

    /// Dashboard headline numbers over the (cached) trade listing.
    pub async fn summary(&self) -> Result<DashboardSummary, CoreError> {
        let trades = self.list().await?;
        Ok(SummaryService::new().summarize(&trades))
    }
}
