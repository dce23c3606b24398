use serde_json::Value;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::http::JournalApi;
use crate::models::strategy::{Strategy, StrategyInput, StrategyQuery};
use crate::validation::{Schema, StrategySchema};

use super::mutation_service::{MutationKind, MutationService};
use super::query_cache::{Collection, QueryCache, QueryKey};

/// Strategy reads (cached per filter/sort) and mutations.
pub struct StrategyService {
    api: Arc<dyn JournalApi>,
    cache: Arc<QueryCache>,
    mutations: Arc<MutationService>,
}

impl StrategyService {
    pub fn new(api: Arc<dyn JournalApi>, cache: Arc<QueryCache>, mutations: Arc<MutationService>) -> Self {
        Self {
            api,
            cache,
            mutations,
        }
    }

    /// Cache key of a listing; each filter/sort combination is its own key.
    pub fn list_key(query: &StrategyQuery) -> QueryKey {
        let date = query
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        QueryKey::new(Collection::Strategies)
            .with_param("date", date)
            .with_param("sort", query.sort.as_str())
    }

    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::new(Collection::Strategies).with_param("id", id)
    }

    pub async fn list(&self, query: &StrategyQuery) -> Result<Vec<Strategy>, CoreError> {
        self.cache
            .fetch(Self::list_key(query), || self.api.list_strategies(query))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Strategy, CoreError> {
        self.cache
            .fetch(Self::detail_key(id), || self.api.get_strategy(id))
            .await
    }

    pub async fn create(&self, input: &StrategyInput) -> Result<Strategy, CoreError> {
        let payload = StrategySchema.validate(input)?;
        let api = self.api.clone();
        self.mutations
            .execute(Collection::Strategies, MutationKind::Create, async move {
                api.create_strategy(&payload).await
            })
            .await
    }

    pub async fn update(&self, id: &str, input: &StrategyInput) -> Result<Strategy, CoreError> {
        let payload = StrategySchema.validate(input)?;
        let (api, id) = (self.api.clone(), id.to_string());
        self.mutations
            .execute(Collection::Strategies, MutationKind::Update, async move {
                api.update_strategy(&id, &payload).await
            })
            .await
    }

    /// Form submit: updates `existing` when editing, creates otherwise.
    pub async fn submit(&self, existing: Option<&Strategy>, input: &StrategyInput) -> Result<Strategy, CoreError> {
        match existing {
            Some(strategy) => self.update(&strategy.id, input).await,
            None => self.create(input).await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<Value, CoreError> {
        let (api, id) = (self.api.clone(), id.to_string());
        self.mutations
            .execute(Collection::Strategies, MutationKind::Delete, async move {
                api.delete_strategy(&id).await
            })
            .await
    }
}
