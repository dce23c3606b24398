use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::strategy::{Strategy, StrategyPayload, StrategyQuery};
use crate::models::trade::{Trade, TradeSubmission};
use crate::models::user::User;

/// Every backend endpoint the client consumes.
///
/// `RestJournalApi` talks to the real server; tests substitute in-memory
/// implementations. Authentication is the implementation's concern: callers
/// never pass tokens.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait JournalApi: Send + Sync {
    /// `GET /auth/me`
    async fn current_user(&self) -> Result<User, CoreError>;

    /// `GET /trades`
    async fn list_trades(&self) -> Result<Vec<Trade>, CoreError>;

    /// `GET /trades/:id`
    async fn get_trade(&self, id: &str) -> Result<Trade, CoreError>;

    /// `POST /trades` (multipart)
    async fn create_trade(&self, trade: &TradeSubmission) -> Result<Trade, CoreError>;

    /// `PUT /trades/:id` (multipart)
    async fn update_trade(&self, id: &str, trade: &TradeSubmission) -> Result<Trade, CoreError>;

    /// `DELETE /trades/:id`; the acknowledgement body is returned untouched.
    async fn delete_trade(&self, id: &str) -> Result<Value, CoreError>;

    /// `GET /strategies?date&sort`
    async fn list_strategies(&self, query: &StrategyQuery) -> Result<Vec<Strategy>, CoreError>;

    /// `GET /strategies/:id`
    async fn get_strategy(&self, id: &str) -> Result<Strategy, CoreError>;

    /// `POST /strategies` (JSON)
    async fn create_strategy(&self, strategy: &StrategyPayload) -> Result<Strategy, CoreError>;

    /// `PUT /strategies/:id` (JSON)
    async fn update_strategy(&self, id: &str, strategy: &StrategyPayload) -> Result<Strategy, CoreError>;

    /// `DELETE /strategies/:id`
    async fn delete_strategy(&self, id: &str) -> Result<Value, CoreError>;
}
