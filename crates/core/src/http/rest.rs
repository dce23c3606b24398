use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::strategy::{Strategy, StrategyPayload, StrategyQuery};
use crate::models::trade::{Trade, TradeSubmission};
use crate::models::user::User;

use super::client::HttpClient;
use super::traits::JournalApi;

/// `JournalApi` over HTTP, using the shared `HttpClient`.
#[derive(Debug)]
pub struct RestJournalApi {
    http: HttpClient,
}

impl RestJournalApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

/// Path for one entity of a collection, refusing ids that would escape it.
/// Dot segments count as escaping: URL parsing folds them into the parent.
pub fn entity_path(collection: &str, id: &str) -> Result<String, CoreError> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '?', '#']) {
        return Err(CoreError::InvalidRequest(format!("invalid {collection} id: {id:?}")));
    }
    Ok(format!("/{collection}/{id}"))
}

/// Multipart body for trade create/update. The image part is only present
/// when a file was attached.
pub fn trade_form(trade: &TradeSubmission) -> Result<Form, CoreError> {
    let mut form = Form::new();
    for (name, value) in trade.form_fields() {
        form = form.text(name, value);
    }
    if let Some(image) = &trade.setup_image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| CoreError::InvalidRequest(format!("bad image MIME type {:?}: {e}", image.mime_type)))?;
        form = form.part("setupImage", part);
    }
    Ok(form)
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl JournalApi for RestJournalApi {
    async fn current_user(&self) -> Result<User, CoreError> {
        let request = self.http.request(Method::GET, "/auth/me")?;
        self.http.send(request).await
    }

    async fn list_trades(&self) -> Result<Vec<Trade>, CoreError> {
        let request = self.http.request(Method::GET, "/trades")?;
        self.http.send(request).await
    }

    async fn get_trade(&self, id: &str) -> Result<Trade, CoreError> {
        let request = self.http.request(Method::GET, &entity_path("trades", id)?)?;
        self.http.send(request).await
    }

    async fn create_trade(&self, trade: &TradeSubmission) -> Result<Trade, CoreError> {
        let request = self
            .http
            .request(Method::POST, "/trades")?
            .multipart(trade_form(trade)?);
        self.http.send(request).await
    }

    async fn update_trade(&self, id: &str, trade: &TradeSubmission) -> Result<Trade, CoreError> {
        let request = self
            .http
            .request(Method::PUT, &entity_path("trades", id)?)?
            .multipart(trade_form(trade)?);
        self.http.send(request).await
    }

    async fn delete_trade(&self, id: &str) -> Result<Value, CoreError> {
        let request = self.http.request(Method::DELETE, &entity_path("trades", id)?)?;
        self.http.send_ack(request).await
    }

    async fn list_strategies(&self, query: &StrategyQuery) -> Result<Vec<Strategy>, CoreError> {
        let request = self
            .http
            .request(Method::GET, "/strategies")?
            .query(&query.query_pairs());
        self.http.send(request).await
    }

    async fn get_strategy(&self, id: &str) -> Result<Strategy, CoreError> {
        let request = self.http.request(Method::GET, &entity_path("strategies", id)?)?;
        self.http.send(request).await
    }

    async fn create_strategy(&self, strategy: &StrategyPayload) -> Result<Strategy, CoreError> {
        let request = self.http.request(Method::POST, "/strategies")?.json(strategy);
        self.http.send(request).await
    }

    async fn update_strategy(&self, id: &str, strategy: &StrategyPayload) -> Result<Strategy, CoreError> {
        let request = self
            .http
            .request(Method::PUT, &entity_path("strategies", id)?)?
            .json(strategy);
        self.http.send(request).await
    }

    async fn delete_strategy(&self, id: &str) -> Result<Value, CoreError> {
        let request = self
            .http
            .request(Method::DELETE, &entity_path("strategies", id)?)?;
        self.http.send_ack(request).await
    }
}
