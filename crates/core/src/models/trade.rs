use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Whether a trade position is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            other => Err(CoreError::Deserialization(format!("unknown trade status: {other}"))),
        }
    }
}

/// A journaled trade as stored by the server.
///
/// Values are kept exactly as the server returns them; nothing is derived
/// client-side. Ownership (`owner_id`) is assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(deserialize_with = "super::wire_date::deserialize")]
    pub date: DateTime<Utc>,

    /// URL of the uploaded setup screenshot.
    pub setup_image: String,

    pub reason: String,

    pub status: TradeStatus,

    pub entry_price: f64,

    pub quantity: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_loss_percentage: Option<f64>,

    #[serde(rename = "userId", alias = "ownerId", default)]
    pub owner_id: String,
}

impl Trade {
    /// Calendar date of the trade (UTC).
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }
}

/// An image attached to a trade form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Read an image from disk, guessing its MIME type from the extension.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_from_extension(&file_name).to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}

fn mime_from_extension(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Raw values of the trade form, before coercion.
///
/// Numeric fields stay strings here because that is what a form hands over;
/// `TradeSchema` turns them into a `TradeSubmission`.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFormInput {
    pub date: String,
    pub reason: String,
    pub status: String,
    pub entry_price: String,
    pub quantity: String,
    pub profit_loss: Option<String>,
    pub profit_loss_percentage: Option<String>,
    /// Files picked in the image input (zero or more).
    pub setup_image: Vec<ImageFile>,
}

impl Default for TradeFormInput {
    fn default() -> Self {
        Self {
            date: String::new(),
            reason: String::new(),
            status: TradeStatus::Open.to_string(),
            entry_price: "0".to_string(),
            quantity: "1".to_string(),
            profit_loss: None,
            profit_loss_percentage: None,
            setup_image: Vec::new(),
        }
    }
}

impl TradeFormInput {
    /// Prefill the edit form from an existing trade. No image is attached,
    /// which keeps the stored one unless the user picks a new file.
    pub fn from_trade(trade: &Trade) -> Self {
        Self {
            date: trade.day().format("%Y-%m-%d").to_string(),
            reason: trade.reason.clone(),
            status: trade.status.to_string(),
            entry_price: trade.entry_price.to_string(),
            quantity: trade.quantity.to_string(),
            profit_loss: trade.profit_loss.map(|v| v.to_string()),
            profit_loss_percentage: trade.profit_loss_percentage.map(|v| v.to_string()),
            setup_image: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: ImageFile) -> Self {
        self.setup_image.push(image);
        self
    }
}

/// A validated trade, ready to send as multipart form data.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeSubmission {
    pub date: NaiveDate,
    pub reason: String,
    pub status: TradeStatus,
    pub entry_price: f64,
    pub quantity: u64,
    pub profit_loss: Option<f64>,
    pub profit_loss_percentage: Option<f64>,
    /// `None` on update keeps the image already stored.
    pub setup_image: Option<ImageFile>,
}

impl TradeSubmission {
    /// Text parts of the multipart body, in form order. Absent optional
    /// numbers are left out entirely.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("date", self.date.format("%Y-%m-%d").to_string()),
            ("reason", self.reason.clone()),
            ("status", self.status.to_string()),
            ("entryPrice", self.entry_price.to_string()),
            ("quantity", self.quantity.to_string()),
        ];
        if let Some(pl) = self.profit_loss {
            fields.push(("profitLoss", pl.to_string()));
        }
        if let Some(pct) = self.profit_loss_percentage {
            fields.push(("profitLossPercentage", pct.to_string()));
        }
        fields
    }
}
