//! Public types for the poetry API
use serde::{Deserialize, Serialize};

/// Shown when the gateway fails for any reason other than rate or
/// quota limits.
pub const POETRY_FAILED: &str = "خطأ في إنشاء الشعر";

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PoetryRequest {
    #[serde(default)]
    pub topic: Option<String>,
    // Arabic style selector, see `PoetryStyle::from_selector`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PoetryResponse {
    pub poetry: String,
}
