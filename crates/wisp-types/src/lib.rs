//! Shared wire types for wisp components.
//!
//! Everything here crosses the websocket bridge or the REST surface as JSON.
//! Field names follow the UI's PascalCase convention.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Deserialize a Vec that may be null or missing (both become empty vec)
fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// How the UI should interpret [`WispImage::image_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// Absolute path on the backend host; rewritten to a URL before it is sent
    Absolute,
    Svg,
    Url,
    Base64,
    Emoji,
}

/// Image reference rendered by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WispImage {
    pub image_type: ImageType,
    pub image_data: String,
}

impl WispImage {
    #[must_use]
    pub fn svg(data: impl Into<String>) -> Self {
        Self {
            image_type: ImageType::Svg,
            image_data: data.into(),
        }
    }

    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            image_type: ImageType::Url,
            image_data: url.into(),
        }
    }

    #[must_use]
    pub fn absolute(path: impl Into<String>) -> Self {
        Self {
            image_type: ImageType::Absolute,
            image_data: path.into(),
        }
    }

    #[must_use]
    pub fn emoji(text: impl Into<String>) -> Self {
        Self {
            image_type: ImageType::Emoji,
            image_data: text.into(),
        }
    }

    #[must_use]
    pub fn is_local_file(&self) -> bool {
        self.image_type == ImageType::Absolute
    }
}

impl Default for WispImage {
    fn default() -> Self {
        Self::emoji("")
    }
}

/// Side panel preview. The UI always reads this object, so it is sent even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PreviewPayload {
    #[serde(default)]
    pub preview_type: String,
    #[serde(default)]
    pub preview_data: String,
    #[serde(default)]
    pub preview_properties: HashMap<String, String>,
}

/// Action entry of a result as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionPayload {
    /// Registry id the UI sends back in an `Action` request
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

/// One query result as seen by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultPayload {
    pub id: String,
    /// Raw query text this result answers; the UI discards results for stale queries
    pub associated_query: String,
    pub title: String,
    #[serde(default)]
    pub sub_title: String,
    pub icon: WispImage,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub preview: PreviewPayload,
    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub actions: Vec<ActionPayload>,
}

impl ResultPayload {
    /// The action the UI runs on Enter, if any.
    #[must_use]
    pub fn default_action(&self) -> Option<&ActionPayload> {
        self.actions.iter().find(|a| a.is_default)
    }
}

/// Kind of query text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    #[serde(alias = "text")]
    Input,
    Selection,
}

/// Data of an inbound `Query` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPayload {
    pub query: String,
    #[serde(default, rename = "type")]
    pub query_type: QueryType,
}

/// Data of an inbound `Action` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub id: String,
}

/// Query text pushed to the UI, e.g. by a plugin's "recalculate" action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlainQuery {
    pub query_type: QueryType,
    pub query_text: String,
}

impl PlainQuery {
    #[must_use]
    pub fn input(text: impl Into<String>) -> Self {
        Self {
            query_type: QueryType::Input,
            query_text: text.into(),
        }
    }
}

/// Installed plugin as listed by `GET /plugin/installed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstalledPlugin {
    pub id: String,
    pub name: String,
    pub author: String,
    pub version: String,
    pub description: String,
    pub icon: WispImage,
    pub trigger_keywords: Vec<String>,
    #[serde(rename = "SupportedOS")]
    pub supported_os: Vec<String>,
}

/// Plugin offered by the store catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorePlugin {
    pub id: String,
    pub name: String,
    pub author: String,
    pub version: String,
    pub description: String,
    pub icon: WispImage,
    pub website: String,
    pub is_installed: bool,
}

/// Theme entry for the theme endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Theme {
    pub theme_id: String,
    pub theme_name: String,
    pub theme_author: String,
    pub version: String,
    pub is_installed: bool,
}

/// Envelope of every REST response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestResponse {
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}

impl RestResponse {
    #[must_use]
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: String::new(),
            data,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: serde_json::Value::String(String::new()),
        }
    }
}
