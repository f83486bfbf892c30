//! REST surface served next to `/ws`.
//!
//! Every JSON endpoint answers with the `{Success, Message, Data}` envelope
//! and every response carries `Access-Control-Allow-Origin: *`.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use wisp_core::PluginManager;
use wisp_types::RestResponse;

use crate::catalog::Catalog;
use crate::host;
use crate::images::ImageRegistry;
use crate::settings::SettingsStore;

#[derive(Clone)]
pub struct RestState {
    pub plugins: Arc<PluginManager>,
    pub images: Arc<ImageRegistry>,
    pub catalog: Arc<dyn Catalog>,
    pub settings: Arc<SettingsStore>,
}

pub fn router(state: RestState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plugin/installed", get(installed_plugins))
        .route("/plugin/store", get(store_plugins))
        .route("/theme/store", get(store_themes))
        .route("/theme/installed", get(installed_themes))
        .route("/setting/wox", get(launcher_settings))
        .route("/setting/wox/update", post(update_setting))
        .route("/open/url", get(open_url))
        .route("/image", get(image))
        .with_state(state)
}

/// Adds the permissive CORS header the UI's webview expects.
pub async fn allow_any_origin(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

fn ok(data: impl serde::Serialize) -> Json<RestResponse> {
    match serde_json::to_value(data) {
        Ok(data) => Json(RestResponse::ok(data)),
        Err(e) => Json(RestResponse::error(e.to_string())),
    }
}

async fn index() -> &'static str {
    "Wisp"
}

async fn installed_plugins(State(state): State<RestState>) -> Json<RestResponse> {
    let mut plugins = state.plugins.installed();
    for plugin in &mut plugins {
        let icon = std::mem::take(&mut plugin.icon);
        plugin.icon = state.images.rewrite(icon);
    }
    ok(plugins)
}

async fn store_plugins(State(state): State<RestState>) -> Json<RestResponse> {
    ok(state.catalog.store_plugins())
}

async fn store_themes(State(state): State<RestState>) -> Json<RestResponse> {
    ok(state.catalog.store_themes())
}

async fn installed_themes(State(state): State<RestState>) -> Json<RestResponse> {
    ok(state.catalog.installed_themes())
}

async fn launcher_settings(State(state): State<RestState>) -> Json<RestResponse> {
    ok(state.settings.launcher())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettingUpdate {
    pub key: String,
    pub value: String,
}

async fn update_setting(
    State(state): State<RestState>,
    Json(update): Json<SettingUpdate>,
) -> Json<RestResponse> {
    debug!("Setting update: {}={}", update.key, update.value);
    match state.settings.update(&update.key, &update.value) {
        Ok(_) => Json(RestResponse::ok(json!(""))),
        Err(e) => {
            warn!("Failed to update setting {}: {e}", update.key);
            Json(RestResponse::error(e.to_string()))
        }
    }
}

/// Query of `/open/url`. A missing `url` reads as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpenUrlParams {
    pub url: String,
}

async fn open_url(Query(params): Query<OpenUrlParams>) -> Json<RestResponse> {
    if params.url.is_empty() {
        return Json(RestResponse::error("url is empty"));
    }
    match host::shell_open(&params.url) {
        Ok(()) => Json(RestResponse::ok(json!(""))),
        Err(e) => {
            warn!("Failed to open {}: {e}", params.url);
            Json(RestResponse::error(e.to_string()))
        }
    }
}

/// Query of `/image`. A missing `id` reads as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageParams {
    pub id: String,
}

const IMAGE_CACHE_CONTROL: &str = "public, max-age=3600";

async fn image(State(state): State<RestState>, Query(params): Query<ImageParams>) -> Response {
    if params.id.is_empty() {
        return Json(RestResponse::error("id is empty")).into_response();
    }
    let Some(path) = state.images.path(&params.id) else {
        return image_not_found();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type(&path)),
                (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to read image {}: {e}", path.display());
            image_not_found()
        }
    }
}

fn image_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(RestResponse::error("image not found")),
    )
        .into_response()
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
