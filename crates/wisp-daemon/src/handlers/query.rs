//! `Query` handler.

use serde_json::Value;
use tracing::debug;
use wisp_core::TraceContext;
use wisp_types::QueryPayload;

use crate::error::Result;

use super::WispHandler;

/// Run every matching plugin and return the merged result payloads.
///
/// Each action in the reply is registered, so the UI can send its id back
/// in an `Action` request.
pub(super) async fn handle_query(
    handler: &WispHandler,
    ctx: &TraceContext,
    payload: QueryPayload,
) -> Result<Value> {
    let query = handler
        .plugins
        .parse_query(&payload.query, payload.query_type);
    debug!(
        "Query: raw='{}', keyword='{}', search='{}'",
        query.raw_query, query.trigger_keyword, query.search
    );

    let mut results = handler.plugins.query_payloads(ctx, &query).await;
    for result in &mut results {
        handler.images.rewrite_result(result);
    }
    debug!("Query '{}' produced {} result(s)", query.raw_query, results.len());

    Ok(serde_json::to_value(results)?)
}
