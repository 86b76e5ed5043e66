use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::{
    dispatch::{refresh_shortcut, to_rows, SuggestRequest, SuggestionDispatcher},
    error::SuggestError,
};

/// Shared state for one transport session.
#[derive(Clone)]
pub struct TransportContext {
    pub dispatcher: Arc<SuggestionDispatcher>,
    pub boot_timestamp: OffsetDateTime,
}

pub async fn serve_stdio(context: TransportContext) -> Result<()> {
    let reader = BufReader::new(io::stdin());
    serve(context, reader, io::stdout()).await
}

/// Line-delimited JSON-RPC loop. Returns when the reader hits EOF.
pub async fn serve<R, W>(context: TransportContext, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = String::new();
    loop {
        buffer.clear();
        let bytes = reader.read_line(&mut buffer).await?;
        if bytes == 0 {
            info!(target: "lastfm_suggest_transport", "input closed; shutting down");
            break;
        }
        if buffer.trim().is_empty() {
            continue;
        }

        debug!(target: "lastfm_suggest_transport", request = buffer.trim());
        let maybe_response = match serde_json::from_str::<RpcRequest>(&buffer) {
            Ok(request) => handle_request(&context, request).await,
            Err(error) => {
                warn!(target: "lastfm_suggest_transport", error = %error, "Failed to parse request");
                Some(RpcResponse::error(None, PARSE_ERROR, "Parse error"))
            }
        };

        if let Some(response) = maybe_response {
            let payload = serde_json::to_string(&response)?;
            writer.write_all(payload.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

impl RpcResponse {
    fn result(id: Option<Value>, value: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(value),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SuggestParams {
    query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ShortcutParams {
    id: Option<String>,
}

async fn handle_request(context: &TransportContext, request: RpcRequest) -> Option<RpcResponse> {
    let method = request.method.as_str();

    let Some(id) = request.id else {
        debug!(
            target: "lastfm_suggest_transport",
            method,
            "Ignoring notification without handler"
        );
        return None;
    };
    let id = Some(id);
    let params = request.params.unwrap_or_else(|| json!({}));

    let outcome = match method {
        "initialize" => Ok(json!({
            "serverInfo": {
                "name": "lastfm-suggest",
                "version": env!("CARGO_PKG_VERSION"),
            },
            "startedAt": context.boot_timestamp.format(&Rfc3339).ok(),
            "methods": ["suggest", "refresh_shortcut", "dispatch"],
        })),
        "suggest" => match serde_json::from_value::<SuggestParams>(params) {
            Ok(params) => Ok(suggest(context, params.query.as_deref()).await),
            Err(error) => Err((INVALID_PARAMS, error.to_string())),
        },
        "refresh_shortcut" => match serde_json::from_value::<ShortcutParams>(params) {
            Ok(params) => Ok(json!({ "rows": refresh_shortcut(params.id.as_deref()) })),
            Err(error) => Err((INVALID_PARAMS, error.to_string())),
        },
        "dispatch" => match serde_json::from_value::<SuggestRequest>(params) {
            Ok(request) => match context.dispatcher.dispatch(&request).await {
                Ok(rows) => Ok(json!({ "rows": rows })),
                Err(SuggestError::InvalidInput(message)) => Err((INVALID_PARAMS, message)),
            },
            Err(error) => Err((INVALID_PARAMS, error.to_string())),
        },
        other => Err((METHOD_NOT_FOUND, format!("Unknown method: {other}"))),
    };

    Some(match outcome {
        Ok(value) => RpcResponse::result(id, value),
        Err((code, message)) => RpcResponse::error(id, code, message),
    })
}

async fn suggest(context: &TransportContext, query: Option<&str>) -> Value {
    match context.dispatcher.aggregator().aggregate_report(query).await {
        Some(report) => json!({
            "query": report.query,
            "rows": to_rows(&report.candidates),
            "categories": report.categories,
        }),
        None => json!({ "rows": Value::Null }),
    }
}
