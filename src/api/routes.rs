use crate::error::ErrorResponse;
use crate::extract::{ExtractRequest, ExtractResponse, extract_mp4_links, fetch_page};
use crate::{AppState, ExtractError};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

pub const HEALTH_MESSAGE: &str = "✅ XHS Video Extractor API is running.";
pub const RELAY_MISSING_URL: &str = "Missing \"url\" query parameter";
pub const RELAY_NOT_CONFIGURED: &str = "Relay is not configured";
pub const RELAY_FAILED: &str = "Failed to fetch video from relay";

#[derive(Debug, Deserialize)]
pub struct RelayParams {
    pub url: Option<String>,
}

pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// POST /get: fetch the page named in the body and list its mp4 `<video>` sources.
#[axum::debug_handler]
pub async fn extract_video_links(
    Extension(state): Extension<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ExtractError> {
    // An unreadable body has no usable url either
    let request = match payload {
        Ok(Json(body)) => ExtractRequest::from_json(&body)?,
        Err(rejection) => {
            warn!(%rejection, "Rejected request body");
            ExtractRequest::default()
        }
    };
    let url = request.url()?;

    info!(url, "Extracting video links");
    let html = fetch_page(&state.client, url)
        .await
        .inspect_err(|error| error!(url, ?error, "Failed to fetch page"))?;

    let mp4_links = extract_mp4_links(&html);
    info!(url, count = mp4_links.len(), "Extraction finished");

    Ok(Json(mp4_links.into()))
}

/// GET /api/xhs?url=...: hand the page over to the configured download service.
pub async fn relay_xhs(
    Extension(state): Extension<AppState>,
    params: Result<Query<RelayParams>, QueryRejection>,
) -> Response {
    let Some(relay_url) = state.relay_url.as_deref() else {
        return err_response(StatusCode::NOT_FOUND, RELAY_NOT_CONFIGURED);
    };

    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!(%rejection, "Rejected relay query");
            return err_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };

    let Some(url) = params.url.filter(|url| !url.is_empty()) else {
        return err_response(StatusCode::BAD_REQUEST, RELAY_MISSING_URL);
    };

    match forward_to_relay(&state.client, relay_url, &url).await {
        Ok(body) => {
            info!(%url, relay_url, "Relay answered");
            Json(body).into_response()
        }
        Err(error) => {
            error!(%url, relay_url, ?error, "Relay request failed");
            err_response(StatusCode::INTERNAL_SERVER_ERROR, RELAY_FAILED)
        }
    }
}

async fn forward_to_relay(
    client: &reqwest::Client,
    relay_url: &str,
    url: &str,
) -> reqwest::Result<Value> {
    client
        .post(relay_url)
        .json(&json!({ "url": url }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

pub(crate) fn err_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
