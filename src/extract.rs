//! Page fetching and `<video>` source scanning.

use reqwest::StatusCode;
use scraper::{ElementRef, Html};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::ExtractError;

pub const MP4_SUFFIX: &str = ".mp4";
pub const NO_VIDEO_MESSAGE: &str = "✅ No mp4 video found in page";

#[derive(Debug, Default)]
pub struct ExtractRequest {
    pub url: Option<String>,
}

impl ExtractRequest {
    /// Read `url` from a JSON body. Only an object key counts; arrays and scalars
    /// carry no url. A `url` of any type other than string or null is rejected.
    pub fn from_json(body: &Value) -> Result<Self, ExtractError> {
        let url = match body.as_object().and_then(|object| object.get("url")) {
            None | Some(Value::Null) => None,
            Some(Value::String(url)) => Some(url.clone()),
            Some(_) => return Err(ExtractError::UrlNotString),
        };
        Ok(Self { url })
    }

    /// The requested page URL, if present and non-empty. The URL itself is not
    /// validated here; malformed values surface as fetch errors.
    pub fn url(&self) -> Result<&str, ExtractError> {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ExtractError::MissingUrl),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub mp4_links: Vec<String>,
}

impl From<Vec<String>> for ExtractResponse {
    fn from(mp4_links: Vec<String>) -> Self {
        let message = mp4_links
            .is_empty()
            .then(|| NO_VIDEO_MESSAGE.to_string());
        Self { message, mp4_links }
    }
}

/// GET `url` once and return the body. Anything but a 200 is an error.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, ExtractError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ExtractError::UpstreamStatus(status.as_u16()));
    }

    let html = response.text().await?;
    debug!(url, bytes = html.len(), "Fetched page");
    Ok(html)
}

/// `src` of every `<video>` element ending in `.mp4`, in document order.
pub fn extract_mp4_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "video")
        .map(|video| video.value().attr("src").unwrap_or_default())
        .filter(|src| src.ends_with(MP4_SUFFIX))
        .map(str::to_string)
        .collect()
}
