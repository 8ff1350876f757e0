//! MasterGo HTTP client
//!
//! [`DesignApi`] is the seam between the MCP tools and the network: the
//! server uses [`MasterGoClient`], tests substitute an in-memory fake.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{McpToolError, ToolResult};

/// Header carrying the user's MasterGo access token (`X-MG-UserAccessToken`).
pub const TOKEN_HEADER: &str = "x-mg-useraccesstoken";

static DESIGN_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s"'<>]*?/file/[^\s"'<>]*layer_id=[^\s"'<>&]+"#)
        .expect("DESIGN_URL_RE regex should compile")
});

/// A file + layer pair identifying one design element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRef {
    pub file_id: String,
    pub layer_id: String,
}

/// Remote design-file operations used by the MCP tools.
#[async_trait]
pub trait DesignApi: Send + Sync {
    /// DSL document for a layer.
    async fn get_dsl(&self, layer: &LayerRef) -> ToolResult<Value>;

    /// Site/page metadata for a layer.
    async fn get_meta(&self, layer: &LayerRef) -> ToolResult<Value>;

    /// Component style description; an array whose first entry is the component.
    async fn get_component_style(&self, layer: &LayerRef) -> ToolResult<Value>;

    /// Raw component documentation behind a `componentDocumentLinks` URL.
    async fn get_component_doc(&self, url: &str) -> ToolResult<String>;

    /// Follow a MasterGo short link to the file and layer it points at.
    async fn resolve_short_link(&self, link: &str) -> ToolResult<LayerRef>;
}

/// [`DesignApi`] over HTTP with the configured base URL and token.
#[derive(Clone)]
pub struct MasterGoClient {
    http: reqwest::Client,
    base_url: String,
}

impl MasterGoClient {
    pub fn new(config: &Config) -> ToolResult<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            McpToolError::config(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|_| McpToolError::config("token contains characters not allowed in a header"))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(TOKEN_HEADER), value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path, or the input itself when already absolute.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn get_layer_json(&self, path: &str, layer: &LayerRef) -> ToolResult<Value> {
        let url = self.endpoint(path);
        debug!(%url, file_id = %layer.file_id, layer_id = %layer.layer_id, "GET");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("fileId", layer.file_id.as_str()),
                ("layerId", layer.layer_id.as_str()),
            ])
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DesignApi for MasterGoClient {
    #[instrument(skip(self, layer), fields(file_id = %layer.file_id, layer_id = %layer.layer_id))]
    async fn get_dsl(&self, layer: &LayerRef) -> ToolResult<Value> {
        self.get_layer_json("/mcp/dsl", layer).await
    }

    #[instrument(skip(self, layer), fields(file_id = %layer.file_id, layer_id = %layer.layer_id))]
    async fn get_meta(&self, layer: &LayerRef) -> ToolResult<Value> {
        self.get_layer_json("/mcp/meta", layer).await
    }

    #[instrument(skip(self, layer), fields(file_id = %layer.file_id, layer_id = %layer.layer_id))]
    async fn get_component_style(&self, layer: &LayerRef) -> ToolResult<Value> {
        self.get_layer_json("/mcp/style", layer).await
    }

    #[instrument(skip(self))]
    async fn get_component_doc(&self, url: &str) -> ToolResult<String> {
        let response = self.http.get(self.endpoint(url)).send().await?;
        Ok(check_status(response).await?.text().await?)
    }

    #[instrument(skip(self))]
    async fn resolve_short_link(&self, link: &str) -> ToolResult<LayerRef> {
        Url::parse(link).map_err(|e| McpToolError::short_link(link, e.to_string()))?;

        let response = check_status(self.http.get(link).send().await?).await?;
        let final_url = response.url().to_string();
        debug!(%final_url, "Short link redirected");
        if let Some(layer) = parse_layer_url(&final_url) {
            return Ok(layer);
        }

        // Some short links land on an HTML page that embeds the file URL.
        let body = response.text().await?;
        find_layer_url(&body).ok_or_else(|| {
            McpToolError::short_link(
                link,
                format!("no fileId/layer_id found after redirect to {final_url}"),
            )
        })
    }
}

async fn check_status(response: reqwest::Response) -> ToolResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(McpToolError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Extract file and layer ids from a MasterGo design URL.
///
/// The file id comes from a `/file/<id>` path segment or a `file=` query
/// parameter; the layer id from `layer_id=`.
pub fn parse_layer_url(url: &str) -> Option<LayerRef> {
    let url = Url::parse(url).ok()?;

    let mut file_id = url.path_segments().and_then(|mut segments| {
        segments
            .by_ref()
            .find(|segment| *segment == "file")
            .and_then(|_| segments.next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    });
    let mut layer_id = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "layer_id" if !value.is_empty() => layer_id = Some(value.into_owned()),
            "file" if file_id.is_none() && !value.is_empty() => file_id = Some(value.into_owned()),
            _ => {}
        }
    }

    Some(LayerRef {
        file_id: file_id?,
        layer_id: layer_id?,
    })
}

/// Find the first MasterGo design URL with a layer id inside free text.
pub fn find_layer_url(text: &str) -> Option<LayerRef> {
    DESIGN_URL_RE
        .find_iter(text)
        .map(|m| m.as_str().replace("&amp;", "&"))
        .find_map(|candidate| parse_layer_url(&candidate))
}
