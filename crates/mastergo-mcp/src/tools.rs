//! MCP tool implementations
//!
//! Each tool is a plain async function over a [`DesignApi`], so it can be
//! exercised without a transport. `main.rs` wires them into the rmcp router.

use std::path::Path;

use rmcp::schemars;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::{DesignApi, LayerRef};
use crate::error::{McpToolError, ToolResult};
use crate::workflow::scaffold_component;

pub const DSL_TOOL_NAME: &str = "mcp__getDsl";
pub const COMPONENT_LINK_TOOL_NAME: &str = "mcp__getComponentLink";
pub const META_TOOL_NAME: &str = "mcp__getMeta";
pub const COMPONENT_GENERATOR_TOOL_NAME: &str = "mcp__getComponentGenerator";

/// Site/page rules returned alongside meta results.
pub const META_RULES: &str = include_str!("../assets/meta.md");

/// Request parameters for the DSL tool
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetDslRequest {
    #[schemars(
        description = "MasterGo design file ID (format: file/<fileId> in MasterGo URL). Required if shortLink is not provided."
    )]
    pub file_id: Option<String>,
    #[schemars(
        description = "Layer ID of the specific component or element to retrieve (format: ?layer_id=<layerId> / file=<fileId> in MasterGo URL). Required if shortLink is not provided."
    )]
    pub layer_id: Option<String>,
    #[schemars(description = "MasterGo short link (like https://mastergo.com/goto/LhGgBAK).")]
    pub short_link: Option<String>,
    #[schemars(
        description = "Replace icon vector data with ICON_PLACEHOLDER nodes to save tokens (default: true)"
    )]
    pub simplify: Option<bool>,
}

/// Request parameters for the component documentation tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetComponentLinkRequest {
    #[schemars(
        description = "Component documentation link URL, from the componentDocumentLinks property, please ensure the URL is valid"
    )]
    pub url: String,
}

/// Request parameters for the meta tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetMetaRequest {
    #[schemars(description = "MasterGo design file ID (format: file/<fileId> in MasterGo URL)")]
    pub file_id: String,
    #[schemars(
        description = "Layer ID of the specific component or element to retrieve (format: ?layer_id=<layerId> / file=<fileId> in MasterGo URL)"
    )]
    pub layer_id: String,
}

/// Request parameters for the component workflow tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetComponentWorkflowRequest {
    #[schemars(
        description = "The absolute root path of the project; if the user does not provide one, use the current workspace directory"
    )]
    pub root_path: String,
    #[schemars(description = "MasterGo design file ID (format: file/<fileId> in MasterGo URL)")]
    pub file_id: String,
    #[schemars(
        description = "Layer ID of the specific component or element to retrieve (format: ?layer_id=<layerId> / file=<fileId> in MasterGo URL)"
    )]
    pub layer_id: String,
}

/// Work out which layer a DSL request refers to.
///
/// A short link wins over explicit ids; otherwise both ids are required.
pub async fn resolve_layer(api: &dyn DesignApi, req: &GetDslRequest) -> ToolResult<LayerRef> {
    if let Some(link) = non_empty(&req.short_link) {
        let layer = api.resolve_short_link(link).await?;
        debug!(link, file_id = %layer.file_id, layer_id = %layer.layer_id, "Resolved short link");
        return Ok(layer);
    }
    match (non_empty(&req.file_id), non_empty(&req.layer_id)) {
        (Some(file_id), Some(layer_id)) => Ok(LayerRef {
            file_id: file_id.to_string(),
            layer_id: layer_id.to_string(),
        }),
        _ => Err(McpToolError::invalid_params(
            "Either provide both fileId and layerId, or provide a MasterGo short link",
        )),
    }
}

/// Fetch a layer's DSL, simplified unless the caller opts out, plus the
/// configured code-generation rules.
pub async fn get_dsl(
    api: &dyn DesignApi,
    rules: &[String],
    req: GetDslRequest,
) -> ToolResult<Value> {
    let layer = resolve_layer(api, &req).await?;
    let raw = api.get_dsl(&layer).await?;

    let dsl = if req.simplify.unwrap_or(true) {
        let simplified = dsl::simplify(raw);
        info!(
            file_id = %layer.file_id,
            layer_id = %layer.layer_id,
            icons_removed = simplified.stats.icons_removed,
            paths_removed = simplified.stats.paths_removed,
            "Fetched DSL"
        );
        simplified.document
    } else {
        info!(file_id = %layer.file_id, layer_id = %layer.layer_id, "Fetched raw DSL");
        raw
    };

    Ok(json!({ "dsl": dsl, "rules": rules }))
}

/// Fetch component documentation text from a `componentDocumentLinks` URL.
pub async fn get_component_link(
    api: &dyn DesignApi,
    req: GetComponentLinkRequest,
) -> ToolResult<String> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(McpToolError::invalid_params("url must not be empty"));
    }
    api.get_component_doc(url).await
}

/// Fetch site/page metadata together with the site generation rules.
pub async fn get_meta(api: &dyn DesignApi, req: GetMetaRequest) -> ToolResult<Value> {
    let layer = required_layer(req.file_id, req.layer_id)?;
    let result = api.get_meta(&layer).await?;
    Ok(json!({ "result": result, "rules": META_RULES }))
}

/// Fetch a component's style spec and scaffold the workflow files for it.
pub async fn get_component_workflow(
    api: &dyn DesignApi,
    req: GetComponentWorkflowRequest,
) -> ToolResult<Value> {
    let layer = required_layer(req.file_id, req.layer_id)?;
    let root = Path::new(req.root_path.trim());
    if root.as_os_str().is_empty() {
        return Err(McpToolError::invalid_params("rootPath must not be empty"));
    }

    let style = api.get_component_style(&layer).await?;
    let files = scaffold_component(root, &style, &layer.layer_id).await?;

    let workflow = files.workflow.display().to_string();
    let spec = files.component_spec.display().to_string();
    Ok(json!({
        "files": files,
        "message": "Component development files successfully created",
        "rules": [
            format!("Follow the component workflow process defined in file://{workflow} for structured development."),
            format!("Implement the component according to the specifications in file://{spec}, ensuring all properties and states are properly handled."),
            "Maintain consistency with existing components and follow the CSS-first approach for state management where appropriate.",
            "Ensure proper testing coverage for all component functionality and edge cases.",
        ],
    }))
}

/// Package version as a JSON string.
pub fn version() -> String {
    Value::String(env!("CARGO_PKG_VERSION").to_string()).to_string()
}

fn required_layer(file_id: String, layer_id: String) -> ToolResult<LayerRef> {
    if file_id.trim().is_empty() || layer_id.trim().is_empty() {
        return Err(McpToolError::invalid_params(
            "fileId and layerId are both required",
        ));
    }
    Ok(LayerRef { file_id, layer_id })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
