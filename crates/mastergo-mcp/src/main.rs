//! MCP Server for MasterGo design files
//!
//! Serves the MasterGo tools over stdio. Logs go to stderr; stdout carries
//! the protocol.
//!
//! # Usage
//!
//! ```bash
//! mastergo-mcp --token=YOUR_TOKEN
//!
//! # Custom API endpoint, extra rules and debug logging
//! mastergo-mcp --token=YOUR_TOKEN --url=https://mastergo.com --rule="use Vue 3" --debug
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mastergo_mcp::{
    tools::{
        self, GetComponentLinkRequest, GetComponentWorkflowRequest, GetDslRequest, GetMetaRequest,
    },
    Args, Config, DesignApi, MasterGoClient,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use tokio::io::{stdin, stdout};

/// The MCP server handler
#[derive(Clone)]
struct MasterGoServer {
    api: Arc<dyn DesignApi>,
    /// Rules returned with every DSL response
    rules: Arc<Vec<String>>,
    tool_router: ToolRouter<Self>,
}

impl MasterGoServer {
    fn new(api: Arc<dyn DesignApi>, rules: Vec<String>) -> Self {
        Self {
            api,
            rules: Arc::new(rules),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl MasterGoServer {
    #[tool(
        name = "mcp__getDsl",
        description = "Use this tool to retrieve the DSL (Domain Specific Language) data from MasterGo design files and the rules you must follow when generating code. Useful to analyze the structure of a design, understand component hierarchy, or extract design properties. Provide either fileId and layerId, or a MasterGo short link (like https://mastergo.com/goto/LhGgBAK). Icon vector data is replaced by ICON_PLACEHOLDER nodes unless simplify is false. Returns JSON {dsl, rules}.",
        annotations(read_only_hint = true)
    )]
    async fn get_dsl(
        &self,
        Parameters(req): Parameters<GetDslRequest>,
    ) -> Result<String, String> {
        let response = tools::get_dsl(self.api.as_ref(), &self.rules, req)
            .await
            .map_err(|e| e.to_structured_json())?;
        serde_json::to_string(&response).map_err(|e| e.to_string())
    }

    #[tool(
        name = "mcp__getComponentLink",
        description = "When the data returned by mcp__getDsl contains a non-empty componentDocumentLinks array, use this tool to retrieve each URL from that array in turn and obtain the component documentation. Use the returned documentation to generate frontend code based on the components.",
        annotations(read_only_hint = true)
    )]
    async fn get_component_link(
        &self,
        Parameters(req): Parameters<GetComponentLinkRequest>,
    ) -> Result<String, String> {
        tools::get_component_link(self.api.as_ref(), req)
            .await
            .map_err(|e| e.to_structured_json())
    }

    #[tool(
        name = "mcp__getMeta",
        description = "Use this tool when the user intends to build a complete website or needs high-level site configuration information. Provide a fileId and layerId to identify the design element. Returns the site/page results and a markdown rules document; follow the rules and use the results to analyze the site and pages.",
        annotations(read_only_hint = true)
    )]
    async fn get_meta(
        &self,
        Parameters(req): Parameters<GetMetaRequest>,
    ) -> Result<String, String> {
        let response = tools::get_meta(self.api.as_ref(), req)
            .await
            .map_err(|e| e.to_structured_json())?;
        serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
    }

    #[tool(
        name = "mcp__getComponentGenerator",
        description = "Use this tool when the user wants to build a Vue or React component. Provides a structured workflow for component development following best practices. You must provide the absolute rootPath of the workspace; workflow files are saved under <rootPath>/.cursor/rule/mastergo/."
    )]
    async fn get_component_generator(
        &self,
        Parameters(req): Parameters<GetComponentWorkflowRequest>,
    ) -> Result<String, String> {
        let response = tools::get_component_workflow(self.api.as_ref(), req)
            .await
            .map_err(|e| e.to_structured_json())?;
        serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
    }

    #[tool(
        name = "version",
        description = "Returns the current version of the MasterGo MCP server.",
        annotations(read_only_hint = true)
    )]
    async fn version(&self) -> Result<String, String> {
        Ok(tools::version())
    }
}

#[tool_handler]
impl ServerHandler for MasterGoServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!(
            "MCP server for MasterGo design files.\n\
             - {}: layer structure (DSL) and code generation rules\n\
             - {}: component documentation from componentDocumentLinks\n\
             - {}: site/page metadata and site generation rules\n\
             - {}: scaffold a component workflow in the workspace\n\
             Errors are JSON objects; follow the `recovery_action` field.",
            tools::DSL_TOOL_NAME,
            tools::COMPONENT_LINK_TOOL_NAME,
            tools::META_TOOL_NAME,
            tools::COMPONENT_GENERATOR_TOOL_NAME,
        );

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env().with_args(args);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_directive().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        base_url = %config.base_url,
        token = if config.token.is_some() { "set" } else { "not set" },
        rules = config.rules.len(),
        timeout_secs = config.timeout.as_secs(),
        "Starting MasterGo MCP Server"
    );
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }
    if config.token.is_none() {
        tracing::warn!(
            "No MasterGo token configured (--token or MG_MCP_TOKEN); requests will be anonymous"
        );
    }

    let client = MasterGoClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create MasterGo client: {}", e))?;
    let server = MasterGoServer::new(Arc::new(client), config.rules.clone());

    let transport = (stdin(), stdout());
    let service = server.serve(transport).await?;

    service.waiting().await?;

    Ok(())
}
