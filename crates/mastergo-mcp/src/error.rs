//! Tool error types
//!
//! A failed tool call is answered with a [`StructuredError`] serialized as
//! JSON: a stable [`ErrorCode`], the error text, what the agent should do
//! next, and whether retrying the same call can succeed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tool operations
pub type ToolResult<T> = Result<T, McpToolError>;

/// Machine-readable failure class, serialized as `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidParams,
    ConfigError,
    HttpTimeout,
    HttpError,
    Unauthorized,
    NotFound,
    ApiUnavailable,
    ApiError,
    ShortLinkUnresolved,
    EmptyComponentStyle,
    InvalidComponentName,
    RelativeRootPath,
    FileNotFound,
    PermissionDenied,
    IoError,
    JsonParseError,
}

impl ErrorCode {
    /// Instruction for the agent on how to get past this failure.
    pub fn recovery_action(self) -> &'static str {
        match self {
            Self::InvalidParams => "Check the tool parameters against the tool schema and call again",
            Self::ConfigError => {
                "Restart the server with a valid --url and --token (or API_BASE_URL / MG_MCP_TOKEN)"
            }
            Self::HttpTimeout => {
                "MasterGo did not answer in time. Retry the call, or raise --timeout-secs"
            }
            Self::HttpError => "Check network access to the MasterGo API base URL and retry",
            Self::Unauthorized => {
                "The access token was rejected. Ask the user for a valid MasterGo token"
            }
            Self::NotFound => {
                "Verify fileId and layerId from the design URL (file/<fileId>, layer_id=<layerId>)"
            }
            Self::ApiUnavailable => "MasterGo is busy or failing. Wait a moment and retry",
            Self::ApiError => "Inspect the message for the API's explanation and adjust the request",
            Self::ShortLinkUnresolved => {
                "Open the short link in a browser and pass fileId and layerId from the resulting URL"
            }
            Self::EmptyComponentStyle => "Make sure layerId points at a component, not a plain layer",
            Self::InvalidComponentName => {
                "Rename the component in MasterGo so it contains no path separators"
            }
            Self::RelativeRootPath => "Pass the absolute path of the workspace root as rootPath",
            Self::FileNotFound => "Verify rootPath exists",
            Self::PermissionDenied => "Check write permissions on rootPath",
            Self::IoError => "Check disk space and file permissions",
            Self::JsonParseError => {
                "MasterGo returned an unexpected payload. Retry, or report the layer to the user"
            }
        }
    }
}

/// JSON body of a failed tool call.
///
/// ```json
/// {
///   "code": "SHORT_LINK_UNRESOLVED",
///   "message": "Could not resolve short link https://mastergo.com/goto/abc: ...",
///   "recovery_action": "Open the short link in a browser and pass fileId and layerId from the resulting URL",
///   "context": { "short_link": "https://mastergo.com/goto/abc" },
///   "retryable": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: ErrorCode,
    pub message: String,
    pub recovery_action: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub retryable: bool,
}

/// Errors that can occur while serving a tool call
#[derive(Error, Debug)]
pub enum McpToolError {
    /// Tool called with missing or unusable arguments
    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    /// Server configuration is unusable (bad base URL, bad token header)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to MasterGo
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MasterGo answered with a non-success status
    #[error("MasterGo API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Short link did not lead to a file/layer URL
    #[error("Could not resolve short link {url}: {message}")]
    ShortLink { url: String, message: String },

    /// Component style endpoint returned nothing usable
    #[error("No component style data returned for layer {layer_id}")]
    EmptyStyle { layer_id: String },

    /// Component name cannot be used as a file name
    #[error("Invalid component name '{name}'")]
    InvalidComponentName { name: String },

    /// Scaffolding root is not an absolute path
    #[error("Root path must be absolute: {path}")]
    RelativeRoot { path: PathBuf },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpToolError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn short_link(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShortLink {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable (transient failure)
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            // Rate limiting and server-side failures
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParams { .. } => ErrorCode::InvalidParams,
            Self::Config { .. } => ErrorCode::ConfigError,
            Self::Http(e) if e.is_timeout() => ErrorCode::HttpTimeout,
            Self::Http(_) => ErrorCode::HttpError,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCode::Unauthorized,
                404 => ErrorCode::NotFound,
                s if *s == 429 || *s >= 500 => ErrorCode::ApiUnavailable,
                _ => ErrorCode::ApiError,
            },
            Self::ShortLink { .. } => ErrorCode::ShortLinkUnresolved,
            Self::EmptyStyle { .. } => ErrorCode::EmptyComponentStyle,
            Self::InvalidComponentName { .. } => ErrorCode::InvalidComponentName,
            Self::RelativeRoot { .. } => ErrorCode::RelativeRootPath,
            Self::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
                _ => ErrorCode::IoError,
            },
            Self::Json(_) => ErrorCode::JsonParseError,
        }
    }

    /// Identifiers the agent needs to correct the call.
    fn context(&self) -> Map<String, Value> {
        let mut context = Map::new();
        match self {
            Self::Api { status, .. } => {
                context.insert("status".into(), Value::from(*status));
            }
            Self::ShortLink { url, .. } => {
                context.insert("short_link".into(), Value::from(url.as_str()));
            }
            Self::EmptyStyle { layer_id } => {
                context.insert("layer_id".into(), Value::from(layer_id.as_str()));
            }
            Self::InvalidComponentName { name } => {
                context.insert("component_name".into(), Value::from(name.as_str()));
            }
            Self::RelativeRoot { path } => {
                context.insert("root_path".into(), Value::from(path.display().to_string()));
            }
            _ => {}
        }
        context
    }

    pub fn to_structured(&self) -> StructuredError {
        let code = self.code();
        StructuredError {
            code,
            message: self.to_string(),
            recovery_action: code.recovery_action().to_string(),
            context: self.context(),
            retryable: self.is_retryable(),
        }
    }

    /// Tool error content: the structured error as pretty JSON.
    pub fn to_structured_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_structured()).unwrap_or_else(|_| self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McpToolError::invalid_params("fileId is required");
        assert!(err.to_string().contains("fileId is required"));

        let err = McpToolError::Api {
            status: 404,
            body: "layer not found".into(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("layer not found"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: McpToolError = io_err.into();
        assert!(matches!(err, McpToolError::Io(_)));
    }

    #[test]
    fn test_is_retryable() {
        assert!(McpToolError::Api {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(McpToolError::Api {
            status: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(!McpToolError::Api {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!McpToolError::invalid_params("x").is_retryable());
    }

    #[test]
    fn test_structured_codes() {
        let err = McpToolError::Api {
            status: 401,
            body: "bad token".into(),
        };
        let structured = err.to_structured();
        assert_eq!(structured.code, ErrorCode::Unauthorized);
        assert_eq!(structured.context["status"], 401);
        assert!(!structured.retryable);

        let err = McpToolError::short_link("https://mastergo.com/goto/abc", "no layer_id");
        let structured = err.to_structured();
        assert_eq!(structured.code, ErrorCode::ShortLinkUnresolved);
        assert_eq!(structured.context["short_link"], "https://mastergo.com/goto/abc");
    }

    #[test]
    fn test_structured_json_roundtrips() {
        let err = McpToolError::Api {
            status: 502,
            body: "gateway".into(),
        };
        let json = err.to_structured_json();
        let parsed: StructuredError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code, ErrorCode::ApiUnavailable);
        assert!(parsed.retryable);
    }

    #[test]
    fn test_codes_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_value(ErrorCode::ShortLinkUnresolved).unwrap(),
            "SHORT_LINK_UNRESOLVED"
        );
        let json = McpToolError::RelativeRoot {
            path: PathBuf::from("src"),
        }
        .to_structured_json();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["code"], "RELATIVE_ROOT_PATH");
        assert_eq!(value["context"]["root_path"], "src");
        assert_eq!(
            value["recovery_action"],
            ErrorCode::RelativeRootPath.recovery_action()
        );
    }

    #[test]
    fn test_context_omitted_when_empty() {
        let json = McpToolError::invalid_params("x").to_structured_json();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("context").is_none());
        assert_eq!(value["retryable"], false);
    }
}
