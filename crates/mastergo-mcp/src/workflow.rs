//! Component workflow scaffolding
//!
//! Writes the component workflow guide and the component's style spec under
//! `<root>/.cursor/rule/mastergo/`, where the editor picks them up as project
//! rules. Existing files are never overwritten, so the agent can
//! edit them between calls.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{McpToolError, ToolResult};

/// Directory under the project root that holds generated files.
pub const WORKFLOW_DIR: &str = ".cursor/rule/mastergo";

/// File name of the workflow guide.
pub const WORKFLOW_FILE: &str = "component-workflow.md";

/// Workflow guide written for every scaffolded component.
pub const COMPONENT_WORKFLOW: &str = include_str!("../assets/component-workflow.md");

/// Paths of the scaffolded files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldedFiles {
    pub workflow: PathBuf,
    pub component_spec: PathBuf,
}

/// Write the workflow guide and the component spec for `style`.
///
/// `style` is the component style payload: an array whose first entry is the
/// component (a bare object is accepted too). The entry's `name` becomes the
/// spec file name.
pub async fn scaffold_component(
    root: &Path,
    style: &Value,
    layer_id: &str,
) -> ToolResult<ScaffoldedFiles> {
    if !root.is_absolute() {
        return Err(McpToolError::RelativeRoot {
            path: root.to_path_buf(),
        });
    }

    let component = match style {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(style),
        _ => None,
    }
    .filter(|c| c.is_object())
    .ok_or_else(|| McpToolError::EmptyStyle {
        layer_id: layer_id.to_string(),
    })?;

    let name = component
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    validate_component_name(name)?;

    let base_dir = root.join(WORKFLOW_DIR);
    tokio::fs::create_dir_all(&base_dir).await?;

    let workflow = base_dir.join(WORKFLOW_FILE);
    write_if_absent(&workflow, COMPONENT_WORKFLOW.as_bytes()).await?;

    let component_spec = base_dir.join(format!("{name}.json"));
    let spec = serde_json::to_vec(component)?;
    write_if_absent(&component_spec, &spec).await?;

    info!(
        component = name,
        dir = %base_dir.display(),
        "Scaffolded component workflow"
    );

    Ok(ScaffoldedFiles {
        workflow,
        component_spec,
    })
}

/// Reject names that would escape the workflow directory or are unusable.
fn validate_component_name(name: &str) -> ToolResult<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(McpToolError::InvalidComponentName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Create `path` with `contents`; leave it alone when it already exists.
async fn write_if_absent(path: &Path, contents: &[u8]) -> ToolResult<bool> {
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await;
    match file {
        Ok(mut file) => {
            file.write_all(contents).await?;
            file.flush().await?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Keeping existing file");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
