//! Icon classification rules and placeholder construction.
//!
//! Rules are evaluated in priority order and the first match wins:
//!
//! ```text
//! 1. TypeMatch           type is PATH / SVG_ELLIPSE / SVG_RECTANGLE / VECTOR
//! 2. PathData            node carries a non-empty `path` array
//! 3. NameKeyword         lower-cased name contains an icon keyword
//! 4. IconContainer       parent context was flagged as an icon container
//! 5. GroupWithIconChild  GROUP with a direct child of an icon type
//! 6. Hotspot             LAYER whose name marks a click area
//! ```

use serde_json::{Map, Value};

use crate::simplifier::release;

/// `type` tag carried by every replacement node.
pub const PLACEHOLDER_TYPE: &str = "ICON_PLACEHOLDER";

/// Node types that are always vector artwork.
const ICON_NODE_TYPES: &[&str] = &["PATH", "SVG_ELLIPSE", "SVG_RECTANGLE", "VECTOR"];

/// Name fragments designers use for icon layers (matched case-insensitively).
const ICON_NAME_KEYWORDS: &[&str] = &["ic-", "icon", "图标", "ico_", "ic_"];

/// Name fragments for invisible click/hotspot layers.
const HOTSPOT_KEYWORDS: &[&str] = &["点击区", "clickarea", "hotspot"];

/// Which rule classified a node as an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRule {
    TypeMatch,
    PathData,
    NameKeyword,
    IconContainer,
    GroupWithIconChild,
    Hotspot,
}

impl IconRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMatch => "type_match",
            Self::PathData => "path_data",
            Self::NameKeyword => "name_keyword",
            Self::IconContainer => "icon_container",
            Self::GroupWithIconChild => "group_with_icon_child",
            Self::Hotspot => "hotspot",
        }
    }
}

impl std::fmt::Display for IconRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts about a structural node, handed down to its direct children.
///
/// Derived fresh for every descent; children never hold a reference back to
/// their parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentContext {
    pub name: String,
    pub node_type: String,
    /// Parent's own name matched the icon keywords.
    pub is_icon_container: bool,
}

impl ParentContext {
    /// Derive the context a node passes to its children.
    pub fn of(node: &Map<String, Value>) -> Self {
        let name = str_field(node, "name");
        Self {
            name: name.to_string(),
            node_type: str_field(node, "type").to_string(),
            is_icon_container: is_icon_container_name(name),
        }
    }
}

/// Classify a single node. Returns `None` for structural nodes.
///
/// Only the node itself, its direct children's raw `type`, and the parent
/// context are inspected; nothing here recurses.
pub fn classify(node: &Map<String, Value>, parent: Option<&ParentContext>) -> Option<IconRule> {
    let node_type = str_field(node, "type");
    let name = str_field(node, "name").to_lowercase();

    if is_icon_type(node_type) {
        return Some(IconRule::TypeMatch);
    }
    if path_len(node) > 0 {
        return Some(IconRule::PathData);
    }
    if contains_any(&name, ICON_NAME_KEYWORDS) {
        return Some(IconRule::NameKeyword);
    }
    if parent.is_some_and(|p| p.is_icon_container) {
        return Some(IconRule::IconContainer);
    }
    // Raw child types only: a child that is an icon by name or path alone
    // does not promote its group.
    if node_type == "GROUP" && has_icon_type_child(node) {
        return Some(IconRule::GroupWithIconChild);
    }
    if node_type == "LAYER" && contains_any(&name, HOTSPOT_KEYWORDS) {
        return Some(IconRule::Hotspot);
    }
    None
}

/// Whether a node with this name marks its children as icon assets.
pub fn is_icon_container_name(name: &str) -> bool {
    contains_any(&name.to_lowercase(), ICON_NAME_KEYWORDS)
}

/// Number of geometry descriptors in the node's `path`, zero when absent or
/// not an array.
pub(crate) fn path_len(node: &Map<String, Value>) -> usize {
    node.get("path").and_then(Value::as_array).map_or(0, Vec::len)
}

/// Build the compact replacement for an icon node.
///
/// Keeps identity, layout and the few style fields a placeholder needs to be
/// drawn at the right size and colour. Children and path data are dropped.
pub(crate) fn placeholder(mut node: Map<String, Value>) -> Map<String, Value> {
    let original_type = str_field(&node, "type").to_string();
    let name = match str_field(&node, "name") {
        "" => "icon".to_string(),
        name => name.to_string(),
    };
    let id = match node.remove("id") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Value::String(String::new()),
        Some(id) => id,
    };
    let layout_style = match node.remove("layoutStyle") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(style) => style,
    };

    let mut out = Map::new();
    out.insert("type".into(), Value::String(PLACEHOLDER_TYPE.to_string()));
    out.insert("id".into(), id);
    out.insert(
        "_placeholder_comment".into(),
        Value::String(format!("TODO: replace with actual icon asset ({name})")),
    );
    out.insert("name".into(), Value::String(name));
    out.insert("layoutStyle".into(), layout_style);
    out.insert("_original_type".into(), Value::String(original_type));
    out.insert("_is_simplified".into(), Value::Bool(true));

    if let Some(fill) = node.remove("fill") {
        out.insert("_original_fill".into(), fill);
    }
    if let Some(stroke) = node.remove("strokeColor") {
        out.insert("_original_stroke".into(), stroke);
    }
    if let Some(radius) = node.remove("borderRadius") {
        out.insert("borderRadius".into(), radius);
    }
    release(Value::Object(node));
    out
}

pub(crate) fn str_field<'a>(node: &'a Map<String, Value>, key: &str) -> &'a str {
    node.get(key).and_then(Value::as_str).unwrap_or("")
}

fn is_icon_type(node_type: &str) -> bool {
    ICON_NODE_TYPES.contains(&node_type)
}

fn has_icon_type_child(node: &Map<String, Value>) -> bool {
    node.get("children")
        .and_then(Value::as_array)
        .is_some_and(|children| {
            children
                .iter()
                .any(|child| child.get("type").and_then(Value::as_str).is_some_and(is_icon_type))
        })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
