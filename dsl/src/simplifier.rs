//! Tree walk that replaces icon subtrees with placeholders.
//!
//! The walk is depth-first pre-order over an explicit work stack, so document
//! depth is bounded by heap rather than by the thread's call stack. Each call
//! owns its counters; nothing is shared between documents.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::classify::{classify, path_len, placeholder, str_field, ParentContext, PLACEHOLDER_TYPE};

/// Counters for one simplification call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplificationStats {
    /// Nodes replaced by placeholders.
    pub icons_removed: usize,
    /// Path descriptors discarded across all replaced nodes.
    pub paths_removed: usize,
}

/// Wire form stamped on the document as `_simplification_stats`.
impl From<SimplificationStats> for Value {
    fn from(stats: SimplificationStats) -> Self {
        let mut map = Map::new();
        map.insert("icons_removed".into(), stats.icons_removed.into());
        map.insert("paths_removed".into(), stats.paths_removed.into());
        Value::Object(map)
    }
}

/// Result of [`simplify`]: the rewritten document and a snapshot of its stats.
#[derive(Debug, Clone, PartialEq)]
pub struct Simplified {
    pub document: Value,
    pub stats: SimplificationStats,
}

/// Simplify a whole design document.
///
/// Non-object input is returned untouched with zeroed stats. For objects, an
/// array-valued `nodes` field is rewritten, every other field is kept, and
/// `_simplified` / `_simplification_stats` are added.
pub fn simplify(document: Value) -> Simplified {
    let mut doc = match document {
        Value::Object(doc) => doc,
        other => {
            return Simplified {
                document: other,
                stats: SimplificationStats::default(),
            }
        }
    };

    let mut stats = SimplificationStats::default();
    match doc.remove("nodes") {
        Some(Value::Array(nodes)) => {
            let (nodes, node_stats) = simplify_nodes(nodes);
            stats = node_stats;
            doc.insert("nodes".into(), Value::Array(nodes));
        }
        Some(other) => {
            doc.insert("nodes".into(), other);
        }
        None => {}
    }

    doc.insert("_simplified".into(), Value::Bool(true));
    doc.insert("_simplification_stats".into(), stats.into());

    debug!(
        icons_removed = stats.icons_removed,
        paths_removed = stats.paths_removed,
        "Simplified DSL document"
    );

    Simplified {
        document: Value::Object(doc),
        stats,
    }
}

/// Simplify a sequence of root nodes, returning the new sequence and its stats.
pub fn simplify_nodes(nodes: Vec<Value>) -> (Vec<Value>, SimplificationStats) {
    let mut stats = SimplificationStats::default();
    let mut stack = vec![Frame {
        node: None,
        context: None,
        pending: nodes.into_iter(),
        done: Vec::new(),
    }];

    loop {
        let Some(frame) = stack.last_mut() else {
            return (Vec::new(), stats);
        };

        if let Some(child) = frame.pending.next() {
            match visit(child, frame.context.as_ref(), &mut stats) {
                Visit::Leaf(value) => frame.done.push(value),
                Visit::Descend {
                    node,
                    children,
                    context,
                } => stack.push(Frame {
                    node: Some(node),
                    context: Some(context),
                    pending: children.into_iter(),
                    done: Vec::new(),
                }),
            }
            continue;
        }

        // All children of the top frame are done: reattach them and hand the
        // finished node to its parent frame.
        let Some(Frame { node, done, .. }) = stack.pop() else {
            return (Vec::new(), stats);
        };
        match (node, stack.last_mut()) {
            (Some(mut node), Some(parent)) => {
                node.insert("children".into(), Value::Array(done));
                parent.done.push(Value::Object(node));
            }
            _ => return (done, stats),
        }
    }
}

/// Drop a value without recursing into it.
///
/// `serde_json::Value` drops recursively, so a discarded icon subtree of
/// arbitrary depth is flattened onto a heap stack first.
pub fn release(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

/// A structural node whose children are being rewritten.
struct Frame {
    /// `None` for the synthetic root frame holding the document's nodes.
    node: Option<Map<String, Value>>,
    context: Option<ParentContext>,
    pending: std::vec::IntoIter<Value>,
    done: Vec<Value>,
}

enum Visit {
    /// Node is final: a placeholder, a childless node, or a non-object value.
    Leaf(Value),
    /// Structural node with children still to rewrite.
    Descend {
        node: Map<String, Value>,
        children: Vec<Value>,
        context: ParentContext,
    },
}

fn visit(value: Value, parent: Option<&ParentContext>, stats: &mut SimplificationStats) -> Visit {
    let mut node = match value {
        Value::Object(node) => node,
        other => return Visit::Leaf(other),
    };

    // Placeholders from an earlier pass stay as they are.
    if str_field(&node, "type") == PLACEHOLDER_TYPE {
        return Visit::Leaf(Value::Object(node));
    }

    if let Some(rule) = classify(&node, parent) {
        let paths = path_len(&node);
        stats.icons_removed += 1;
        stats.paths_removed += paths;
        let id = node.get("id").unwrap_or(&Value::Null);
        trace!(
            rule = %rule,
            id = %id,
            name = str_field(&node, "name"),
            paths,
            "Replacing icon node"
        );
        return Visit::Leaf(Value::Object(placeholder(node)));
    }

    match node.remove("children") {
        Some(Value::Array(children)) if !children.is_empty() => {
            let context = ParentContext::of(&node);
            Visit::Descend {
                node,
                children,
                context,
            }
        }
        Some(children) => {
            node.insert("children".into(), children);
            Visit::Leaf(Value::Object(node))
        }
        None => Visit::Leaf(Value::Object(node)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scenario_vector_root() {
        let out = simplify(json!({
            "nodes": [{"type": "VECTOR", "id": "1:1", "name": "arrow", "path": [1, 2, 3]}]
        }));
        let root = &out.document["nodes"][0];
        assert_eq!(root["type"], PLACEHOLDER_TYPE);
        assert_eq!(root["_original_type"], "VECTOR");
        assert_eq!(root["name"], "arrow");
        assert_eq!(
            out.stats,
            SimplificationStats {
                icons_removed: 1,
                paths_removed: 3
            }
        );
        assert_eq!(
            out.document["_simplification_stats"],
            json!({"icons_removed": 1, "paths_removed": 3})
        );
        assert_eq!(out.document["_simplified"], true);
    }

    #[test]
    fn test_replacement_logged_at_trace_level() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let out = tracing::subscriber::with_default(subscriber, || {
            simplify(json!({
                "nodes": [
                    {"type": "PATH", "id": "7:1", "name": "dot"},
                    {"type": "VECTOR", "name": "no-id", "path": [1]}
                ]
            }))
        });
        assert_eq!(out.stats.icons_removed, 2);
        assert_eq!(out.stats.paths_removed, 1);
        assert_eq!(out.document["nodes"][0]["id"], "7:1");
        assert_eq!(out.document["nodes"][1]["id"], "");
    }

    #[test]
    fn test_scenario_plain_group_unchanged() {
        let nodes = json!([{
            "type": "GROUP",
            "name": "panel",
            "children": [{"type": "TEXT", "name": "label"}]
        }]);
        let out = simplify(json!({ "nodes": nodes.clone() }));
        assert_eq!(out.document["nodes"], nodes);
        assert_eq!(out.stats, SimplificationStats::default());
    }

    #[test]
    fn test_scenario_hotspot_layer_discards_subtree() {
        let out = simplify(json!({
            "nodes": [{
                "type": "LAYER",
                "name": "点击区按钮",
                "children": [{"type": "GROUP", "name": "inner", "children": [{"type": "PATH"}]}]
            }]
        }));
        let root = &out.document["nodes"][0];
        assert_eq!(root["type"], PLACEHOLDER_TYPE);
        assert_eq!(root["_original_type"], "LAYER");
        assert!(root.get("children").is_none());
        assert_eq!(
            out.stats,
            SimplificationStats {
                icons_removed: 1,
                paths_removed: 0
            }
        );
    }

    #[test]
    fn test_scenario_icon_named_container() {
        let out = simplify(json!({
            "nodes": [{
                "type": "FRAME",
                "name": "icon-wrap",
                "children": [{"type": "RECTANGLE", "name": "bg"}]
            }]
        }));
        let root = &out.document["nodes"][0];
        assert_eq!(root["type"], PLACEHOLDER_TYPE);
        assert_eq!(root["name"], "icon-wrap");
        assert_eq!(out.stats.icons_removed, 1);
    }

    #[test]
    fn test_nested_structure_preserved() {
        let out = simplify(json!({
            "nodes": [{
                "type": "FRAME",
                "id": "0:1",
                "name": "page",
                "children": [
                    {"type": "TEXT", "id": "0:2", "name": "title"},
                    {
                        "type": "FRAME",
                        "id": "0:3",
                        "name": "toolbar",
                        "children": [
                            {"type": "PATH", "id": "0:4", "path": ["a", "b"]},
                            {"type": "TEXT", "id": "0:5", "name": "save"}
                        ]
                    }
                ]
            }]
        }));
        let page = &out.document["nodes"][0];
        assert_eq!(page["type"], "FRAME");
        assert_eq!(page["children"][0]["id"], "0:2");
        let toolbar = &page["children"][1];
        assert_eq!(toolbar["children"][0]["type"], PLACEHOLDER_TYPE);
        assert_eq!(toolbar["children"][0]["name"], "icon");
        assert_eq!(toolbar["children"][1]["name"], "save");
        assert_eq!(
            out.stats,
            SimplificationStats {
                icons_removed: 1,
                paths_removed: 2
            }
        );
    }

    #[test]
    fn test_non_object_document_is_untouched() {
        for input in [json!(null), json!(42), json!("dsl"), json!([1, 2])] {
            let out = simplify(input.clone());
            assert_eq!(out.document, input);
            assert_eq!(out.stats, SimplificationStats::default());
        }
    }

    #[test]
    fn test_document_without_nodes_gains_marker() {
        let out = simplify(json!({"fileId": "42", "meta": {"v": 1}}));
        assert_eq!(
            out.document,
            json!({
                "fileId": "42",
                "meta": {"v": 1},
                "_simplified": true,
                "_simplification_stats": {"icons_removed": 0, "paths_removed": 0}
            })
        );
    }

    #[test]
    fn test_non_array_nodes_kept() {
        let out = simplify(json!({"nodes": {"type": "VECTOR"}}));
        assert_eq!(out.document["nodes"], json!({"type": "VECTOR"}));
        assert_eq!(out.stats.icons_removed, 0);
    }

    #[test]
    fn test_non_object_entries_pass_through() {
        let (nodes, stats) = simplify_nodes(vec![json!(1), json!(null), json!({"type": "PATH"})]);
        assert_eq!(nodes[0], json!(1));
        assert_eq!(nodes[1], json!(null));
        assert_eq!(nodes[2]["type"], PLACEHOLDER_TYPE);
        assert_eq!(stats.icons_removed, 1);
    }

    #[test]
    fn test_empty_and_malformed_children_untouched() {
        let nodes = vec![
            json!({"type": "FRAME", "name": "a", "children": []}),
            json!({"type": "FRAME", "name": "b", "children": "oops"}),
        ];
        let (out, stats) = simplify_nodes(nodes.clone());
        assert_eq!(out, nodes);
        assert_eq!(stats, SimplificationStats::default());
    }

    #[test]
    fn test_stats_reset_between_calls() {
        let doc = json!({"nodes": [{"type": "PATH", "path": [1]}]});
        let first = simplify(doc.clone());
        let second = simplify(doc);
        assert_eq!(first.stats, second.stats);
        assert_eq!(second.stats.icons_removed, 1);
    }

    #[test]
    fn test_second_pass_is_stable() {
        let first = simplify(json!({
            "nodes": [{
                "type": "FRAME",
                "name": "card",
                "children": [
                    {"type": "VECTOR", "name": "", "path": [1, 2]},
                    {"type": "FRAME", "name": "ic-star"}
                ]
            }]
        }));
        assert_eq!(first.stats.icons_removed, 2);

        let second = simplify(first.document.clone());
        assert_eq!(second.stats, SimplificationStats::default());
        assert_eq!(second.document["nodes"], first.document["nodes"]);
    }
}
