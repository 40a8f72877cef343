//! Atlassian Document Format to plain text
//!
//! Jira REST API v2 returns descriptions and comment bodies as wiki-markup
//! strings, but some instances (and every v3 endpoint) hand back ADF JSON
//! documents instead. Both shapes flow through [`extract_text`].

use serde_json::Value;

/// Extract readable text from a field that is either a string or an ADF document
///
/// Returns `None` for null, empty strings, non-ADF objects and documents that
/// render to nothing.
pub fn extract_text(value: Option<&Value>) -> Option<String> {
    let value = value?;
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(_) if value.get("type").and_then(Value::as_str) == Some("doc") => {
            render_adf(value)
        }
        _ => None,
    }
}

/// Render an ADF document to Markdown-flavoured text
pub fn render_adf(value: &Value) -> Option<String> {
    let mut output = String::new();

    for node in children(value) {
        if let Some(rendered) = render_node(node, 0) {
            output.push_str(&rendered);
            if !rendered.ends_with('\n') {
                output.push('\n');
            }
        }
    }

    let output = output.trim();
    if output.is_empty() {
        None
    } else {
        Some(output.to_string())
    }
}

fn children(node: &Value) -> &[Value] {
    node.get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn render_children(node: &Value, depth: usize) -> String {
    children(node)
        .iter()
        .filter_map(|child| render_node(child, depth))
        .collect()
}

fn render_node(node: &Value, depth: usize) -> Option<String> {
    let node_type = node.get("type")?.as_str()?;
    let indent = "  ".repeat(depth);

    match node_type {
        "paragraph" => {
            let text = render_children(node, depth);
            Some(format!("{text}\n"))
        }
        "heading" => {
            let level = node
                .get("attrs")
                .and_then(|a| a.get("level"))
                .and_then(Value::as_u64)
                .unwrap_or(1) as usize;
            let text = render_children(node, 0);
            Some(format!("{indent}{} {}\n", "#".repeat(level.min(6)), text.trim()))
        }
        "bulletList" | "orderedList" => Some(render_children(node, depth)),
        "listItem" => {
            // Lists inside an item nest one level deeper
            let text = render_children(node, depth + 1);
            Some(format!("{indent}- {}\n", text.trim()))
        }
        "codeBlock" => {
            let language = node
                .get("attrs")
                .and_then(|a| a.get("language"))
                .and_then(Value::as_str)
                .unwrap_or("");
            let text = render_children(node, 0);
            Some(format!("```{language}\n{}\n```\n", text.trim_end()))
        }
        "text" => node.get("text").and_then(Value::as_str).map(str::to_string),
        "mention" => node
            .get("attrs")
            .and_then(|a| a.get("text"))
            .and_then(Value::as_str)
            .map(|t| {
                if t.starts_with('@') {
                    t.to_string()
                } else {
                    format!("@{t}")
                }
            }),
        "inlineCard" => node
            .get("attrs")
            .and_then(|a| a.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string),
        "hardBreak" => Some("\n".to_string()),
        "rule" => Some("---\n".to_string()),
        _ => {
            // Unknown node types still carry text in their children
            let text = render_children(node, depth);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
    }
}
