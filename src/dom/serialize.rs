//! HTML serialization of a `DomNode` tree.

use crate::dom::{DomNode, NodeType};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text children are written without escaping
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Serialize a node (usually the document) to an HTML string.
pub fn to_html(node: &DomNode) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

fn write_node(node: &DomNode, raw_text: bool, out: &mut String) {
    match node.node_type {
        NodeType::Document => {
            out.push_str("<!DOCTYPE html>\n");
            for child in &node.children {
                write_node(child, false, out);
            }
        }
        NodeType::Text => {
            if raw_text {
                out.push_str(&node.text);
            } else {
                escape_into(&node.text, false, out);
            }
        }
        NodeType::Element => {
            out.push('<');
            out.push_str(&node.tag);
            for (name, value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
            }
            out.push('>');

            if VOID_TAGS.contains(&node.tag.as_str()) {
                return;
            }

            let raw = RAW_TEXT_TAGS.contains(&node.tag.as_str());
            for child in &node.children {
                write_node(child, raw, out);
            }
            out.push_str("</");
            out.push_str(&node.tag);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
