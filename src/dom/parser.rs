use crate::dom::{DomNode, DomTree};
use scraper::{ElementRef, Html, Node};
use std::collections::BTreeMap;

/// Parse the host page into a DomTree
pub fn parse_html(html: &str, source: &str) -> DomTree {
    let document = Html::parse_document(html);
    let root = convert_element(document.root_element());

    DomTree {
        root: DomNode::document(vec![root]),
        source: source.to_string(),
    }
}

fn convert_element(el: ElementRef<'_>) -> DomNode {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: BTreeMap<String, String> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut children = Vec::new();

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    children.push(convert_element(child_el));
                }
            }
            // Whitespace between inline elements is rendered, so text is kept as is.
            Node::Text(t) => children.push(DomNode::text(t.text.to_string())),
            _ => {}
        }
    }

    DomNode::element(tag, attributes, children)
}
