pub mod parser;
pub mod serialize;

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// Owned DOM node.
///
/// Attributes live in a sorted map so that serializing the same tree twice
/// yields byte-identical HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn document(children: Vec<DomNode>) -> Self {
        Self {
            tag: "#document".into(),
            attributes: BTreeMap::new(),
            text: String::new(),
            children,
            node_type: NodeType::Document,
        }
    }

    pub fn element(
        tag: impl Into<String>,
        attrs: BTreeMap<String, String>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            text: String::new(),
            children,
            node_type: NodeType::Element,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: BTreeMap::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    /// Empty element, the starting point for the `with_*` builders.
    pub fn el(tag: impl Into<String>) -> Self {
        Self::element(tag, BTreeMap::new(), Vec::new())
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.with_attr("class", class)
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, content: impl Into<String>) -> Self {
        self.children.push(DomNode::text(content));
        self
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Concatenated text of the subtree, like the DOM `textContent` getter.
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        self.text_content_inner(&mut buf);
        buf
    }

    fn text_content_inner(&self, buf: &mut String) {
        buf.push_str(&self.text);
        for child in &self.children {
            child.text_content_inner(buf);
        }
    }

    /// Replace all children with a single text node, like the DOM
    /// `textContent` setter.
    pub fn set_text(&mut self, content: impl Into<String>) {
        self.children.clear();
        self.children.push(DomNode::text(content));
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            let joined = remaining.join(" ");
            self.set_attr("class", joined);
        }
    }

    /// Set the inline `display` style used to show or hide cards.
    pub fn set_display(&mut self, visible: bool) {
        let value = if visible { "display: flex" } else { "display: none" };
        self.set_attr("style", value);
    }

    /// False only when an inline `display: none` is present.
    pub fn is_displayed(&self) -> bool {
        self.attr("style")
            .map(|style| {
                !style
                    .split(';')
                    .any(|decl| decl.split_whitespace().collect::<String>() == "display:none")
            })
            .unwrap_or(true)
    }

    pub fn append_child(&mut self, child: DomNode) {
        self.children.push(child);
    }

    /// First node in pre-order (self included) matching `pred`.
    pub fn find_first<F>(&self, pred: &F) -> Option<&DomNode>
    where
        F: Fn(&DomNode) -> bool,
    {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_first(pred))
    }

    pub fn find_first_mut<F>(&mut self, pred: &F) -> Option<&mut DomNode>
    where
        F: Fn(&DomNode) -> bool,
    {
        if pred(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Some(found) = child.find_first_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    /// All nodes matching `pred`, in document order.
    pub fn find_all<F>(&self, pred: &F) -> Vec<&DomNode>
    where
        F: Fn(&DomNode) -> bool,
    {
        let mut out = Vec::new();
        self.collect_matching(pred, &mut out);
        out
    }

    fn collect_matching<'a, F>(&'a self, pred: &F, out: &mut Vec<&'a DomNode>)
    where
        F: Fn(&DomNode) -> bool,
    {
        if pred(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect_matching(pred, out);
        }
    }

    /// Apply `f` to every node matching `pred`, in document order.
    ///
    /// Children are visited after `f` ran on their parent, so `f` may
    /// replace a node's children.
    pub fn for_each_mut<P, F>(&mut self, pred: &P, f: &mut F)
    where
        P: Fn(&DomNode) -> bool,
        F: FnMut(&mut DomNode),
    {
        if pred(self) {
            f(self);
        }
        for child in &mut self.children {
            child.for_each_mut(pred, f);
        }
    }

    /// Remove every descendant matching `pred`. Returns how many were removed.
    pub fn remove_where<F>(&mut self, pred: &F) -> usize
    where
        F: Fn(&DomNode) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|c| !pred(c));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_where(pred);
        }
        removed
    }

    pub fn find_by_id(&self, id: &str) -> Option<&DomNode> {
        self.find_first(&by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut DomNode> {
        self.find_first_mut(&by_id(id))
    }
}

pub fn by_id(id: &str) -> impl Fn(&DomNode) -> bool + '_ {
    move |n| n.is_element() && n.id() == Some(id)
}

pub fn by_class(class: &str) -> impl Fn(&DomNode) -> bool + '_ {
    move |n| n.is_element() && n.has_class(class)
}

pub fn by_tag(tag: &str) -> impl Fn(&DomNode) -> bool + '_ {
    move |n| n.is_element() && n.tag == tag
}

/// Parsed page with the location it was loaded from.
#[derive(Debug, Clone)]
pub struct DomTree {
    pub root: DomNode,
    pub source: String,
}

impl DomTree {
    /// Current text of the `<title>` element.
    pub fn title(&self) -> String {
        self.root
            .find_first(&by_tag("title"))
            .map(|t| t.text_content().trim().to_string())
            .unwrap_or_default()
    }
}
