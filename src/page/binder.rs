//! Copies config strings into the fixed page regions.
//!
//! A region is bound only when both its anchor element and its config field
//! exist; anything else is skipped without error.

use crate::config::{non_empty, Config};
use crate::dom::{by_class, by_id, by_tag, DomNode};

/// Bind every text region. Returns the number of regions that were bound.
pub fn bind_texts(doc: &mut DomNode, config: &Config) -> usize {
    let mut bound = 0;

    let title = config.title.as_deref();
    bound += bind_text(doc, &by_id("page-title"), title) as usize;
    bound += bind_text(doc, &by_tag("h1"), title) as usize;
    bound += bind_subtitle(doc, config.subtitle.as_deref()) as usize;
    bound += bind_text(doc, &by_id("footer-copyright"), config.footer.as_deref()) as usize;
    bound += bind_text(doc, &by_id("about-text"), non_empty(config.about_text.as_deref())) as usize;

    let Some(texts) = &config.texts else {
        return bound;
    };

    if let Some(placeholder) = non_empty(texts.search.as_deref()) {
        if let Some(input) = doc.find_by_id_mut("search-input") {
            input.set_attr("placeholder", placeholder);
            bound += 1;
        }
    }

    if let Some(tabs) = &texts.tabs {
        doc.for_each_mut(&by_class("tab-label"), &mut |label| {
            let text = label
                .attr("data-tab")
                .and_then(|tab| non_empty(tabs.get(tab).map(String::as_str)))
                .map(str::to_uppercase);
            if let Some(text) = text {
                label.set_text(text);
                bound += 1;
            }
        });
    }

    if let Some(footer) = &texts.footer {
        let titles = [
            ("footer-about-title", &footer.about),
            ("footer-contacts-title", &footer.contacts),
            ("footer-forums-title", &footer.forums),
        ];
        for (id, title) in titles {
            bound += bind_text(doc, &by_id(id), non_empty(title.as_deref())) as usize;
        }
    }

    bound
}

/// Label the i-th `.tab-label` with the i-th category name.
///
/// Runs after [`bind_texts`], so category names win over `texts.tabs`.
pub fn bind_category_labels(doc: &mut DomNode, config: &Config) -> usize {
    let mut names = config.categories.iter().map(|c| c.name.as_str());
    let mut labels = 0;
    let mut bound = 0;
    doc.for_each_mut(&by_class("tab-label"), &mut |label| {
        labels += 1;
        if let Some(name) = names.next() {
            label.set_text(name);
            bound += 1;
        }
    });

    if labels != config.categories.len() {
        log::warn!(
            "Page has {} tab labels for {} categories",
            labels,
            config.categories.len()
        );
    }
    bound
}

fn bind_text<F>(doc: &mut DomNode, anchor: &F, value: Option<&str>) -> bool
where
    F: Fn(&DomNode) -> bool,
{
    let Some(value) = value else {
        return false;
    };
    match doc.find_first_mut(anchor) {
        Some(node) => {
            node.set_text(value);
            true
        }
        None => {
            log::debug!("No anchor for text {:?}", value);
            false
        }
    }
}

fn bind_subtitle(doc: &mut DomNode, subtitle: Option<&str>) -> bool {
    let Some(subtitle) = subtitle else {
        return false;
    };
    match header_paragraph(doc, false) {
        Some(p) => {
            p.set_text(subtitle);
            true
        }
        None => false,
    }
}

/// First `<p>` in document order that sits anywhere below a `<header>`.
fn header_paragraph(node: &mut DomNode, in_header: bool) -> Option<&mut DomNode> {
    if in_header && node.is_element() && node.tag == "p" {
        return Some(node);
    }
    let in_header = in_header || (node.is_element() && node.tag == "header");
    node.children
        .iter_mut()
        .find_map(|child| header_paragraph(child, in_header))
}
