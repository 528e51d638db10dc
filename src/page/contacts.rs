use std::collections::BTreeMap;

use crate::config::{non_empty, Config, ExternalLink};
use crate::dom::{by_class, DomNode};

/// Values longer than this many characters are shortened for display.
pub const CONTACT_MAX_CHARS: usize = 20;
const CONTACT_HEAD_CHARS: usize = 10;
const CONTACT_TAIL_CHARS: usize = 2;

/// Display form of a contact value: first 10 chars, `...`, last 2 chars.
pub fn truncate_contact(value: &str) -> String {
    let len = value.chars().count();
    if len <= CONTACT_MAX_CHARS {
        return value.to_string();
    }
    let head: String = value.chars().take(CONTACT_HEAD_CHARS).collect();
    let tail: String = value.chars().skip(len - CONTACT_TAIL_CHARS).collect();
    format!("{}...{}", head, tail)
}

/// Fill contact labels and values. Returns the number of values rendered.
pub fn render_contacts(doc: &mut DomNode, config: &Config) -> usize {
    if let Some(labels) = config.footer_texts().and_then(|f| f.contact_labels.as_ref()) {
        doc.for_each_mut(&by_class("contact-label"), &mut |label| {
            let text = label
                .attr("data-contact-type")
                .and_then(|kind| non_empty(labels.get(kind).map(String::as_str)))
                .map(str::to_string);
            if let Some(text) = text {
                label.set_text(text);
            }
        });
    }

    match &config.contact_info {
        Some(info) => render_contact_values(doc, info),
        None => 0,
    }
}

fn render_contact_values(doc: &mut DomNode, info: &BTreeMap<String, String>) -> usize {
    let mut rendered = 0;
    doc.for_each_mut(&by_class("contact-item"), &mut |item| {
        let full = item
            .find_first(&by_class("contact-label"))
            .and_then(|label| label.attr("data-contact-type"))
            .and_then(|kind| non_empty(info.get(kind).map(String::as_str)));
        let Some(full) = full else {
            return;
        };
        if let Some(value) = item.find_first_mut(&by_class("contact-value")) {
            value.set_attr("data-full", full);
            value.set_text(truncate_contact(full));
            rendered += 1;
        }
    });
    rendered
}

/// Replace the `.forums-list` content with one anchor per link.
pub fn render_external_links(doc: &mut DomNode, links: &[ExternalLink]) -> bool {
    let Some(list) = doc.find_first_mut(&by_class("forums-list")) else {
        log::debug!("No .forums-list on page, skipping external links");
        return false;
    };
    list.children.clear();
    for link in links {
        list.append_child(
            DomNode::el("a")
                .with_attr("href", link.url.as_str())
                .with_attr("target", "_blank")
                .with_child(DomNode::el("i").with_class(&link.icon))
                .with_text(format!(" {}", link.name)),
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::by_tag;
    use crate::page::fixtures;

    #[test]
    fn truncation_boundary() {
        assert_eq!(truncate_contact("exactly-twenty-chars"), "exactly-twenty-chars");
        assert_eq!(
            truncate_contact("twenty-one-characters"),
            "twenty-one...rs"
        );
        assert_eq!(truncate_contact(""), "");
    }

    #[test]
    fn truncation_counts_characters() {
        let value = "ключ-кошелька-очень-длинный";
        assert_eq!(truncate_contact(value), "ключ-кошел...ый");
    }

    #[test]
    fn renders_values_with_full_attribute() {
        let mut tree = fixtures::template();
        let config = fixtures::config();
        assert_eq!(render_contacts(&mut tree.root, &config), 3);

        let values = tree.root.find_all(&by_class("contact-value"));
        assert_eq!(values[0].text_content(), "editor@dir...le");
        assert_eq!(values[0].attr("data-full"), Some("editor@directory.example"));
        assert_eq!(values[1].text_content(), "@directory_admin");
        assert_eq!(values[2].text_content(), "UQBx3k9Lr2...gH");

        let labels = tree.root.find_all(&by_class("contact-label"));
        assert_eq!(labels[0].text_content(), "E-mail");
        assert_eq!(labels[2].text_content(), "Donations");
    }

    #[test]
    fn unknown_contact_types_keep_template_text() {
        let mut tree = fixtures::template();
        let mut config = fixtures::config();
        config.contact_info = Some(BTreeMap::from([(
            "email".to_string(),
            "a@b.c".to_string(),
        )]));
        assert_eq!(render_contacts(&mut tree.root, &config), 1);
        let values = tree.root.find_all(&by_class("contact-value"));
        assert_eq!(values[1].text_content(), "-");
        assert_eq!(values[1].attr("data-full"), None);
    }

    #[test]
    fn empty_contact_values_keep_template_text() {
        let mut tree = fixtures::template();
        let mut config = fixtures::config();
        config.contact_info = Some(BTreeMap::from([
            ("email".to_string(), String::new()),
            ("telegram".to_string(), "@desk".to_string()),
        ]));
        assert_eq!(render_contacts(&mut tree.root, &config), 1);
        let values = tree.root.find_all(&by_class("contact-value"));
        assert_eq!(values[0].text_content(), "-");
        assert_eq!(values[0].attr("data-full"), None);
        assert_eq!(values[1].text_content(), "@desk");
    }

    #[test]
    fn external_links_replace_list() {
        let mut tree = fixtures::template();
        let config = fixtures::config();
        let links = config.external_links.as_deref().unwrap();
        assert!(render_external_links(&mut tree.root, links));

        let list = tree.root.find_first(&by_class("forums-list")).unwrap();
        let anchors = list.find_all(&by_tag("a"));
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].attr("href"), Some("https://forum.directory.example"));
        assert_eq!(anchors[0].attr("target"), Some("_blank"));
        assert_eq!(anchors[0].text_content(), " Community forum");
        let icon = anchors[1].find_first(&by_tag("i")).unwrap();
        assert_eq!(icon.attr("class"), Some("fa fa-bullhorn"));
    }
}
