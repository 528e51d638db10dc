//! Substring search over rendered cards.
//!
//! The filter has two states. `Unfiltered` shows every card; `Filtered`
//! shows the cards whose title, description or username contains the query
//! and puts a single "no results" notice into every tab that has no match.

use crate::dom::{by_class, by_id, DomNode};
use crate::page::card::CARD_CLASS;

pub const NO_RESULTS_CLASS: &str = "no-results";
pub const SEARCH_INPUT_ID: &str = "search-input";
pub const SEARCH_BUTTON_ID: &str = "search-button";
const TAB_CONTENT_CLASS: &str = "tab-content";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Unfiltered,
    /// Trimmed, lower-cased, never empty.
    Filtered(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Enter,
    Escape,
    Other,
}

/// Search keys of one card, read once from its `data-*` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardKeys {
    pub title: String,
    pub description: String,
    pub username: String,
}

impl CardKeys {
    fn from_node(card: &DomNode) -> Self {
        let key = |name: &str| card.attr(name).unwrap_or_default().to_string();
        Self {
            title: key("data-title"),
            description: key("data-description"),
            username: key("data-username"),
        }
    }

    /// `query` must already be lower-cased.
    pub fn matches(&self, query: &str) -> bool {
        self.title.contains(query)
            || self.description.contains(query)
            || self.username.contains(query)
    }
}

#[derive(Debug, Clone)]
struct ContainerIndex {
    id: String,
    cards: Vec<CardKeys>,
}

/// Cards grouped by tab container, in document order.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    containers: Vec<ContainerIndex>,
}

impl SearchIndex {
    pub fn build(doc: &DomNode) -> Self {
        let containers = doc
            .find_all(&by_class(TAB_CONTENT_CLASS))
            .into_iter()
            .filter_map(|content| {
                let id = content.id()?.to_string();
                let cards = content
                    .find_all(&by_class(CARD_CLASS))
                    .into_iter()
                    .map(CardKeys::from_node)
                    .collect();
                Some(ContainerIndex { id, cards })
            })
            .collect();
        Self { containers }
    }

    pub fn card_count(&self) -> usize {
        self.containers.iter().map(|c| c.cards.len()).sum()
    }

    pub fn container_ids(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|c| c.id.as_str())
    }

    /// Per container, which cards match `query` (lower-cased).
    pub fn match_flags(&self, query: &str) -> Vec<(&str, Vec<bool>)> {
        self.containers
            .iter()
            .map(|c| {
                let flags = c.cards.iter().map(|k| k.matches(query)).collect();
                (c.id.as_str(), flags)
            })
            .collect()
    }
}

pub struct SearchFilter {
    index: SearchIndex,
    state: SearchState,
    value: String,
    no_results_label: String,
}

impl SearchFilter {
    /// Returns `None` when the page lacks the search input or button.
    pub fn attach(doc: &DomNode, no_results_label: &str) -> Option<Self> {
        if doc.find_first(&by_id(SEARCH_INPUT_ID)).is_none()
            || doc.find_first(&by_id(SEARCH_BUTTON_ID)).is_none()
        {
            log::debug!("Search controls missing, search disabled");
            return None;
        }
        let value = doc
            .find_by_id(SEARCH_INPUT_ID)
            .and_then(|input| input.attr("value"))
            .unwrap_or_default()
            .to_string();
        Some(Self {
            index: SearchIndex::build(doc),
            state: SearchState::Unfiltered,
            value,
            no_results_label: no_results_label.to_string(),
        })
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Current raw input value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The input value changed through editing. Only an empty value
    /// changes the filter.
    pub fn edit(&mut self, doc: &mut DomNode, value: &str) {
        self.value = value.to_string();
        sync_input(doc, &self.value);
        if self.value.trim().is_empty() {
            self.perform(doc);
        }
    }

    pub fn key(&mut self, doc: &mut DomNode, key: SearchKey) {
        match key {
            SearchKey::Enter => self.perform(doc),
            SearchKey::Escape => {
                self.value.clear();
                sync_input(doc, &self.value);
                self.perform(doc);
            }
            SearchKey::Other => {
                if self.value.trim().is_empty() {
                    self.perform(doc);
                }
            }
        }
    }

    /// Search button activation.
    pub fn submit(&mut self, doc: &mut DomNode) {
        self.perform(doc);
    }

    fn perform(&mut self, doc: &mut DomNode) {
        let query = self.value.trim().to_lowercase();
        if query.is_empty() {
            show_all(doc);
            self.state = SearchState::Unfiltered;
            log::debug!("Search cleared");
            return;
        }

        let flags = self.index.match_flags(&query);
        for (container_id, matches) in &flags {
            let Some(content) = doc.find_by_id_mut(container_id) else {
                continue;
            };
            let mut next = matches.iter();
            content.for_each_mut(&by_class(CARD_CLASS), &mut |card| {
                card.set_display(next.next().copied().unwrap_or(false));
            });

            let found = matches.iter().filter(|m| **m).count();
            let has_notice = content.find_first(&by_class(NO_RESULTS_CLASS)).is_some();
            if found == 0 {
                if !has_notice {
                    content.append_child(
                        DomNode::el("div")
                            .with_class(NO_RESULTS_CLASS)
                            .with_text(self.no_results_label.as_str()),
                    );
                }
            } else if has_notice {
                content.remove_where(&by_class(NO_RESULTS_CLASS));
            }
        }

        log::debug!("Search for {:?} applied", query);
        self.state = SearchState::Filtered(query);
    }
}

fn show_all(doc: &mut DomNode) {
    doc.for_each_mut(&by_class(CARD_CLASS), &mut |card| card.set_display(true));
    doc.remove_where(&by_class(NO_RESULTS_CLASS));
}

fn sync_input(doc: &mut DomNode, value: &str) {
    if let Some(input) = doc.find_by_id_mut(SEARCH_INPUT_ID) {
        input.set_attr("value", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pipeline::CatalogEngine;
    use crate::page::fixtures;

    fn rendered() -> DomNode {
        CatalogEngine::new()
            .with_cache_bust(1)
            .render(fixtures::TEMPLATE, "site/index.html", &fixtures::config())
            .dom
            .root
    }

    fn visible_usernames(doc: &DomNode, container: &str) -> Vec<String> {
        doc.find_by_id(container)
            .unwrap()
            .find_all(&by_class(CARD_CLASS))
            .into_iter()
            .filter(|c| c.is_displayed())
            .map(|c| c.attr("data-username").unwrap().to_string())
            .collect()
    }

    fn notices(doc: &DomNode, container: &str) -> usize {
        doc.find_by_id(container)
            .unwrap()
            .find_all(&by_class(NO_RESULTS_CLASS))
            .len()
    }

    #[test]
    fn index_reads_keys_per_container() {
        let doc = rendered();
        let index = SearchIndex::build(&doc);
        assert_eq!(index.card_count(), 6);
        let ids: Vec<&str> = index.container_ids().collect();
        assert_eq!(ids, vec!["content1", "content2", "content3", "content4"]);
    }

    #[test]
    fn query_matches_any_key() {
        let keys = CardKeys {
            title: "daily news".into(),
            description: "morning digests".into(),
            username: "@newsdaily".into(),
        };
        assert!(keys.matches("news"));
        assert!(keys.matches("digest"));
        assert!(keys.matches("@news"));
        assert!(!keys.matches("crypto"));
    }

    #[test]
    fn filter_shows_matching_cards_only() {
        let mut doc = rendered();
        let mut search = SearchFilter::attach(&doc, "No results found").unwrap();
        search.edit(&mut doc, "  NEWS ");
        assert_eq!(search.state(), &SearchState::Unfiltered);
        search.key(&mut doc, SearchKey::Enter);

        assert_eq!(search.state(), &SearchState::Filtered("news".into()));
        assert_eq!(
            visible_usernames(&doc, "content1"),
            vec!["@newsdaily", "@newsworld"]
        );
        assert_eq!(notices(&doc, "content1"), 0);
        assert_eq!(notices(&doc, "content2"), 1);
        assert_eq!(notices(&doc, "content3"), 1);
        assert_eq!(notices(&doc, "content4"), 0);
        assert_eq!(
            doc.find_by_id(SEARCH_INPUT_ID).unwrap().attr("value"),
            Some("  NEWS ")
        );
    }

    #[test]
    fn no_results_notice_is_not_duplicated() {
        let mut doc = rendered();
        let mut search = SearchFilter::attach(&doc, "Nothing here").unwrap();
        search.edit(&mut doc, "zzz");
        search.submit(&mut doc);
        search.submit(&mut doc);
        search.key(&mut doc, SearchKey::Enter);

        for container in ["content1", "content2", "content3", "content4"] {
            assert_eq!(notices(&doc, container), 1);
            assert!(visible_usernames(&doc, container).is_empty());
        }
        let notice = doc.find_first(&by_class(NO_RESULTS_CLASS)).unwrap();
        assert_eq!(notice.text_content(), "Nothing here");
    }

    #[test]
    fn notice_removed_when_container_matches_again() {
        let mut doc = rendered();
        let mut search = SearchFilter::attach(&doc, "No results found").unwrap();
        search.edit(&mut doc, "zzz");
        search.submit(&mut doc);
        search.edit(&mut doc, "rust");
        search.submit(&mut doc);

        assert_eq!(notices(&doc, "content2"), 0);
        assert_eq!(notices(&doc, "content1"), 1);
        assert_eq!(visible_usernames(&doc, "content2"), vec!["@rust_users"]);
    }

    #[test]
    fn clearing_restores_everything() {
        let mut doc = rendered();
        let mut search = SearchFilter::attach(&doc, "No results found").unwrap();
        search.edit(&mut doc, "abc");
        search.submit(&mut doc);
        assert!(doc.find_first(&by_class(NO_RESULTS_CLASS)).is_some());

        search.edit(&mut doc, "");
        assert_eq!(search.state(), &SearchState::Unfiltered);
        assert!(doc.find_first(&by_class(NO_RESULTS_CLASS)).is_none());
        assert!(doc
            .find_all(&by_class(CARD_CLASS))
            .iter()
            .all(|c| c.is_displayed()));
    }

    #[test]
    fn escape_clears_query() {
        let mut doc = rendered();
        let mut search = SearchFilter::attach(&doc, "No results found").unwrap();
        search.edit(&mut doc, "crypto");
        search.submit(&mut doc);
        assert_eq!(visible_usernames(&doc, "content1"), vec!["@cryptotalk"]);

        search.key(&mut doc, SearchKey::Escape);
        assert_eq!(search.value(), "");
        assert_eq!(search.state(), &SearchState::Unfiltered);
        assert_eq!(visible_usernames(&doc, "content1").len(), 3);
        assert_eq!(doc.find_by_id(SEARCH_INPUT_ID).unwrap().attr("value"), Some(""));
    }

    #[test]
    fn other_keys_keep_filter_until_submitted() {
        let mut doc = rendered();
        let mut search = SearchFilter::attach(&doc, "No results found").unwrap();
        search.edit(&mut doc, "crypto");
        search.submit(&mut doc);
        search.edit(&mut doc, "cryptox");
        search.key(&mut doc, SearchKey::Other);
        assert_eq!(search.state(), &SearchState::Filtered("crypto".into()));
    }

    #[test]
    fn missing_controls_disable_search() {
        let doc = DomNode::document(vec![DomNode::el("body")
            .with_child(DomNode::el("input").with_attr("id", SEARCH_INPUT_ID))]);
        assert!(SearchFilter::attach(&doc, "none").is_none());
    }
}
