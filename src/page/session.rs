//! Interactive state over one rendered page.
//!
//! A session is created only from a finished render, so no event can
//! observe a half-built page.

use crate::config::Config;
use crate::dom::serialize::to_html;
use crate::dom::{by_class, by_tag, DomTree};
use crate::engine::pipeline::RenderedPage;
use crate::page::back_to_top::BackToTop;
use crate::page::card::CARD_CLASS;
use crate::page::navigation::{active_tab, TabNavigator};
use crate::page::search::{SearchFilter, SearchKey, SearchState, NO_RESULTS_CLASS};
use crate::page::HostEffect;

/// Events the host page forwards to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The search input value changed.
    SearchEdit(String),
    /// A key was released in the search input.
    SearchKey(SearchKey),
    SearchClick,
    /// Vertical scroll offset in pixels.
    Scroll(f64),
    BackToTopClick,
    /// Private button of the card with this id was clicked.
    PrivateButtonClick(String),
}

/// What one tab currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSummary {
    pub container_id: String,
    pub visible_titles: Vec<String>,
    pub no_results: bool,
}

pub struct PageSession {
    dom: DomTree,
    search: Option<SearchFilter>,
    back_to_top: BackToTop,
    navigator: TabNavigator,
}

impl PageSession {
    pub fn new(page: RenderedPage, config: &Config) -> Self {
        let RenderedPage {
            dom, private_tab, ..
        } = page;
        let search = SearchFilter::attach(&dom.root, config.no_results_label());
        let back_to_top = BackToTop::attach(&dom.root);
        let navigator = TabNavigator::attach(&dom.root, private_tab);
        Self {
            dom,
            search,
            back_to_top,
            navigator,
        }
    }

    pub fn dispatch(&mut self, event: PageEvent) -> Vec<HostEffect> {
        let doc = &mut self.dom.root;
        match event {
            PageEvent::SearchEdit(value) => {
                if let Some(search) = &mut self.search {
                    search.edit(doc, &value);
                }
            }
            PageEvent::SearchKey(key) => {
                if let Some(search) = &mut self.search {
                    search.key(doc, key);
                }
            }
            PageEvent::SearchClick => {
                if let Some(search) = &mut self.search {
                    search.submit(doc);
                }
            }
            PageEvent::Scroll(offset) => {
                self.back_to_top.on_scroll(doc, offset);
            }
            PageEvent::BackToTopClick => {
                return self.back_to_top.activate().into_iter().collect();
            }
            PageEvent::PrivateButtonClick(card_id) => {
                self.navigator.activate_private_button(doc, &card_id);
            }
        }
        Vec::new()
    }

    /// Let `ms` milliseconds of virtual time pass.
    pub fn advance(&mut self, ms: u64) -> Vec<HostEffect> {
        self.navigator.advance(&mut self.dom.root, ms)
    }

    pub fn dom(&self) -> &DomTree {
        &self.dom
    }

    pub fn to_html(&self) -> String {
        to_html(&self.dom.root)
    }

    pub fn search_state(&self) -> Option<&SearchState> {
        self.search.as_ref().map(|s| s.state())
    }

    pub fn back_to_top_visible(&self) -> bool {
        self.back_to_top.is_visible()
    }

    pub fn active_tab(&self) -> Option<String> {
        active_tab(&self.dom.root)
    }

    pub fn now_ms(&self) -> u64 {
        self.navigator.now_ms()
    }

    /// Visible card titles and notice state per tab container.
    pub fn summarize(&self) -> Vec<TabSummary> {
        self.dom
            .root
            .find_all(&by_class("tab-content"))
            .into_iter()
            .filter_map(|content| {
                let container_id = content.id()?.to_string();
                let visible_titles = content
                    .find_all(&by_class(CARD_CLASS))
                    .into_iter()
                    .filter(|card| card.is_displayed())
                    .filter_map(|card| card.find_first(&by_tag("h3")))
                    .map(|h3| h3.text_content())
                    .collect();
                let no_results = content.find_first(&by_class(NO_RESULTS_CLASS)).is_some();
                Some(TabSummary {
                    container_id,
                    visible_titles,
                    no_results,
                })
            })
            .collect()
    }
}
