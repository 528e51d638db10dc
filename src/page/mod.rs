//! Catalog page components.
//!
//! Rendering steps (`binder`, `contacts`, `card`) mutate a parsed template
//! once; interactive components (`search`, `navigation`, `back_to_top`) are
//! driven afterwards by a [`session::PageSession`].

pub mod back_to_top;
pub mod binder;
pub mod card;
pub mod contacts;
pub mod navigation;
pub mod search;
pub mod session;

use crate::config::Config;

/// Shared inputs of one render pass.
pub struct RenderContext<'a> {
    pub config: &'a Config,
    /// Millisecond stamp appended to logo URLs as `?t=`.
    pub cache_bust: u64,
}

/// Id of the tab content container for the category at `index`.
pub fn content_id(index: usize) -> String {
    format!("content{}", index + 1)
}

/// Id of the radio control selecting the tab at `index`.
pub fn tab_control_id(index: usize) -> String {
    format!("tab{}", index + 1)
}

/// Side effects the host (browser window) has to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEffect {
    ScrollTo { top: f64, smooth: bool },
    ScrollIntoView { card_id: String, block: ScrollBlock, smooth: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Center,
}
