use crate::config::Config;
use crate::dom::DomNode;
use crate::page::HostEffect;

pub const BACK_TO_TOP_ID: &str = "back-to-top";
pub const VISIBLE_CLASS: &str = "visible";
/// The button shows once the page is scrolled strictly past this offset.
pub const SCROLL_THRESHOLD_PX: f64 = 300.0;

pub fn should_show(scroll_offset: f64) -> bool {
    scroll_offset > SCROLL_THRESHOLD_PX
}

/// Set the button tooltip from config. Done once per render.
pub fn init_back_to_top(doc: &mut DomNode, config: &Config) -> bool {
    match (doc.find_by_id_mut(BACK_TO_TOP_ID), config.back_to_top_title()) {
        (Some(button), Some(title)) => {
            button.set_attr("title", title);
            true
        }
        _ => false,
    }
}

/// Scroll-driven visibility of the back-to-top button.
pub struct BackToTop {
    present: bool,
    visible: bool,
}

impl BackToTop {
    pub fn attach(doc: &DomNode) -> Self {
        let button = doc.find_by_id(BACK_TO_TOP_ID);
        Self {
            present: button.is_some(),
            visible: button.map(|b| b.has_class(VISIBLE_CLASS)).unwrap_or(false),
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true when the visibility flipped.
    pub fn on_scroll(&mut self, doc: &mut DomNode, scroll_offset: f64) -> bool {
        if !self.present {
            return false;
        }
        let show = should_show(scroll_offset);
        if show == self.visible {
            return false;
        }
        if let Some(button) = doc.find_by_id_mut(BACK_TO_TOP_ID) {
            if show {
                button.add_class(VISIBLE_CLASS);
            } else {
                button.remove_class(VISIBLE_CLASS);
            }
        }
        self.visible = show;
        true
    }

    pub fn activate(&self) -> Option<HostEffect> {
        self.present.then_some(HostEffect::ScrollTo {
            top: 0.0,
            smooth: true,
        })
    }
}
