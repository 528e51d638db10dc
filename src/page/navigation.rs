//! Jump from a channel's private button to the matching private card.
//!
//! Choreography, in virtual time:
//! - t=0: button gets `btn-clicked`
//! - t=300: button released, private tab control checked
//! - t=400: card scrolled into view (centered) and highlighted
//! - t=2400: highlight removed
//!
//! A new activation cancels whatever is still pending and clears the
//! classes the previous run left behind before it starts.

use crate::dom::{by_class, DomNode};
use crate::page::card::{PRIVATE_BUTTON_CLASS, PRIVATE_TARGET_ATTR};
use crate::page::{HostEffect, ScrollBlock};
use crate::timeline::Timeline;

pub const PRESS_MS: u64 = 300;
pub const REVEAL_DELAY_MS: u64 = 100;
pub const HIGHLIGHT_MS: u64 = 2000;

pub const BUTTON_PRESSED_CLASS: &str = "btn-clicked";
pub const HIGHLIGHT_CLASS: &str = "highlight-card";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavStep {
    ReleaseButton { source_card: String, target_card: String },
    RevealCard { target_card: String },
    ClearHighlight { target_card: String },
}

pub struct TabNavigator {
    private_tab: Option<String>,
    timeline: Timeline<NavStep>,
    pressed: Option<String>,
    highlighted: Option<String>,
}

impl TabNavigator {
    /// `private_tab` is the id of the radio control of the private tab.
    /// It is dropped when the page has no such control.
    pub fn attach(doc: &DomNode, private_tab: Option<String>) -> Self {
        let private_tab = private_tab.filter(|id| doc.find_by_id(id).is_some());
        if private_tab.is_none() {
            log::debug!("No private tab control, private buttons stay on their tab");
        }
        Self {
            private_tab,
            timeline: Timeline::new(),
            pressed: None,
            highlighted: None,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    pub fn is_idle(&self) -> bool {
        self.timeline.is_idle()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Click on the private button of `source_card`.
    ///
    /// Returns false when the card has no in-page private button; such
    /// buttons are plain links and the host follows them itself.
    pub fn activate_private_button(&mut self, doc: &mut DomNode, source_card: &str) -> bool {
        let target = doc
            .find_by_id(source_card)
            .and_then(|card| card.find_first(&by_class(PRIVATE_BUTTON_CLASS)))
            .and_then(|button| button.attr(PRIVATE_TARGET_ATTR))
            .map(str::to_string);
        let Some(target_card) = target else {
            return false;
        };

        self.reset(doc);

        set_button_pressed(doc, source_card, true);
        self.pressed = Some(source_card.to_string());
        self.timeline.schedule(
            PRESS_MS,
            NavStep::ReleaseButton {
                source_card: source_card.to_string(),
                target_card,
            },
        );
        true
    }

    /// Check the private tab control, then reveal `card_id` once the tab
    /// had time to lay out.
    pub fn switch_to_private_tab(&mut self, doc: &mut DomNode, card_id: &str) {
        if let Some(control) = &self.private_tab {
            check_tab_control(doc, control);
        }
        self.timeline.schedule(
            REVEAL_DELAY_MS,
            NavStep::RevealCard {
                target_card: card_id.to_string(),
            },
        );
    }

    /// Advance virtual time, running every step that falls due.
    pub fn advance(&mut self, doc: &mut DomNode, ms: u64) -> Vec<HostEffect> {
        let until = self.timeline.now_ms().saturating_add(ms);
        let mut effects = Vec::new();
        while let Some(step) = self.timeline.pop_due(until) {
            log::debug!("t={}ms {:?}", self.timeline.now_ms(), step);
            self.run(doc, step, &mut effects);
        }
        self.timeline.settle(until);
        effects
    }

    fn run(&mut self, doc: &mut DomNode, step: NavStep, effects: &mut Vec<HostEffect>) {
        match step {
            NavStep::ReleaseButton {
                source_card,
                target_card,
            } => {
                set_button_pressed(doc, &source_card, false);
                self.pressed = None;
                self.switch_to_private_tab(doc, &target_card);
            }
            NavStep::RevealCard { target_card } => {
                let Some(card) = doc.find_by_id_mut(&target_card) else {
                    return;
                };
                card.add_class(HIGHLIGHT_CLASS);
                effects.push(HostEffect::ScrollIntoView {
                    card_id: target_card.clone(),
                    block: ScrollBlock::Center,
                    smooth: true,
                });
                self.highlighted = Some(target_card.clone());
                self.timeline
                    .schedule(HIGHLIGHT_MS, NavStep::ClearHighlight { target_card });
            }
            NavStep::ClearHighlight { target_card } => {
                if let Some(card) = doc.find_by_id_mut(&target_card) {
                    card.remove_class(HIGHLIGHT_CLASS);
                }
                self.highlighted = None;
            }
        }
    }

    fn reset(&mut self, doc: &mut DomNode) {
        if self.timeline.cancel_all() > 0 {
            log::debug!("Restarting private tab navigation");
        }
        if let Some(source) = self.pressed.take() {
            set_button_pressed(doc, &source, false);
        }
        if let Some(card_id) = self.highlighted.take() {
            if let Some(card) = doc.find_by_id_mut(&card_id) {
                card.remove_class(HIGHLIGHT_CLASS);
            }
        }
    }
}

fn set_button_pressed(doc: &mut DomNode, card_id: &str, pressed: bool) {
    let button = doc
        .find_by_id_mut(card_id)
        .and_then(|card| card.find_first_mut(&by_class(PRIVATE_BUTTON_CLASS)));
    if let Some(button) = button {
        if pressed {
            button.add_class(BUTTON_PRESSED_CLASS);
        } else {
            button.remove_class(BUTTON_PRESSED_CLASS);
        }
    }
}

/// Check a radio tab control and uncheck the rest of its group.
fn check_tab_control(doc: &mut DomNode, control_id: &str) {
    let group = doc
        .find_by_id(control_id)
        .and_then(|c| c.attr("name"))
        .map(str::to_string);
    if let Some(group) = group {
        doc.for_each_mut(
            &|n: &DomNode| n.is_element() && n.tag == "input" && n.attr("name") == Some(group.as_str()),
            &mut |input| {
                input.remove_attr("checked");
            },
        );
    }
    if let Some(control) = doc.find_by_id_mut(control_id) {
        control.set_attr("checked", "");
    }
}

/// Id of the checked tab control, if any.
pub fn active_tab(doc: &DomNode) -> Option<String> {
    doc.find_first(&|n: &DomNode| {
        n.is_element()
            && n.tag == "input"
            && n.attr("type") == Some("radio")
            && n.attr("checked").is_some()
    })
    .and_then(|n| n.id())
    .map(str::to_string)
}
