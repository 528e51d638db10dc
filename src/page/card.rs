//! Card construction and per-category rendering.

use std::collections::HashMap;

use crate::config::{non_empty, CatalogItem, Config, CHANNELS_CATEGORY_ID, PRIVATE_CATEGORY_ID};
use crate::dom::{by_class, by_tag, DomNode};
use crate::page::{content_id, RenderContext};

pub const CARD_CLASS: &str = "card";
pub const PRIVATE_BUTTON_CLASS: &str = "private-btn";
/// Attribute naming the private card an in-page private button jumps to.
pub const PRIVATE_TARGET_ATTR: &str = "data-private-target";

const LOCK_ICON_PATH: &str = "M18 8h-1V6c0-2.76-2.24-5-5-5S7 3.24 7 6v2H6c-1.1 0-2 .9-2 2v10c0 1.1.9 2 2 2h12c1.1 0 2-.9 2-2V10c0-1.1-.9-2-2-2zM9 6c0-1.66 1.34-3 3-3s3 1.34 3 3v2H9V6zm9 14H6V10h12v10zm-6-3c1.1 0 2-.9 2-2s-.9-2-2-2-2 .9-2 2 .9 2 2 2z";

/// Username of each private item mapped to the id of its rendered card.
///
/// Rebuilt once per render pass, never updated afterwards.
#[derive(Debug, Clone, Default)]
pub struct PrivateChannelMap {
    ids: HashMap<String, String>,
}

impl PrivateChannelMap {
    pub fn build(config: &Config) -> Self {
        let ids = config
            .categories
            .iter()
            .find(|c| c.id == PRIVATE_CATEGORY_ID)
            .map(|category| {
                category
                    .items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (item.username.clone(), card_id(&category.id, index)))
                    .collect()
            })
            .unwrap_or_default();
        Self { ids }
    }

    pub fn get(&self, username: &str) -> Option<&str> {
        self.ids.get(username).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// `{category}-card-{index}`; the private category yields `private-card-{index}`.
pub fn card_id(category_id: &str, index: usize) -> String {
    format!("{}-card-{}", category_id, index)
}

/// Logo reference without the cache-busting query.
pub fn logo_src(logo_path: &str, logo: &str) -> String {
    format!("{}{}", logo_path, logo)
}

/// Build the card node for one catalog item.
pub fn build_card(
    item: &CatalogItem,
    is_channel_category: bool,
    private_channels: &PrivateChannelMap,
    card_id: Option<&str>,
    ctx: &RenderContext<'_>,
) -> DomNode {
    let mut card = DomNode::el("div")
        .with_class(CARD_CLASS)
        .with_attr("data-title", item.title.to_lowercase())
        .with_attr("data-description", item.description.to_lowercase())
        .with_attr("data-username", item.username.to_lowercase());
    if let Some(id) = card_id {
        card.set_attr("id", id);
    }

    let header = DomNode::el("div")
        .with_class("card-header")
        .with_child(build_logo(item, ctx))
        .with_child(DomNode::el("h3").with_text(item.title.as_str()));

    let mut links = DomNode::el("div").with_class("card-links");
    if is_channel_category {
        if let Some(private) = &item.private_channel {
            let button = match private_channels.get(&private.username) {
                Some(target) => DomNode::el("a")
                    .with_attr("href", "javascript:void(0);")
                    .with_attr(PRIVATE_TARGET_ATTR, target),
                None => DomNode::el("a")
                    .with_attr("href", private.link.as_str())
                    .with_attr("target", "_blank"),
            };
            links.append_child(
                button
                    .with_class(PRIVATE_BUTTON_CLASS)
                    .with_child(lock_icon())
                    .with_child(DomNode::el("span").with_text(ctx.config.private_button_label())),
            );
        }
    }
    links.append_child(
        DomNode::el("a")
            .with_attr("href", item.link.as_str())
            .with_attr("target", "_blank")
            .with_class("main-link")
            .with_text(item.username.as_str()),
    );

    card.with_child(header)
        .with_child(DomNode::el("p").with_text(item.description.as_str()))
        .with_child(links)
}

fn build_logo(item: &CatalogItem, ctx: &RenderContext<'_>) -> DomNode {
    let logo = DomNode::el("div").with_class("card-logo");
    match non_empty(item.logo.as_deref()) {
        Some(file) => {
            let src = format!(
                "{}?t={}",
                logo_src(ctx.config.logo_path(), file),
                ctx.cache_bust
            );
            // JSON string literals are valid JS string literals.
            let placeholder = serde_json::Value::from(item.placeholder()).to_string();
            let onerror = format!(
                "this.style.display='none';this.parentNode.textContent={};",
                placeholder
            );
            logo.with_child(
                DomNode::el("img")
                    .with_attr("src", src)
                    .with_attr("alt", item.title.as_str())
                    .with_attr("onerror", onerror),
            )
        }
        None => logo.with_text(item.placeholder()),
    }
}

fn lock_icon() -> DomNode {
    DomNode::el("svg")
        .with_attr("viewBox", "0 0 24 24")
        .with_attr("xmlns", "http://www.w3.org/2000/svg")
        .with_child(DomNode::el("path").with_attr("d", LOCK_ICON_PATH))
}

/// Hide a card's logo image and show its placeholder glyph instead.
pub fn apply_logo_fallback(card: &mut DomNode, placeholder: &str) -> bool {
    let Some(logo) = card.find_first_mut(&by_class("card-logo")) else {
        return false;
    };
    let Some(img) = logo.find_first_mut(&by_tag("img")) else {
        return false;
    };
    img.set_attr("style", "display: none");
    let img = img.clone();
    logo.children = vec![img, DomNode::text(placeholder)];
    true
}

/// A rendered logo that may still fail to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoRef {
    pub card_id: String,
    pub src: String,
    pub placeholder: String,
}

#[derive(Debug, Default)]
pub struct CategoryRender {
    pub categories: usize,
    pub cards: usize,
    pub logos: Vec<LogoRef>,
}

/// Fill each category's `.link-cards` container with its cards.
///
/// Categories without a `#content{N}` container (or without `.link-cards`
/// inside it) are skipped.
pub fn render_categories(doc: &mut DomNode, ctx: &RenderContext<'_>) -> CategoryRender {
    let private_channels = PrivateChannelMap::build(ctx.config);
    let mut out = CategoryRender::default();

    for (index, category) in ctx.config.categories.iter().enumerate() {
        let container_id = content_id(index);
        let Some(cards) = doc
            .find_by_id_mut(&container_id)
            .and_then(|content| content.find_first_mut(&by_class("link-cards")))
        else {
            log::debug!("No #{} .link-cards for category {}", container_id, category.id);
            continue;
        };

        cards.children.clear();
        let is_channels = category.id == CHANNELS_CATEGORY_ID;
        for (item_index, item) in category.items.iter().enumerate() {
            let id = card_id(&category.id, item_index);
            cards.append_child(build_card(item, is_channels, &private_channels, Some(&id), ctx));
            if let Some(file) = non_empty(item.logo.as_deref()) {
                out.logos.push(LogoRef {
                    card_id: id,
                    src: logo_src(ctx.config.logo_path(), file),
                    placeholder: item.placeholder().to_string(),
                });
            }
            out.cards += 1;
        }
        out.categories += 1;
    }
    out
}
