use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{load_config, Config, ConfigError, ConfigSource};
use crate::dom::parser::parse_html;
use crate::dom::{DomNode, DomTree};
use crate::net::logo::{failed_logos, LogoProbe};
use crate::page::back_to_top::init_back_to_top;
use crate::page::binder::{bind_category_labels, bind_texts};
use crate::page::card::{apply_logo_fallback, render_categories, LogoRef};
use crate::page::contacts::{render_contacts, render_external_links};
use crate::page::{tab_control_id, RenderContext};

/// Counters from one render pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderStats {
    pub text_regions: usize,
    pub contacts: usize,
    pub external_links: usize,
    pub tab_labels: usize,
    pub categories: usize,
    pub cards: usize,
    pub logo_fallbacks: usize,
}

/// A template with the catalog rendered into it
pub struct RenderedPage {
    pub dom: DomTree,
    /// Id of the radio control that selects the private-channels tab.
    pub private_tab: Option<String>,
    pub stats: RenderStats,
}

pub enum RenderOutcome {
    Rendered { page: RenderedPage, config: Config },
    /// Config could not be loaded; the template is left as it was.
    Fallback { dom: DomTree, error: ConfigError },
}

/// The render pipeline: Load config → Parse → Bind → Cards → Logo probe
pub struct CatalogEngine {
    logo_probe: Option<Arc<dyn LogoProbe>>,
    cache_bust: Option<u64>,
}

impl CatalogEngine {
    pub fn new() -> Self {
        Self {
            logo_probe: None,
            cache_bust: None,
        }
    }

    /// Probe logo assets and fall back to placeholders for broken ones.
    pub fn with_logo_probe(mut self, probe: Arc<dyn LogoProbe>) -> Self {
        self.logo_probe = Some(probe);
        self
    }

    /// Fix the `?t=` stamp on logo URLs instead of using the current time.
    pub fn with_cache_bust(mut self, stamp: u64) -> Self {
        self.cache_bust = Some(stamp);
        self
    }

    /// Load the config once and render it into the template.
    ///
    /// A config that cannot be loaded is logged and the template is returned
    /// unrendered.
    pub fn load_page(
        &self,
        template_html: &str,
        template_source: &str,
        config_source: &ConfigSource,
    ) -> RenderOutcome {
        match load_config(config_source) {
            Ok(config) => {
                let page = self.render(template_html, template_source, &config);
                RenderOutcome::Rendered { page, config }
            }
            Err(error) => {
                log::error!("Error loading configuration from {}: {}", config_source, error);
                RenderOutcome::Fallback {
                    dom: parse_html(template_html, template_source),
                    error,
                }
            }
        }
    }

    /// Render an already loaded config into the template.
    pub fn render(&self, template_html: &str, template_source: &str, config: &Config) -> RenderedPage {
        // Phase 1: Parse
        let mut dom = parse_html(template_html, template_source);
        let doc = &mut dom.root;
        let mut stats = RenderStats::default();

        // Phase 2: Page texts
        stats.text_regions = bind_texts(doc, config);

        // Phase 3: Footer contacts and links
        stats.contacts = render_contacts(doc, config);
        if let Some(links) = &config.external_links {
            if render_external_links(doc, links) {
                stats.external_links = links.len();
            }
        }

        // Phase 4: Tab labels and cards
        stats.tab_labels = bind_category_labels(doc, config);
        let ctx = RenderContext {
            config,
            cache_bust: self.cache_bust.unwrap_or_else(now_millis),
        };
        let rendered = render_categories(doc, &ctx);
        stats.categories = rendered.categories;
        stats.cards = rendered.cards;

        // Phase 5: Logo probe
        if let Some(probe) = &self.logo_probe {
            stats.logo_fallbacks = apply_logo_fallbacks(doc, probe.as_ref(), &rendered.logos);
        }

        init_back_to_top(doc, config);

        log::info!(
            "Rendered {} categories, {} cards ({} logo fallbacks)",
            stats.categories,
            stats.cards,
            stats.logo_fallbacks
        );

        RenderedPage {
            dom,
            private_tab: config.private_category_index().map(tab_control_id),
            stats,
        }
    }
}

impl Default for CatalogEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_logo_fallbacks(
    doc: &mut DomNode,
    probe: &dyn LogoProbe,
    logos: &[LogoRef],
) -> usize {
    let srcs: Vec<String> = logos.iter().map(|l| l.src.clone()).collect();
    let failed = failed_logos(probe, &srcs);
    let mut applied = 0;
    for logo in logos.iter().filter(|l| failed.contains(&l.src)) {
        if let Some(card) = doc.find_by_id_mut(&logo.card_id) {
            if apply_logo_fallback(card, &logo.placeholder) {
                applied += 1;
            }
        }
    }
    applied
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::serialize::to_html;
    use crate::dom::{by_class, by_tag};
    use crate::net::logo::LogoError;
    use crate::page::fixtures;
    use std::path::PathBuf;

    #[test]
    fn tab_labels_match_categories() {
        let config = fixtures::config();
        let page = CatalogEngine::new().render(fixtures::TEMPLATE, "index.html", &config);
        let labels: Vec<String> = page
            .dom
            .root
            .find_all(&by_class("tab-label"))
            .iter()
            .map(|l| l.text_content())
            .collect();
        let names: Vec<String> = config.categories.iter().map(|c| c.name.clone()).collect();
        assert_eq!(labels, names);
        assert_eq!(page.stats.tab_labels, 4);
        assert_eq!(page.stats.cards, 6);
        assert_eq!(page.stats.contacts, 3);
        assert_eq!(page.stats.external_links, 2);
        assert_eq!(page.private_tab.as_deref(), Some("tab4"));
    }

    #[test]
    fn cache_bust_defaults_to_current_time() {
        let config = fixtures::config();
        let page = CatalogEngine::new().render(fixtures::TEMPLATE, "index.html", &config);
        let img = page.dom.root.find_first(&by_tag("img")).unwrap();
        let src = img.attr("src").unwrap();
        let stamp: u64 = src.split("?t=").nth(1).unwrap().parse().unwrap();
        assert!(stamp > 1_600_000_000_000);
    }

    #[test]
    fn failed_logo_gets_placeholder() {
        let config = fixtures::config();
        let probe = |src: &str| -> Result<(), LogoError> {
            if src == "logo/newsworld.png" {
                Err(LogoError::Io {
                    path: PathBuf::from(src),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            } else {
                Ok(())
            }
        };
        let page = CatalogEngine::new()
            .with_cache_bust(5)
            .with_logo_probe(Arc::new(probe))
            .render(fixtures::TEMPLATE, "index.html", &config);
        assert_eq!(page.stats.logo_fallbacks, 1);

        let broken = page.dom.root.find_by_id("channels-card-2").unwrap();
        let logo = broken.find_first(&by_class("card-logo")).unwrap();
        assert_eq!(logo.text_content(), "WR");
        assert!(!logo.find_first(&by_tag("img")).unwrap().is_displayed());

        let fine = page.dom.root.find_by_id("channels-card-0").unwrap();
        let logo = fine.find_first(&by_class("card-logo")).unwrap();
        assert_eq!(logo.text_content(), "");
        assert!(logo.find_first(&by_tag("img")).unwrap().is_displayed());
    }

    #[test]
    fn config_failure_leaves_template_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let outcome = CatalogEngine::new().load_page(
            fixtures::TEMPLATE,
            "index.html",
            &ConfigSource::File(path),
        );
        let RenderOutcome::Fallback { dom, error } = outcome else {
            panic!("malformed config must not render");
        };
        assert!(matches!(error, ConfigError::Parse(_)));
        assert_eq!(to_html(&dom.root), to_html(&fixtures::template().root));
    }

    #[test]
    fn load_page_renders_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, fixtures::CONFIG).unwrap();

        let outcome = CatalogEngine::new()
            .with_cache_bust(1)
            .load_page(fixtures::TEMPLATE, "index.html", &ConfigSource::File(path));
        let RenderOutcome::Rendered { page, config } = outcome else {
            panic!("fixture config must render");
        };
        assert_eq!(config.categories.len(), 4);
        assert_eq!(page.dom.title(), "Telegram Directory");
    }
}
