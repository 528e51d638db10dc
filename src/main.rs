use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use catalog_page::config::ConfigSource;
use catalog_page::dom::serialize::to_html;
use catalog_page::engine::pipeline::{CatalogEngine, RenderOutcome};
use catalog_page::net::logo::{AssetProbe, LogoBase};
use catalog_page::page::session::{PageEvent, PageSession};
use catalog_page::page::search::SearchKey;

#[derive(Debug, Parser)]
#[command(name = "catalog-page", version, about = "Render a channel catalog page from a JSON config")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the catalog into the page template.
    Render {
        /// Host page carrying the tab, footer and search placeholders.
        #[arg(long)]
        template: PathBuf,
        /// Config file path or http(s) URL.
        #[arg(long)]
        config: String,
        /// Output file (stdout when omitted).
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Directory or URL to check logo assets against.
        #[arg(long)]
        logo_base: Option<String>,
        /// Fixed cache-busting stamp for logo URLs.
        #[arg(long)]
        cache_bust: Option<u64>,
    },
    /// Render, run a search query and list the visible cards per tab.
    Search {
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        config: String,
        query: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Render {
            template,
            config,
            output,
            logo_base,
            cache_bust,
        } => render(&template, &config, output.as_deref(), logo_base.as_deref(), cache_bust),
        Command::Search {
            template,
            config,
            query,
        } => search(&template, &config, &query),
    }
}

fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading template {}", path.display()))
}

fn render(
    template: &Path,
    config: &str,
    output: Option<&Path>,
    logo_base: Option<&str>,
    cache_bust: Option<u64>,
) -> Result<()> {
    let html = read_template(template)?;
    let mut engine = CatalogEngine::new();
    if let Some(base) = logo_base {
        let base = LogoBase::parse(base).with_context(|| format!("invalid logo base {}", base))?;
        engine = engine.with_logo_probe(Arc::new(AssetProbe::new(base)));
    }
    if let Some(stamp) = cache_bust {
        engine = engine.with_cache_bust(stamp);
    }

    let source = template.display().to_string();
    // A config failure still produces the static page.
    let page_html = match engine.load_page(&html, &source, &ConfigSource::parse(config)) {
        RenderOutcome::Rendered { page, .. } => to_html(&page.dom.root),
        RenderOutcome::Fallback { dom, .. } => to_html(&dom.root),
    };

    match output {
        Some(path) => std::fs::write(path, page_html)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", page_html),
    }
    Ok(())
}

fn search(template: &Path, config: &str, query: &str) -> Result<()> {
    let html = read_template(template)?;
    let source = template.display().to_string();
    let (page, config) = match CatalogEngine::new().load_page(&html, &source, &ConfigSource::parse(config)) {
        RenderOutcome::Rendered { page, config } => (page, config),
        RenderOutcome::Fallback { error, .. } => bail!("nothing to search: {}", error),
    };

    let mut session = PageSession::new(page, &config);
    session.dispatch(PageEvent::SearchEdit(query.to_string()));
    session.dispatch(PageEvent::SearchKey(SearchKey::Enter));

    for tab in session.summarize() {
        println!("{}", tab.container_id);
        if tab.no_results {
            println!("  ({})", config.no_results_label());
        }
        for title in &tab.visible_titles {
            println!("  {}", title);
        }
    }
    Ok(())
}
