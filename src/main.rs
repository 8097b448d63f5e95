use castlist::config::ListConfig;
use castlist::output;
use castlist::query::{self, ListState};
use castlist::session::{Effect, ListSession, drive};
use castlist::slug;
use castlist::source::StaticCatalog;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "castlist")]
#[command(about = "Inspect and exercise character-list URL state")]
#[command(long_about = "\
Inspect and exercise character-list URL state

The engine keeps each list section's pagination, page size, search query,
and filters in the URL query string, namespaced per section:

  ?discover_page=3&discover_pageSize=24&discover_category=science

Detail views deep-link by id with a cosmetic slug:

  /dashboard/discover/42/steve-jobs

This tool decodes and encodes those URLs, slugifies names, validates
engine config, and simulates full browsing sessions against a JSON
catalog fixture:

  castlist decode --section discover '?discover_page=3'
  castlist encode --section discover --page 3 --filter category=science
  castlist slug 'Tom & Jerry'
  castlist browse cast.json --query '?discover_page=2' --search holmes")]
#[command(version = version_string())]
struct Cli {
    /// Engine config file (castlist.toml); defaults apply if absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a query string into a section's navigation state
    Decode {
        /// Section namespace; empty for the global (unnamespaced) list
        #[arg(long, default_value = "")]
        section: String,
        /// Query string, with or without the leading '?'
        query: String,
    },
    /// Encode navigation state into a query string
    Encode {
        #[arg(long, default_value = "")]
        section: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        /// Search query
        #[arg(long, default_value = "")]
        q: String,
        /// Filter as name=value; repeatable
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
        /// Existing query string to merge into (foreign keys preserved)
        #[arg(long, default_value = "")]
        into: String,
    },
    /// Slugify a character name
    Slug { name: String },
    /// Best-effort display name for a slug
    Unslug { slug: String },
    /// Validate a castlist.toml config file
    CheckConfig { path: PathBuf },
    /// Print a stock castlist.toml with all options documented
    GenConfig,
    /// Simulate a browsing session against a JSON catalog file
    Browse {
        /// JSON array of character summaries
        catalog: PathBuf,
        #[arg(long, default_value = "discover")]
        section: String,
        #[arg(long, default_value = "/dashboard/discover")]
        base_path: String,
        /// Initial query string (what the shared/reloaded URL carried)
        #[arg(long, default_value = "")]
        query: String,
        /// Initial path; defaults to the base path (list view). A
        /// `/{id}/{slug}` suffix opens a deep-linked detail view.
        #[arg(long)]
        path: Option<String>,
        /// Flip to this page after mounting
        #[arg(long)]
        page: Option<u32>,
        /// Submit this search after mounting
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ListConfig::load(path)?,
        None => ListConfig::default(),
    };

    match cli.command {
        Command::Decode { section, query } => {
            let state = query::decode(&section, &query, &config);
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Encode {
            section,
            page,
            page_size,
            q,
            filters,
            into,
        } => {
            let mut state = ListState::with_defaults(&config);
            state.page = page.max(1);
            state.page_size = config.sanitize_page_size(page_size.unwrap_or(config.default_page_size));
            state.query = q.trim().to_string();
            state.filters = filters.into_iter().collect();
            let encoded = query::write_query(&section, &state, &config, &into);
            println!("?{encoded}");
        }
        Command::Slug { name } => println!("{}", slug::to_slug(&name)),
        Command::Unslug { slug } => println!("{}", slug::from_slug(&slug)),
        Command::CheckConfig { path } => {
            let content = fs::read_to_string(&path)?;
            let config = ListConfig::from_toml(&content)?;
            println!(
                "OK: page sizes {:?}, default {}",
                config.page_sizes, config.default_page_size
            );
        }
        Command::GenConfig => print!("{}", ListConfig::stock_toml()),
        Command::Browse {
            catalog,
            section,
            base_path,
            query,
            path,
            page,
            search,
        } => {
            let content = fs::read_to_string(&catalog)?;
            let catalog = StaticCatalog::from_json(&content)?;
            let mut session = ListSession::new(&section, &base_path, "characters", config);

            let path = path.unwrap_or_else(|| base_path.clone());
            let effects = session.url_changed(&query, &path);
            let mut terminal = drive(&mut session, &catalog, effects);
            if let Some(page) = page {
                let effects = session.change_page(page);
                terminal.extend(drive(&mut session, &catalog, effects));
            }
            if let Some(search) = search {
                let effects = session.submit_search(&search);
                terminal.extend(drive(&mut session, &catalog, effects));
            }

            for effect in &terminal {
                match effect {
                    Effect::ReplaceQuery(q) => println!("url query → ?{q}"),
                    Effect::ReplacePath(p) => println!("url path → {p}"),
                    Effect::Navigate(p) => println!("navigate → {p}"),
                    Effect::ScrollToTop => println!("scroll → top"),
                    _ => {}
                }
            }
            println!();
            println!(
                "{}",
                output::format_header(&section, session.state(), session.listing())
            );
            output::print_lines(&output::format_listing(session.state(), session.listing()));
            if let Some(detail) = session.detail() {
                println!();
                println!("Detail");
                output::print_lines(&output::format_detail(detail));
            }
            if let Some(error) = session.error() {
                println!();
                println!("Error: {error}");
            }
        }
    }
    Ok(())
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got {s:?}"))
}
