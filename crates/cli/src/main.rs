//! centerfind CLI — community center search from the terminal.
//!
//! Drives `centerfind-core` directly: one-shot searches, recent search history, and an
//! interactive session that feeds typed lines and navigation keys into the search bar.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use centerfind_core::decode::load_locations_file;
use centerfind_core::executor::{QueryExecutor, ResultOrigin};
use centerfind_core::rank::{mark, District};
use centerfind_core::recent::{FileStorage, RecentSearchStore};
use centerfind_core::remote::{RemoteSearch, SearchSource};
use centerfind_core::widget::{Key, MapView, Panel, SearchBar, View};
use centerfind_core::{data_dir, load_centerfind_config, Location, SearchConfig};

/// centerfind CLI — find community centers by name or address.
#[derive(Parser)]
#[command(name = "cf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding .centerfind.toml (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Search service origin, overrides `base_url` from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// JSON file with the locations used for fallback search
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Never contact the search service; answer from the dataset only
    #[arg(long, global = true)]
    offline: bool,

    /// Where recent searches are stored (default: platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search community centers by name or address
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show or clear recent searches
    Recent {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
    /// Interactive search session (type to search; :down :up :enter :esc :clear :recent N :pick N :quit)
    Interactive,
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> SearchConfig {
    let root = cli
        .root
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = load_centerfind_config(&root);
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    config
}

fn recent_store(cli: &Cli, config: &SearchConfig) -> RecentSearchStore {
    match cli.data_dir.clone().or_else(data_dir) {
        Some(dir) => RecentSearchStore::new(
            Box::new(FileStorage::new(dir)),
            config.storage_key.as_str(),
            config.max_recent_items,
        ),
        None => {
            warn!("No data directory available — recent searches last for this session only");
            RecentSearchStore::in_memory(config.max_recent_items)
        }
    }
}

async fn build_executor(cli: &Cli, config: &SearchConfig) -> QueryExecutor {
    let remote = if cli.offline {
        None
    } else {
        match RemoteSearch::new(config) {
            Ok(r) => Some(Arc::new(r)),
            Err(e) => {
                warn!(error = %e, "Could not create HTTP client — searching locally");
                None
            }
        }
    };

    let dataset: Vec<Location> = match (&cli.dataset, &remote) {
        (Some(path), _) => load_dataset_or_exit(path),
        (None, Some(remote)) => match remote.fetch_all().await {
            Ok(locations) => locations,
            Err(e) => {
                warn!(error = %e, "Could not pre-load locations — fallback search has no corpus");
                vec![]
            }
        },
        (None, None) => vec![],
    };

    QueryExecutor::new(
        remote.map(|r| r as Arc<dyn SearchSource>),
        dataset.into(),
        config.max_results,
        config.enable_fallback,
    )
}

fn load_dataset_or_exit(path: &Path) -> Vec<Location> {
    load_locations_file(path).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    })
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Could not encode output: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Terminal rendering
// ---------------------------------------------------------------------------

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Prints map movements instead of drawing them.
struct TerminalMap;

impl MapView for TerminalMap {
    fn pan_to(&mut self, lat: f64, lng: f64) {
        println!("  map → {lat:.5}, {lng:.5}");
    }

    fn set_zoom(&mut self, zoom: u8) {
        println!("  map zoom {zoom}");
    }

    fn open_info(&mut self, location: &Location) {
        println!("  ┌ {}", location.name);
        println!("  │ {}", location.address);
        if let Some(tel) = &location.tel {
            println!("  │ ☎ {tel}");
        }
        println!("  └");
    }

    fn result_selected(&mut self, location: &Location) {
        println!("  선택: {} (#{})", location.name, location.id);
    }
}

fn district_badge(district: District) -> String {
    match district {
        District::Other => String::new(),
        d => format!(" [{}]", d.label()),
    }
}

fn render(view: &View<'_>) {
    let caret = if view.focused { ">" } else { " " };
    let clear = if view.clear_button { " ×" } else { "" };
    println!("{caret} [{}]{clear}", view.input);

    if let Some(recent) = view.recent {
        println!("  최근 검색어");
        for (i, query) in recent.iter().enumerate() {
            println!("   {}. {query}", i + 1);
        }
    }

    match view.results {
        Panel::Hidden => {}
        Panel::Loading => println!("  검색 중..."),
        Panel::NoResults => println!("  검색 결과가 없습니다 — 다른 키워드로 검색해보세요"),
        Panel::Error(msg) => println!("  ⚠ {msg}"),
        Panel::Results(items) => {
            for (i, item) in items.iter().enumerate() {
                let pointer = if view.selected == Some(i) { "▶" } else { " " };
                let name = mark(&item.location.name, &item.name_marks, BOLD, RESET);
                let address = mark(&item.location.address, &item.address_marks, BOLD, RESET);
                println!(
                    "  {pointer} {}. {name}{}  {address}",
                    i + 1,
                    district_badge(item.district)
                );
            }
        }
    }
}

fn parse_index(arg: &str) -> Option<usize> {
    arg.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

async fn run_interactive(mut bar: SearchBar) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    bar.focus();
    render(&bar.view());

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Could not read input: {e}");
                break;
            }
        };

        match line.trim() {
            ":quit" | ":q" => break,
            ":down" => {
                bar.key(Key::ArrowDown);
            }
            ":up" => {
                bar.key(Key::ArrowUp);
            }
            ":enter" => {
                bar.key(Key::Enter);
            }
            ":esc" => {
                bar.key(Key::Escape);
            }
            ":clear" => bar.clear(),
            ":focus" => bar.focus(),
            ":forget" => bar.clear_recent(),
            cmd if cmd.starts_with(":recent ") => match parse_index(&cmd[":recent ".len()..]) {
                Some(i) => bar.choose_recent(i),
                None => eprintln!("usage: :recent N"),
            },
            cmd if cmd.starts_with(":pick ") => match parse_index(&cmd[":pick ".len()..]) {
                Some(i) => {
                    if bar.click_result(i).is_none() {
                        eprintln!("No result #{}", i + 1);
                    }
                }
                None => eprintln!("usage: :pick N"),
            },
            cmd if cmd.starts_with(':') => eprintln!("Unknown command: {cmd}"),
            _ => bar.on_input(&line),
        }

        bar.settle().await;
        render(&bar.view());
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "centerfind_core=warn".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli);

    match &cli.command {
        Commands::Search { query, limit } => {
            if let Some(limit) = limit {
                config.max_results = *limit;
            }
            let query = query.trim();
            if query.chars().count() < config.min_search_length.max(1) {
                eprintln!("Query must be at least {} character(s)", config.min_search_length.max(1));
                std::process::exit(1);
            }

            let executor = build_executor(&cli, &config).await;
            let mut recent = recent_store(&cli, &config);
            recent.add(query);

            let output = match executor.execute(query, &CancellationToken::new()).await {
                Ok(output) => output,
                Err(e) => {
                    eprintln!("Search failed: {e}");
                    std::process::exit(1);
                }
            };
            let origin = match output.origin {
                ResultOrigin::Remote => "remote",
                ResultOrigin::Fallback => "fallback",
            };

            if cli.json {
                print_json(&serde_json::json!({
                    "query": query,
                    "origin": origin,
                    "results": output.locations,
                }));
            } else {
                if output.locations.is_empty() {
                    eprintln!("No results for '{query}'");
                    std::process::exit(1);
                }
                for loc in &output.locations {
                    println!(
                        "{:<28} {:<6} {:<40} {}",
                        loc.name,
                        District::of(&loc.address).label(),
                        loc.address,
                        loc.tel.as_deref().unwrap_or("")
                    );
                }
                eprintln!("\n{} results ({origin})", output.locations.len());
            }
        }
        Commands::Recent { clear } => {
            let mut recent = recent_store(&cli, &config);
            if *clear {
                recent.clear();
                if !cli.json {
                    eprintln!("Recent searches cleared");
                }
            }
            if cli.json {
                print_json(&serde_json::json!(recent.entries()));
            } else if !*clear {
                if recent.is_empty() {
                    eprintln!("No recent searches");
                }
                for (i, query) in recent.entries().iter().enumerate() {
                    println!("{:>2}. {query}", i + 1);
                }
            }
        }
        Commands::Interactive => {
            let executor = build_executor(&cli, &config).await;
            let recent = recent_store(&cli, &config);
            let bar = SearchBar::new(&config, executor, recent, Box::new(TerminalMap));
            run_interactive(bar).await;
        }
    }
}
