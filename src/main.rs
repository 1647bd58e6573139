mod app;
mod input;
mod logging;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use cybernews::api::{NewsClient, NewsService};
use cybernews::config::Config;
use cybernews::model::{next_choice, FilterConfig, FilterPatch, Priority, CATEGORY_CHOICES, DAYS_CHOICES, LIMIT_CHOICES};
use cybernews::stats::compute_statistics;
use cybernews::store::{LoadOutcome, NewsStore, UpdateReport};
use cybernews::Error;

type Store = NewsStore<NewsClient>;

#[derive(Parser, Debug)]
#[command(name = "cybernews", about = "Cybersecurity news from the aggregation backend")]
struct Args {
    /// Backend base URL (overrides CYBERNEWS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides CYBERNEWS_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Days back to fetch
    #[arg(long, global = true, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    days: u32,

    /// Category filter, empty for all
    #[arg(long, global = true, default_value = "")]
    category: String,

    /// Maximum number of articles
    #[arg(long, global = true, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
    limit: u32,

    /// Directory exports are written to
    #[arg(long, global = true, default_value = ".")]
    export_dir: PathBuf,

    /// Log level (info, debug, warn, error); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write TUI logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Load articles once and print them
    List,
    /// Ask the backend to refresh its sources, then list
    Update,
    /// Show the backend's configured sources
    Sources,
    /// Show the backend's aggregate statistics
    Stats,
    /// Load articles once and export them as JSON
    Export,
}

/// Completed background store operations, reported back to the event loop.
enum TaskResult {
    Load(LoadOutcome),
    Update(cybernews::Result<UpdateReport>),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Tui);

    if matches!(command, Command::Tui) {
        logging::init_tui(args.log_level.as_deref(), args.log_file.as_deref())?;
    } else {
        logging::init_stderr(args.log_level.as_deref());
    }

    let config = resolve_config(&args)?;
    let client = NewsClient::new(&config).context("failed to create news client")?;
    let filter = FilterConfig {
        days_back: args.days,
        category: args.category.clone(),
        limit: args.limit,
    };
    let store = Arc::new(NewsStore::with_filter(client, filter));

    match command {
        Command::Tui => {
            let mut terminal = setup_terminal()?;
            let res = run(&mut terminal, store, args.export_dir).await;
            restore_terminal(&mut terminal)?;
            res
        }
        Command::List => {
            load_or_fail(&store).await?;
            print_articles(&store).await;
            Ok(())
        }
        Command::Update => {
            let report = store.update().await.context("update failed")?;
            println!("{} ({} articles fetched)", report.summary.message, report.summary.article_count);
            if let LoadOutcome::Failed(msg) = report.load {
                bail!("reload after update failed: {msg}");
            }
            print_articles(&store).await;
            Ok(())
        }
        Command::Sources => {
            let sources = store.service().list_sources().await?;
            println!("CONFIGURED NEWS SOURCES");
            println!("{}", "=".repeat(60));
            for s in sources {
                let state = if s.enabled { "enabled" } else { "disabled" };
                println!("• {}\n  Category: {}\n  Status: {}\n  URL: {}\n", s.name, s.category, state, s.url);
            }
            Ok(())
        }
        Command::Stats => {
            let stats = store.service().fetch_statistics().await?;
            println!("NEWS STATISTICS");
            println!("{}", "=".repeat(40));
            println!("Total Articles: {}", stats.total_articles);
            println!("Active Sources: {}", stats.sources_count);
            println!("High Priority Articles: {}", stats.high_priority_count);
            if !stats.categories.is_empty() {
                println!("\nARTICLES BY CATEGORY");
                println!("{}", "-".repeat(30));
                for (category, count) in &stats.categories {
                    println!("{category}: {count}");
                }
            }
            if !stats.last_updated.is_empty() {
                println!("\nLast updated: {}", stats.last_updated);
            }
            Ok(())
        }
        Command::Export => {
            load_or_fail(&store).await?;
            match store.export_current(&args.export_dir).await {
                Ok(path) => println!("Exported to {}", path.display()),
                Err(Error::EmptyExport) => println!("{}", Error::EmptyExport),
                Err(e) => return Err(e).context("export failed"),
            }
            Ok(())
        }
    }
}

fn resolve_config(args: &Args) -> Result<Config> {
    let base = Config::from_env().context("invalid environment configuration")?;
    if args.api_url.is_none() && args.timeout_secs.is_none() {
        return Ok(base);
    }
    let url = args.api_url.clone().unwrap_or(base.base_url);
    let timeout = args.timeout_secs.unwrap_or(base.timeout.as_secs());
    Config::new(&url, timeout).context("invalid command-line configuration")
}

async fn load_or_fail(store: &Store) -> Result<()> {
    match store.load().await {
        LoadOutcome::Failed(msg) => bail!("{msg}"),
        _ => Ok(()),
    }
}

async fn print_articles(store: &Store) {
    let articles = store.articles().await;
    let filter = store.filter().await;
    println!("CYBERSECURITY NEWS - LAST {} DAY(S), category: {}", filter.days_back, filter.category_label());
    println!("{}", "=".repeat(60));

    let Some(stats) = compute_statistics(&articles) else {
        println!("No articles found.");
        return;
    };
    println!(
        "Found {} articles ({} high priority, {} medium, {} sources)\n",
        stats.total_articles, stats.high_priority_count, stats.medium_priority_count, stats.distinct_source_count
    );

    for (i, a) in articles.iter().enumerate() {
        let marker = match a.priority() {
            Priority::High => "[HIGH]",
            Priority::Medium => "[MED] ",
            Priority::Normal => "      ",
        };
        println!("{}. {} {}", i + 1, marker, a.title);
        println!("   {} • {} • #{} • score {}", a.source, a.date_line(), a.category, a.priority_score);
        if !a.keywords.is_empty() {
            println!("   Keywords: {}", a.keywords.join(", "));
        }
        println!("   {}\n", a.url);
    }
}

fn spawn_load(store: &Arc<Store>, tx: &mpsc::Sender<TaskResult>) {
    let store = store.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let out = store.load().await;
        let _ = tx.send(TaskResult::Load(out)).await;
    });
}

fn spawn_update(store: &Arc<Store>, tx: &mpsc::Sender<TaskResult>) {
    let store = store.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let out = store.update().await;
        let _ = tx.send(TaskResult::Update(out)).await;
    });
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    store: Arc<Store>,
    export_dir: PathBuf,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<TaskResult>(8);
    let mut app = App::new();

    // Initial load
    spawn_load(&store, &tx);

    loop {
        // Handle background results
        while let Ok(msg) = rx.try_recv() {
            match msg {
                TaskResult::Load(LoadOutcome::Loaded(n)) => app.notice = format!("Loaded {n} articles"),
                TaskResult::Load(LoadOutcome::Failed(_)) => app.notice = "Load failed.".to_string(),
                TaskResult::Load(LoadOutcome::Superseded) => {}
                TaskResult::Update(Ok(report)) => {
                    app.notice = format!("News updated successfully: {}", report.summary.message);
                }
                TaskResult::Update(Err(e)) => {
                    app.notice = format!("Failed to update news ({e}). Please try again.");
                }
            }
        }

        app.sync(store.snapshot().await);
        terminal.draw(|f| ui::draw(f, &app))?;

        match input::poll_action()? {
            input::Action::Quit => break,
            input::Action::Down => app.move_down(),
            input::Action::Up => app.move_up(),
            input::Action::ToggleFull => app.show_full = !app.show_full,

            input::Action::Load => {
                app.notice = "Loading…".to_string();
                spawn_load(&store, &tx);
            }

            input::Action::Update => {
                if !app.view.status.is_loading() {
                    app.notice = "Updating news from all sources…".to_string();
                    spawn_update(&store, &tx);
                }
            }

            input::Action::Export => {
                app.notice = match store.export_current(&export_dir).await {
                    Ok(path) => format!("Exported to {}", path.display()),
                    Err(e) => e.to_string(),
                };
            }

            input::Action::OpenInBrowser => {
                if let Some(a) = app.selected_article() {
                    if let Err(e) = open::that(&a.url) {
                        app.notice = format!("Could not open browser: {}", e);
                    } else {
                        app.notice = "Opened in browser.".to_string();
                    }
                }
            }

            input::Action::CycleDays => {
                let days = next_choice(&DAYS_CHOICES, &app.view.filter.days_back);
                store.set_filter(FilterPatch::days_back(days)).await;
                app.notice = format!("Days back: {days}. Press r to reload.");
            }
            input::Action::CycleCategory => {
                let current = app.view.filter.category.as_str();
                let category = next_choice(&CATEGORY_CHOICES, &current).to_string();
                let label = if category.is_empty() { "all".to_string() } else { category.clone() };
                store.set_filter(FilterPatch::category(category)).await;
                app.notice = format!("Category: {label}. Press r to reload.");
            }
            input::Action::CycleLimit => {
                let limit = next_choice(&LIMIT_CHOICES, &app.view.filter.limit);
                store.set_filter(FilterPatch::limit(limit)).await;
                app.notice = format!("Limit: {limit}. Press r to reload.");
            }

            input::Action::None => {}
        }
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
