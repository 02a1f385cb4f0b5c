mod config;
mod report;
mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::PathBuf, time::Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};
use wasteops_core::{Dashboard, Effect, FilterChoice, IssueStatus, IssueType, Role};

#[derive(Parser)]
#[command(name = "wasteops")]
#[command(about = "Waste complaint operations dashboard", long_about = None)]
struct Cli {
    /// Seed JSON with zones and issues (default: built-in data)
    #[arg(long, global = true)]
    seed: Option<PathBuf>,
    /// Initial map mode: live or prediction
    #[arg(long)]
    mode: Option<String>,
    /// Do not capture mouse events
    #[arg(long)]
    no_mouse: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the KPI counters and the filtered issue list
    List {
        #[arg(long)]
        status: Option<IssueStatus>,
        #[arg(long = "type")]
        issue_type: Option<IssueType>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Print each zone with its prediction
    Zones,
}

type ConsoleTerminal = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let overrides = config::Overrides {
        seed: cli.seed.clone(),
        mode: cli.mode.clone(),
        no_mouse: cli.no_mouse,
    };
    let config = config::load_config(&overrides)?;
    config::init_logging(&config.log_target)?;

    let registry = config::load_registry(&config)?;
    info!(
        zones = registry.zones().len(),
        issues = registry.issues().len(),
        mode = %config.mode,
        "dashboard ready"
    );
    let mut dashboard = Dashboard::new(registry).with_mode(config.mode);

    match cli.command {
        Some(Commands::List {
            status,
            issue_type,
            search,
        }) => {
            dashboard.set_status_filter(status.map_or(FilterChoice::All, FilterChoice::Only));
            dashboard.set_type_filter(issue_type.map_or(FilterChoice::All, FilterChoice::Only));
            dashboard.set_search(search.unwrap_or_default());
            print!("{}", report::issue_list(&dashboard));
        }
        Some(Commands::Zones) => {
            print!("{}", report::zone_table(dashboard.registry()));
        }
        None => run_console(dashboard, &config).await?,
    }

    Ok(())
}

async fn run_console(dashboard: Dashboard, config: &config::Config) -> Result<()> {
    let mut app = state::App::new(dashboard);
    let mut terminal = setup_terminal(config.mouse)?;
    let result = run_app(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal, config.mouse)?;
    result
}

fn setup_terminal(mouse: bool) -> Result<ConsoleTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut ConsoleTerminal, mouse: bool) -> Result<()> {
    disable_raw_mode()?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut ConsoleTerminal, app: &mut state::App) -> Result<()> {
    let mut events = EventStream::new();
    let (login_tx, mut login_rx) = mpsc::channel::<Role>(4);

    loop {
        terminal.draw(|f| ui::render(f, app))?;
        let deadline = app.dashboard.next_deadline();

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(event)) => handle_input(event, app, &login_tx),
                    Some(Err(err)) => return Err(err).context("terminal event stream failed"),
                    None => break,
                }
            }
            Some(role) = login_rx.recv() => {
                app.complete_login(role, Instant::now());
            }
            _ = sleep_until(deadline) => {
                app.on_tick(Instant::now());
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Resolves at `deadline`, or never when there is nothing scheduled.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending::<()>().await,
    }
}

fn handle_input(event: Event, app: &mut state::App, login_tx: &mpsc::Sender<Role>) {
    let now = Instant::now();
    match event {
        Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
            if let Some(effect) = app.handle_key(key, now) {
                run_effect(effect, login_tx);
            }
        }
        Event::Mouse(mouse) => app.handle_mouse(mouse, now),
        _ => {}
    }
}

fn run_effect(effect: Effect, login_tx: &mpsc::Sender<Role>) {
    match effect {
        Effect::ScheduleLogin(request) => {
            let tx = login_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(request.delay).await;
                if tx.send(request.role).await.is_err() {
                    warn!(role = %request.role, "console closed before login completed");
                }
            });
        }
        Effect::LoginRejected(err) => {
            info!(%err, "login form rejected");
        }
    }
}
