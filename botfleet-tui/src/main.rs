//! botfleet: scale a fleet of IRC bots up or down and talk through them.
//!
//! The form sets where the bots connect and how many there should be;
//! Enter (or F5) applies it. The input line sends chat to the selected
//! bots, or a command when it starts with `/`:
//!
//!   hello everyone      every selected bot says it in the channel
//!   /kick bob           every selected bot sends `KICK bob`
//!
//! Settings come from CLI flags, then `~/.config/botfleet/tui.toml`,
//! then built-in defaults.

mod app;
mod config;
mod logsink;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use botfleet_core::{FleetError, FleetService, NicknamePool, ReconcileReport};
use botfleet_sdk::IrcBotFactory;

use crate::app::{Action, App};
use crate::config::{Config, Resolved};
use crate::logsink::LogBuffer;

type Fleet = FleetService<IrcBotFactory>;
type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Parser, Debug)]
#[command(name = "botfleet", about = "Run and steer a fleet of IRC bots")]
pub struct Cli {
    /// IRC server host
    #[arg(long, env = "BOTFLEET_HOST")]
    pub host: Option<String>,

    /// IRC server port
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Initial fleet size shown in the form
    #[arg(long, short = 'n')]
    pub clients: Option<usize>,

    /// Nickname list, one candidate per line
    #[arg(long)]
    pub nicknames: Option<PathBuf>,

    /// Channel the bots join and chat into
    #[arg(long, short)]
    pub channel: Option<String>,

    /// Seed nickname draws for a reproducible fleet
    #[arg(long)]
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = LogBuffer::new();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botfleet=info".into()),
        )
        .with_writer(log.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();

    let config = Config::load();
    let settings = Resolved::merge(&cli, &config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("botfleet")
        .build()
        .context("Failed to create tokio runtime")?;

    let pool = NicknamePool::load_file(&settings.nicknames);
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let factory = IrcBotFactory::new(settings.channel.clone(), runtime.handle().clone());
    let fleet = Arc::new(FleetService::with_rng(factory, pool, rng));
    tracing::info!(
        nicknames = %settings.nicknames.display(),
        available = fleet.pool_remaining(),
        channel = %settings.channel,
        "botfleet ready"
    );

    let mut app = App::new(&settings, log);
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app, &runtime, &fleet, settings.nicknames.clone());
    restore_terminal(&mut terminal)?;

    let removed = fleet.disconnect_all();
    // Let the QUITs reach the server before the sessions are torn down.
    runtime.shutdown_timeout(Duration::from_secs(1));
    if removed > 0 {
        eprintln!("Disconnected {removed} bot(s).");
    }

    if let Err(e) = app.to_config().save() {
        eprintln!("Warning: can't save config: {e:#}");
    }
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Leave the terminal usable if we panic mid-frame.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Tui,
    app: &mut App,
    runtime: &Runtime,
    fleet: &Arc<Fleet>,
    mut pool_source: PathBuf,
) -> Result<()> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Result<ReconcileReport, FleetError>>();

    while !app.should_quit {
        while let Ok(result) = done_rx.try_recv() {
            app.connecting = false;
            report_reconcile(result);
        }
        if !app.connecting && !fleet.is_reconciling() {
            app.set_bots(fleet.names());
            app.online = fleet.online_count();
            app.pool_remaining = fleet.pool_remaining();
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let TermEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::None | Action::Quit => {}
            Action::Reconcile { request, nicknames } => {
                if nicknames != pool_source {
                    fleet.replace_pool(NicknamePool::load_file(&nicknames));
                    pool_source = nicknames;
                }
                app.connecting = true;
                let fleet = Arc::clone(fleet);
                let done_tx = done_tx.clone();
                runtime.spawn_blocking(move || {
                    let result = fleet.request_reconcile(request.target, &request.host, request.port);
                    let _ = done_tx.send(result);
                });
            }
            Action::Dispatch { selector, text } => {
                let report = fleet.request_dispatch(selector.clone(), text);
                if report.matched == 0 {
                    tracing::warn!(selector = %selector.label(), "No bot matched");
                } else {
                    tracing::debug!(
                        matched = report.matched,
                        commands = report.commands,
                        chats = report.chats,
                        "Dispatched"
                    );
                }
            }
        }
    }
    Ok(())
}

fn report_reconcile(result: Result<ReconcileReport, FleetError>) {
    match result {
        Ok(report) if report.pool_exhausted => {
            tracing::warn!(created = report.created, "Ran out of nicknames before reaching the requested size");
        }
        Ok(_) => {}
        Err(FleetError::Busy) => tracing::warn!("A reconciliation is already running"),
        Err(e) => tracing::error!("Reconcile failed: {e}"),
    }
}
