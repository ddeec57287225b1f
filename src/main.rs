use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Mutex,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use reflex::{
    app::{App, Settings},
    app_dirs::AppDirs,
    auth::{Identity, IdentityProvider, LocalIdentityProvider, OfflineIdentityProvider},
    clock::MonotonicClock,
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::DifficultyTier,
    runtime::{CrosstermEventSource, FixedTicker, ReflexEvent, Runner},
    store::ReflexDb,
    ui,
};

const TICK_RATE_MS: u64 = 100;

/// reaction-time aim trainer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction-time aim trainer: click ten targets as fast as you can, get a grade, and climb the per-difficulty leaderboard."
)]
pub struct Cli {
    /// target size to play with (defaults to the last one used)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DifficultyTier>,

    /// seed target placement and delays for reproducible sessions
    #[clap(long)]
    seed: Option<u64>,

    /// results database to use instead of the one in the state directory
    #[clap(long)]
    db: Option<PathBuf>,

    /// play without saving results
    #[clap(long)]
    no_save: bool,

    /// log filter such as "debug" or "reflex=trace" (defaults to RUST_LOG, then info)
    #[clap(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Merge CLI overrides onto the stored configuration
    fn to_settings(&self, cfg: &Config) -> Settings {
        let mut settings = Settings::from(cfg);
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        settings.seed = self.seed;
        settings.save_results = cfg.save_results && !self.no_save;
        settings
    }

    /// Session file sits next to an explicit database so separate databases
    /// keep separate sign-ins
    fn session_path(&self) -> Option<PathBuf> {
        match &self.db {
            Some(db) => Some(
                db.parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join("session.json"),
            ),
            None => AppDirs::session_path(),
        }
    }
}

fn init_logging(level: Option<&str>) {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn open_services(
    cli: &Cli,
    settings: &Settings,
) -> (Option<Rc<ReflexDb>>, Box<dyn IdentityProvider>) {
    let opened = match &cli.db {
        Some(path) => ReflexDb::open(path),
        None => ReflexDb::open_default(),
    };
    let db = match opened {
        Ok(db) => Rc::new(db),
        Err(e) => {
            tracing::error!("Results database unavailable, playing offline: {}", e);
            return (None, Box::new(OfflineIdentityProvider));
        }
    };

    let session_path = if settings.remember_session {
        cli.session_path()
    } else {
        None
    };
    let mut auth = LocalIdentityProvider::new(Rc::clone(&db), session_path);
    auth.on_session_change(Box::new(|who: Option<&Identity>| match who {
        Some(who) => tracing::info!(user = %who.username, "session changed"),
        None => tracing::info!("session cleared"),
    }));
    (Some(db), Box::new(auth))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_level.as_deref());
    tracing::info!("starting reflex {}", env!("CARGO_PKG_VERSION"));

    let config_store = FileConfigStore::new();
    let config = config_store.load();
    let settings = cli.to_settings(&config);
    let (db, auth) = open_services(&cli, &settings);
    let mut app = App::new(settings, Box::new(MonotonicClock::new()), db, auth);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    // --no-save is a per-run override and is not remembered
    let mut to_store = app.config();
    to_store.save_results = config.save_results;
    if let Err(e) = config_store.save(&to_store) {
        tracing::warn!("Failed to save config: {}", e);
    }
    tracing::info!("exiting");

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let size = terminal.size()?;
    app.set_terminal_size(size.width, size.height);

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        // Input is handled before due timers, so a click racing a target
        // deadline counts against the waiting phase.
        match runner.step_within(app.next_timer_in()) {
            ReflexEvent::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
            ReflexEvent::Mouse(mouse) => app.on_mouse(mouse),
            ReflexEvent::Resize(width, height) => app.set_terminal_size(width, height),
            ReflexEvent::Tick => {}
        }
        app.on_timers();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
