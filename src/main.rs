use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wordsprint::{
    app::App,
    app_dirs::AppDirs,
    catalog::DifficultyKey,
    corpus::Corpus,
    game::{Command, SystemEnvironment},
    host::Host,
    profile::{FileProfileStore, ProfileStore},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    ui,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// vocabulary typing trainer with timed words, stages and rewards
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type each word before its timer runs out. Clear stages by typing enough words accurately, earn stars and coins, and chase your best speed."
)]
pub struct Cli {
    /// profile name shown in the game
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// difficulty preset, overriding the stored preference
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DifficultyKey>,

    /// profile file location
    #[clap(long)]
    profile: Option<PathBuf>,

    /// JSON word list: [{"word": ..., "definition": ...}]
    #[clap(short = 'w', long)]
    words_file: Option<PathBuf>,

    /// seed for a repeatable word order
    #[clap(long)]
    seed: Option<u64>,

    /// delete the stored profile before starting
    #[clap(long)]
    reset_profile: bool,
}

fn init_logging() {
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

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let corpus = match &cli.words_file {
        Some(path) => Corpus::from_file(path)?,
        None => Corpus::builtin()?,
    };
    info!(words = corpus.len(), custom = cli.words_file.is_some(), "corpus ready");

    let store = match &cli.profile {
        Some(path) => FileProfileStore::with_path(path),
        None => FileProfileStore::new(),
    };
    if cli.reset_profile {
        if let Err(e) = store.clear() {
            warn!(error = %e, path = %store.path().display(), "could not delete profile");
        }
    }

    let mut host = Host::new(store, SystemEnvironment::new(corpus, cli.seed));
    if let Some(name) = cli.name {
        host.apply(Command::SetProfileName(name));
    }
    if let Some(key) = cli.difficulty {
        host.apply(Command::SetDifficulty(key));
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(host);
    let result = start_tui(&mut terminal, &mut app);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<FileProfileStore, SystemEnvironment>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default()).with_frames(FRAME_INTERVAL);

    let size = terminal.size()?;
    app.resize(size.width, size.height);

    loop {
        terminal.draw(|f| ui::draw(f, &app.snapshot()))?;

        let event = runner.step();
        if let GameEvent::Resize = event {
            let size = terminal.size()?;
            app.resize(size.width, size.height);
        }

        let was_armed = app.host.timer_armed();
        app.handle_event(event);
        if !was_armed && app.host.timer_armed() {
            // a fresh countdown gets a full first second
            runner.reset_tick();
        }
        runner.set_animating(app.celebration.is_active);

        if app.should_quit {
            return Ok(());
        }
    }
}
