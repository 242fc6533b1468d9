use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::cell::Cell;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use storenav::camera::VirtualCamera;
use storenav::i18n::{Language, LanguageObserver, LanguageTable};
use storenav::scene::Scene;
use storenav::session::Session;
use storenav::state::ViewState;
use storenav::view::Hud;
use storenav::widget::{KeyOutcome, StoreWidget, TerminalSession};
use storenav::{Error, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Initial display language
    #[arg(long, default_value = "en", value_parser = ["en", "nl"])]
    lang: String,

    /// Target frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Start with the debug overlay enabled
    #[arg(long)]
    debug: bool,

    /// Write logs to this file (logs are discarded otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Load translations from a JSON file instead of the bundled table
    #[arg(long)]
    translations: Option<PathBuf>,

    /// Delay before the virtual camera grants access
    #[arg(long, default_value_t = 1000)]
    permission_delay_ms: u64,
}

/// Restores the terminal when dropped
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut impl Write) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = execute!(out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Sends logs to `path`; without a path nothing is installed and events are dropped
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storenav=info"));
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Initial terminal size, falling back to a classic 80x24
fn terminal_size() -> (usize, usize) {
    termsize::get()
        .map(|size| (size.cols as usize, size.rows as usize))
        .unwrap_or((80, 24))
}

fn run(args: Args) -> Result<()> {
    let table = match &args.translations {
        Some(path) => LanguageTable::from_file(path)?,
        None => LanguageTable::bundled()?,
    };
    let language = Language::from_code(&args.lang).unwrap_or(Language::En);
    let camera = VirtualCamera::new(args.permission_delay_ms as f64 / 1000.0);
    let mut session: TerminalSession =
        Session::new(Scene::new(), Hud::new(), camera, table, language);

    // Text is re-bound on the frame after a language change
    let retranslate = Rc::new(Cell::new(true));
    let flag = retranslate.clone();
    let observer: LanguageObserver = Rc::new(move |language: Language| {
        debug!(%language, "re-binding interface text");
        flag.set(true);
    });
    session.language_mut().add_observer(observer);

    let (width, height) = terminal_size();
    let mut widget = StoreWidget::new(width, height);
    let mut state = ViewState::new(args.debug);
    let frame_interval = Duration::from_secs_f64(1.0 / args.fps as f64);

    let mut out = io::stdout();
    let _guard = TerminalGuard::enter(&mut out)?;
    info!(width, height, fps = args.fps, %language, "session started");

    let mut last_frame = Instant::now();
    loop {
        if event::poll(frame_interval)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let phase = session.phase();
                    match widget.handle_key(key, phase, &mut state, session.camera_mut()) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Action(action) => {
                            session.dispatch(action);
                        }
                        KeyOutcome::Handled | KeyOutcome::Ignored => {}
                    }
                }
                Event::Resize(width, height) => widget.resize(width as usize, height as usize),
                _ => {}
            }
        }

        let now = Instant::now();
        state.advance(now.duration_since(last_frame));
        last_frame = now;

        session.frame(state.elapsed);
        if retranslate.replace(false) {
            let (hud, language) = session.view_with_language();
            hud.retranslate(language);
        }

        let canvas = widget.paint(&session, &state);
        widget.present(&canvas, &mut out)?;
    }

    info!(elapsed = state.elapsed, "session ended");
    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    run(args)
}
