mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use wordrush::{
    config::{Config, ConfigStore, FileConfigStore},
    language::Language,
    logging::{self, LogConfig},
    runtime::{CrosstermEventSource, Runner, SessionEnd, SessionEventSource},
    timer::Countdown,
    Corpus, Score, SessionConfig, SessionError, SessionEvent, SessionState,
};

use crate::ui::{ResultsView, TypingView};

/// timed terminal typing test
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test: type the words as they appear, press space to move on, and see your WPM and accuracy when the clock runs out."
)]
pub struct Cli {
    /// number of seconds to run test [default: saved setting, else 30]
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// embedded word list to pull words from [default: saved setting, else english]
    #[clap(short = 'l', long)]
    language: Option<String>,

    /// custom prompt to type instead of random words; the test ends after its last word
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// save the chosen duration and word list as the new defaults
    #[clap(long)]
    save_defaults: bool,

    /// append debug logs to this file (WORDRUSH_LOG=<level> logs to the state dir)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

/// Validated settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub session: SessionConfig,
    pub language: String,
    pub prompt: Option<String>,
}

impl Cli {
    /// Merge flags over saved defaults and validate before any session exists.
    fn resolve(&self, defaults: &Config) -> Result<Settings, (ErrorKind, String)> {
        let seconds = self.seconds.unwrap_or(defaults.seconds);
        let session = SessionConfig::new(seconds)
            .map_err(|err| (ErrorKind::ValueValidation, err.to_string()))?;

        let language = self
            .language
            .clone()
            .unwrap_or_else(|| defaults.language.clone());
        let available = Language::available();
        if !available.contains(&language) {
            return Err((
                ErrorKind::InvalidValue,
                format!(
                    "unknown language `{language}` (available: {})",
                    available.join(", ")
                ),
            ));
        }

        if let Some(prompt) = &self.prompt {
            if prompt.split_whitespace().next().is_none() {
                return Err((
                    ErrorKind::ValueValidation,
                    SessionError::EmptyPrompt.to_string(),
                ));
            }
        }

        Ok(Settings {
            session,
            language,
            prompt: self.prompt.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Typing,
    Results(Score),
}

#[derive(Debug)]
pub struct App {
    pub settings: Settings,
    pub corpus: Corpus,
    pub session: SessionState,
    pub state: AppState,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self, Box<dyn Error>> {
        let corpus = Corpus::try_from(Language::new(&settings.language)?)?;
        let session = new_session(&settings, &corpus)?;

        Ok(Self {
            settings,
            corpus,
            session,
            state: AppState::Typing,
        })
    }

    /// Fresh session over the same word supply.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.session = new_session(&self.settings, &self.corpus)?;
        self.state = AppState::Typing;
        Ok(())
    }
}

fn new_session(settings: &Settings, corpus: &Corpus) -> Result<SessionState, SessionError> {
    match &settings.prompt {
        Some(prompt) => SessionState::with_prompt(settings.session, prompt),
        None => SessionState::new(settings.session, corpus),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_config) = LogConfig::resolve(cli.log_file.clone()) {
        logging::init_logging(&log_config)?;
    }

    let store = FileConfigStore::new();
    let defaults = store.load();
    let settings = match cli.resolve(&defaults) {
        Ok(settings) => settings,
        Err((kind, msg)) => Cli::command().error(kind, msg).exit(),
    };

    if cli.save_defaults {
        store.save(&Config {
            seconds: settings.session.duration_secs(),
            language: settings.language.clone(),
        })?;
        tracing::info!(path = %store.path().display(), "saved defaults");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(settings)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(CrosstermEventSource::new(), Countdown::default());
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[derive(Debug, PartialEq)]
enum ExitType {
    Restart,
    Quit,
}

fn start_tui<B: Backend, E: SessionEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        let end = runner.run_session(&mut app.session, &app.corpus, |session, _event| {
            terminal.draw(|f| f.render_widget(TypingView::new(session), f.area()))?;
            Ok(())
        })?;

        let score = match end {
            SessionEnd::Cancelled => return Ok(()),
            SessionEnd::Finished(score) => score,
        };
        app.state = AppState::Results(score);

        match results_loop(terminal, app, runner)? {
            ExitType::Restart => app.reset()?,
            ExitType::Quit => return Ok(()),
        }
    }
}

fn results_loop<B: Backend, E: SessionEventSource>(
    terminal: &mut Terminal<B>,
    app: &App,
    runner: &mut Runner<E>,
) -> io::Result<ExitType> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            SessionEvent::Cancel => return Ok(ExitType::Quit),
            SessionEvent::Char('r') => return Ok(ExitType::Restart),
            SessionEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            _ => {}
        }
    }
}

fn ui(app: &App, f: &mut Frame) {
    match &app.state {
        AppState::Typing => f.render_widget(TypingView::new(&app.session), f.area()),
        AppState::Results(score) => f.render_widget(ResultsView::new(score), f.area()),
    }
}
