// Library surface for headless/integration tests and reuse.
// The terminal front end lives in main.rs and only talks to the core through here.
pub mod app_dirs;
pub mod config;
pub mod display;
pub mod input;
pub mod language;
pub mod logging;
pub mod runtime;
pub mod score;
pub mod session;
pub mod timer;
pub mod word_supply;

pub use input::{SessionEvent, Transition};
pub use score::Score;
pub use session::{Phase, SessionConfig, SessionError, SessionState};
pub use word_supply::{Corpus, WordSource};
