use std::io;
use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    input::{SessionEvent, Transition},
    score::Score,
    session::SessionState,
    timer::Countdown,
    word_supply::WordSource,
};

/// Map a terminal key press onto a session event.
pub fn map_key(key: KeyEvent) -> Option<SessionEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Esc => Some(SessionEvent::Cancel),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(SessionEvent::Cancel)
        }
        KeyCode::Backspace => Some(SessionEvent::Backspace),
        KeyCode::Char(' ') => Some(SessionEvent::Space),
        KeyCode::Char(c)
            if !c.is_control()
                && !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(SessionEvent::Char(c))
        }
        _ => None,
    }
}

/// Source of session events (keyboard, resize, etc.)
pub trait SessionEventSource: Send + 'static {
    /// Block until an event arrives.
    fn recv(&self) -> Result<SessionEvent, RecvError>;

    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<SessionEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => map_key(key),
                Ok(CtEvent::Resize(_, _)) => Some(SessionEvent::Resize),
                Ok(_) => None,
                Err(err) => {
                    tracing::warn!(%err, "terminal event stream closed");
                    break;
                }
            };

            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEventSource for CrosstermEventSource {
    fn recv(&self) -> Result<SessionEvent, RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source fed from a channel
pub struct TestEventSource {
    rx: Receiver<SessionEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl SessionEventSource for TestEventSource {
    fn recv(&self) -> Result<SessionEvent, RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// How a driven session ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEnd {
    Finished(Score),
    Cancelled,
}

/// Merges input events and countdown ticks into one ordered stream
pub struct Runner<E: SessionEventSource> {
    event_source: E,
    countdown: Countdown,
}

impl<E: SessionEventSource> Runner<E> {
    pub fn new(event_source: E, countdown: Countdown) -> Self {
        Self {
            event_source,
            countdown,
        }
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Blocks until the next event or due tick. A closed input source
    /// reads as Cancel.
    pub fn step(&mut self) -> SessionEvent {
        if self.countdown.fire(Instant::now()) {
            return SessionEvent::Tick;
        }

        match self.countdown.until_next(Instant::now()) {
            Some(wait) => match self.event_source.recv_timeout(wait) {
                Ok(ev) => ev,
                Err(RecvTimeoutError::Timeout) => {
                    self.countdown.advance();
                    SessionEvent::Tick
                }
                Err(RecvTimeoutError::Disconnected) => SessionEvent::Cancel,
            },
            None => self.event_source.recv().unwrap_or(SessionEvent::Cancel),
        }
    }

    /// Arm or disarm the countdown in response to a session transition.
    pub fn observe(&mut self, transition: Transition, now: Instant) {
        match transition {
            Transition::Started => self.countdown.arm(now),
            Transition::Finished | Transition::Cancelled => self.countdown.disarm(),
            Transition::Unchanged | Transition::Changed => {}
        }
    }

    /// Drive `session` until it finishes or is cancelled, calling `on_change`
    /// after every event so the caller can redraw.
    pub fn run_session<F>(
        &mut self,
        session: &mut SessionState,
        supply: &dyn WordSource,
        mut on_change: F,
    ) -> io::Result<SessionEnd>
    where
        F: FnMut(&SessionState, SessionEvent) -> io::Result<()>,
    {
        self.countdown.disarm();

        loop {
            let event = self.step();
            let now = Instant::now();
            let transition = session.apply(event, now, supply);
            self.observe(transition, now);

            if transition != Transition::Unchanged || event == SessionEvent::Resize {
                on_change(session, event)?;
            }

            match transition {
                Transition::Cancelled => return Ok(SessionEnd::Cancelled),
                Transition::Finished => {
                    let score = Score::from_session(session).ok_or_else(|| {
                        io::Error::other("finished session has no start timestamp")
                    })?;
                    tracing::info!(
                        gross_wpm = score.gross_wpm,
                        net_wpm = score.net_wpm,
                        accuracy = score.accuracy,
                        "session scored"
                    );
                    return Ok(SessionEnd::Finished(score));
                }
                Transition::Unchanged | Transition::Changed | Transition::Started => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::word_supply::Corpus;
    use assert_matches::assert_matches;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn map_key_covers_control_events() {
        assert_eq!(
            map_key(key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(SessionEvent::Cancel)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(SessionEvent::Cancel)
        );
        assert_eq!(
            map_key(key(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(SessionEvent::Backspace)
        );
        assert_eq!(
            map_key(key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(SessionEvent::Space)
        );
    }

    #[test]
    fn map_key_passes_printable_chars() {
        assert_eq!(
            map_key(key(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(SessionEvent::Char('a'))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(SessionEvent::Char('A'))
        );
    }

    #[test]
    fn map_key_ignores_other_keys() {
        assert_eq!(map_key(key(KeyCode::Enter, KeyModifiers::NONE)), None);
        assert_eq!(map_key(key(KeyCode::Left, KeyModifiers::NONE)), None);
        assert_eq!(map_key(key(KeyCode::Char('x'), KeyModifiers::ALT)), None);

        let mut release = key(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), None);
    }

    #[test]
    fn step_returns_tick_when_armed_and_idle() {
        let (_tx, rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(1));
        countdown.arm(Instant::now());
        let mut runner = Runner::new(TestEventSource::new(rx), countdown);

        assert_eq!(runner.step(), SessionEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(SessionEvent::Resize).unwrap();
        let mut runner = Runner::new(
            TestEventSource::new(rx),
            Countdown::new(Duration::from_millis(10)),
        );

        assert_eq!(runner.step(), SessionEvent::Resize);
    }

    #[test]
    fn step_reads_disconnect_as_cancel() {
        let (tx, rx) = mpsc::channel::<SessionEvent>();
        drop(tx);
        let mut runner = Runner::new(TestEventSource::new(rx), Countdown::default());

        assert_eq!(runner.step(), SessionEvent::Cancel);
    }

    #[test]
    fn observe_arms_on_start_and_disarms_on_finish() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(TestEventSource::new(rx), Countdown::default());
        let now = Instant::now();

        runner.observe(Transition::Started, now);
        assert!(runner.countdown().is_armed());
        runner.observe(Transition::Changed, now);
        assert!(runner.countdown().is_armed());
        runner.observe(Transition::Finished, now);
        assert!(!runner.countdown().is_armed());
    }

    #[test]
    fn run_session_cancels_without_score() {
        let (tx, rx) = mpsc::channel();
        tx.send(SessionEvent::Char('a')).unwrap();
        tx.send(SessionEvent::Cancel).unwrap();
        let corpus = Corpus::new(["abc"]).unwrap();
        let mut session = SessionState::new(SessionConfig::new(30).unwrap(), &corpus).unwrap();
        let mut runner = Runner::new(TestEventSource::new(rx), Countdown::default());

        let end = runner
            .run_session(&mut session, &corpus, |_, _| Ok(()))
            .unwrap();

        assert_matches!(end, SessionEnd::Cancelled);
        assert!(!session.has_finished());
    }

    #[test]
    fn run_session_reports_changes() {
        let (tx, rx) = mpsc::channel();
        for ev in [
            SessionEvent::Space, // starts the session, no-op otherwise
            SessionEvent::Char('h'),
            SessionEvent::Char('i'),
            SessionEvent::Space,
        ] {
            tx.send(ev).unwrap();
        }
        let corpus = Corpus::new(["unused"]).unwrap();
        let mut session = SessionState::with_prompt(SessionConfig::new(30).unwrap(), "hi").unwrap();
        let mut runner = Runner::new(TestEventSource::new(rx), Countdown::default());
        let mut seen = Vec::new();

        let end = runner
            .run_session(&mut session, &corpus, |_, ev| {
                seen.push(ev);
                Ok(())
            })
            .unwrap();

        assert_matches!(end, SessionEnd::Finished(score) if score.correct == 1);
        assert_eq!(seen.len(), 4);
        assert!(!runner.countdown().is_armed());
    }
}
