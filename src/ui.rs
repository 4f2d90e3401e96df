use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use wordrush::{
    display::{CharClass, WordView},
    Score, SessionState,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Lines of words shown while typing
const VISIBLE_LINES: usize = 3;

struct Palette {
    bold: Style,
    correct: Style,
    incorrect: Style,
    typed: Style,
    placeholder: Style,
    cursor: Style,
}

impl Palette {
    fn new() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let placeholder = Style::default().add_modifier(Modifier::DIM);
        Self {
            bold,
            correct: Style::default().patch(bold).fg(Color::Green),
            incorrect: Style::default()
                .patch(bold)
                .fg(Color::Red)
                .add_modifier(Modifier::CROSSED_OUT),
            typed: Style::default().patch(bold),
            placeholder,
            cursor: Style::default()
                .patch(placeholder)
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    fn word<'a>(&self, view: &WordView<'a>) -> Vec<Span<'a>> {
        match view {
            WordView::Correct(w) => vec![Span::styled(*w, self.correct)],
            WordView::Incorrect(w) => vec![Span::styled(*w, self.incorrect)],
            WordView::Pending(w) => vec![Span::styled(*w, self.placeholder)],
            WordView::Current(cells) => cells
                .iter()
                .map(|cell| {
                    let style = match cell.class {
                        CharClass::Matched => self.typed,
                        CharClass::Mismatched => self.incorrect,
                        CharClass::Cursor => self.cursor,
                        CharClass::Placeholder => self.placeholder,
                    };
                    Span::styled(cell.char.to_string(), style)
                })
                .collect(),
        }
    }
}

fn view_width(view: &WordView<'_>) -> usize {
    match view {
        WordView::Correct(w) | WordView::Incorrect(w) | WordView::Pending(w) => w.width(),
        WordView::Current(cells) => cells
            .iter()
            .map(|c| c.char.to_string().width())
            .sum(),
    }
}

/// Greedy word wrap; returns the word indices on each line.
pub fn wrap_words(widths: &[usize], max_width: usize) -> Vec<Vec<usize>> {
    let mut lines: Vec<Vec<usize>> = vec![];
    let mut line: Vec<usize> = vec![];
    let mut used = 0;

    for (idx, &width) in widths.iter().enumerate() {
        let needed = if line.is_empty() { width } else { used + 1 + width };
        if !line.is_empty() && needed > max_width {
            lines.push(std::mem::take(&mut line));
            used = width;
        } else {
            used = needed;
        }
        line.push(idx);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Countdown plus the target words around the cursor
pub struct TypingView<'a> {
    session: &'a SessionState,
}

impl<'a> TypingView<'a> {
    pub fn new(session: &'a SessionState) -> Self {
        Self { session }
    }
}

impl Widget for TypingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::new();
        let session = self.session;

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1) as usize;
        let views = session.word_views();
        let widths: Vec<usize> = views.iter().map(view_width).collect();
        let lines = wrap_words(&widths, max_chars_per_line);

        let current_line = lines
            .iter()
            .position(|line| line.contains(&session.current_word_index()))
            .unwrap_or(0);
        // keep one already-typed line visible for context
        let first_line = current_line.saturating_sub(1);

        let text: Vec<Line> = lines
            .iter()
            .skip(first_line)
            .take(VISIBLE_LINES)
            .map(|line| {
                let mut spans = vec![];
                for (n, &idx) in line.iter().enumerate() {
                    if n > 0 {
                        spans.push(Span::raw(" "));
                    }
                    spans.extend(palette.word(&views[idx]));
                }
                Line::from(spans)
            })
            .collect();
        let occupied = text.len() as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(area.height.saturating_sub(occupied + 2) / 2),
                Constraint::Length(2),
                Constraint::Length(occupied),
                Constraint::Min(0),
            ])
            .split(area);

        let timer = Paragraph::new(Span::styled(
            session.time_remaining().to_string(),
            palette.bold.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Left);
        timer.render(chunks[1], buf);

        Paragraph::new(text)
            .alignment(if lines.len() == 1 {
                // a single short line reads better centered
                Alignment::Center
            } else {
                Alignment::Left
            })
            .render(chunks[2], buf);
    }
}

/// Final score summary
pub struct ResultsView<'a> {
    score: &'a Score,
}

impl<'a> ResultsView<'a> {
    pub fn new(score: &'a Score) -> Self {
        Self { score }
    }
}

impl Widget for ResultsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::new();
        let title_style = palette.bold.add_modifier(Modifier::UNDERLINED);
        let label_style = palette.placeholder;
        let score = self.score;

        let rows = [
            ("WPM", score.net_wpm.to_string()),
            ("Raw WPM", score.gross_wpm.to_string()),
            ("Accuracy", format!("{:.1}%", score.accuracy)),
            ("Correct", score.correct.to_string()),
            ("Errors", score.errors.to_string()),
        ];

        let mut lines = vec![Line::from(Span::styled("Results", title_style)), Line::raw("")];
        for (label, value) in rows {
            lines.push(Line::from(Span::styled(label, label_style)));
            lines.push(Line::from(Span::styled(value, palette.bold)));
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(
            "(r)estart / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        )));

        let height = lines.len() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(area.height.saturating_sub(height + VERTICAL_MARGIN * 2) / 2),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .render(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;
    use wordrush::{Corpus, SessionConfig, SessionEvent};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words(&[3, 3, 3], 7), vec![vec![0, 1], vec![2]]);
        assert_eq!(wrap_words(&[3, 3, 3], 100), vec![vec![0, 1, 2]]);
        assert_eq!(wrap_words(&[10], 4), vec![vec![0]]);
        assert!(wrap_words(&[], 10).is_empty());
    }

    #[test]
    fn test_typing_view_renders_words_and_timer() {
        let session =
            SessionState::with_prompt(SessionConfig::new(42).unwrap(), "hello world").unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal
            .draw(|f| f.render_widget(TypingView::new(&session), f.area()))
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("hello world"));
        assert!(content.contains("42"));
    }

    #[test]
    fn test_typing_view_follows_cursor() {
        let corpus = Corpus::new(vec!["abcdefgh"; 25]).unwrap();
        let mut session = SessionState::new(SessionConfig::new(30).unwrap(), &corpus).unwrap();
        let now = Instant::now();
        for _ in 0..15 {
            for c in "abcdefgh".chars() {
                session.apply(SessionEvent::Char(c), now, &corpus);
            }
            session.apply(SessionEvent::Space, now, &corpus);
        }
        let mut terminal = Terminal::new(TestBackend::new(30, 12)).unwrap();

        terminal
            .draw(|f| f.render_widget(TypingView::new(&session), f.area()))
            .unwrap();

        assert!(buffer_text(&terminal).contains("abcdefgh"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let session = SessionState::with_prompt(SessionConfig::new(5).unwrap(), "hi").unwrap();
        let mut terminal = Terminal::new(TestBackend::new(4, 2)).unwrap();
        terminal
            .draw(|f| f.render_widget(TypingView::new(&session), f.area()))
            .unwrap();
    }

    #[test]
    fn test_results_view_shows_score() {
        let score = Score {
            gross_wpm: 61,
            net_wpm: 57,
            accuracy: 87.5,
            correct: 14,
            errors: 2,
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal
            .draw(|f| f.render_widget(ResultsView::new(&score), f.area()))
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Results"));
        assert!(content.contains("57"));
        assert!(content.contains("61"));
        assert!(content.contains("87.5%"));
    }
}
