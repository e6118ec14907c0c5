use color_eyre::Result;
use forms::ValidationMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{action::Action, components::Component, tui::Frame};

/// Single bottom line: key hints on the left, validation mode and the last
/// non-trivial action on the right.
pub struct StatusBar {
    mode: ValidationMode,
    last_action: Option<String>,
}

impl StatusBar {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            last_action: None,
        }
    }
}

impl Component for StatusBar {
    fn height_constraint(&self) -> Constraint {
        Constraint::Length(1)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Tick | Action::Render | Action::Update | Action::Resize(..) => {}
            other => self.last_action = Some(other.to_string()),
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let key = Style::default().fg(Color::White);
        let hint = Style::default().fg(Color::DarkGray);
        let left = Line::from(vec![
            Span::styled("Tab", key),
            Span::styled(": Next  ", hint),
            Span::styled("Enter", key),
            Span::styled(": Activate  ", hint),
            Span::styled("Ctrl+D", key),
            Span::styled(": Remove item  ", hint),
            Span::styled("Ctrl+S", key),
            Span::styled(": Submit  ", hint),
            Span::styled("Esc", key),
            Span::styled(": Quit", hint),
        ]);

        let mut right = vec![Span::styled(
            format!(" {} ", self.mode),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        )];
        if let Some(action) = &self.last_action {
            right.insert(0, Span::styled(format!("{action} "), hint));
        }

        f.render_widget(Paragraph::new(left), cols[0]);
        f.render_widget(
            Paragraph::new(Line::from(right)).alignment(Alignment::Right),
            cols[1],
        );
        Ok(())
    }
}
