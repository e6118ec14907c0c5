use color_eyre::Result;
use forms::{FieldBinding, FieldPath, FieldStatus, SubmitStatus, UserRecord, record::ITEMS};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::tui::Frame;

use super::{Focus, UserForm};

const SCALAR_LABELS: [(&str, &str); 3] = [
    ("Name", "Enter name"),
    ("Last name", "Enter last name"),
    ("Age", "Enter age"),
];
const ITEM_PLACEHOLDER: &str = "Enter item title";
const INVALID_MARKER: &str = " !";
const REMOVE_CONTROL: &str = "  [×]";
const SUBMISSION_MAX_HEIGHT: u16 = 12;

/// Layout facts gathered while drawing, for tests and cursor handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRenderMetrics {
    pub total_lines: usize,
    pub focused_line: Option<usize>,
    pub scroll: u16,
    pub cursor: Option<(u16, u16)>,
    pub thumb_y: Option<usize>,
}

/// Vertical thumb position for a scroll indicator, `None` when everything fits.
pub fn compute_scrollbar_thumb(
    total: usize,
    visible: usize,
    scroll: usize,
    track_height: u16,
) -> Option<usize> {
    if track_height == 0 || visible == 0 || total <= visible {
        return None;
    }

    let max_thumb_y = track_height.saturating_sub(1) as usize;
    let denom = total.saturating_sub(visible).max(1);
    let ratio = (scroll as f32) / (denom as f32);
    let thumb_y = (ratio * (max_thumb_y as f32)).round() as usize;
    Some(thumb_y.min(max_thumb_y))
}

/// Where the text cursor goes inside a rendered input line.
struct CursorAnchor {
    line: usize,
    column: u16,
}

fn value_style(focused: bool, status: FieldStatus) -> Style {
    match (focused, status) {
        (true, _) => Style::default().fg(Color::Black).bg(Color::White),
        (false, FieldStatus::Invalid) => Style::default().fg(Color::Red),
        (false, _) => Style::default().fg(Color::Cyan),
    }
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(Span::styled(format!("[ {label} ]"), style))
}

/// One input line: prefix, value or placeholder, invalid marker, trailing
/// spans. Returns the line and the column where the value starts.
fn input_line(
    binding: &FieldBinding<'_>,
    prefix: String,
    placeholder: &str,
    focused: bool,
    trailing: Option<Span<'static>>,
) -> (Line<'static>, u16) {
    let value = binding.value;
    let status = binding.status();

    let prefix = Span::raw(prefix);
    let column = prefix.width() as u16;
    let mut spans = vec![prefix];
    if value.is_empty() && !focused {
        spans.push(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(value.to_string(), value_style(focused, status)));
    }
    if binding.is_invalid() {
        spans.push(Span::styled(INVALID_MARKER, Style::default().fg(Color::Red).bold()));
    }
    spans.extend(trailing);
    (Line::from(spans), column)
}

fn error_line(indent: &str, message: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("{indent}{message}"),
        Style::default().fg(Color::Red),
    ))
}

fn focus_prefix(focused: bool) -> &'static str {
    if focused { "› " } else { "  " }
}

/// Build every line of the form, remembering where the focused input sits.
fn build_lines(form_view: &UserForm) -> (Vec<Line<'static>>, Option<CursorAnchor>, Option<usize>) {
    let form = form_view.form();
    let focus = form_view.focused();
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut anchor = None;
    let mut focused_line = None;

    for (key, (label, placeholder)) in UserRecord::SCALAR_FIELDS.iter().zip(SCALAR_LABELS) {
        let path = FieldPath::key(*key);
        let Some(binding) = form.binding(&path) else {
            continue;
        };
        let focused = focus == Focus::Field(path);

        lines.push(Line::from(Span::styled(
            format!("{label}:"),
            Style::default().fg(Color::White).add_modifier(if focused {
                Modifier::BOLD
            } else {
                Modifier::empty()
            }),
        )));

        let (line, column) = input_line(
            &binding,
            focus_prefix(focused).to_string(),
            placeholder,
            focused,
            None,
        );
        if focused {
            focused_line = Some(lines.len());
            anchor = Some(CursorAnchor {
                line: lines.len(),
                column,
            });
        }
        lines.push(line);
        lines.extend(binding.error.map(|message| error_line("  ", message)));
        lines.push(Line::raw(""));
    }

    // Items fieldset
    let items = form.items();
    lines.push(Line::from(vec![
        Span::styled("Items", Style::default().fg(Color::White).bold()),
        Span::styled(format!(" ({})", items.len()), Style::default().fg(Color::DarkGray)),
    ]));
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            "  no items yet",
            Style::default().fg(Color::DarkGray).italic(),
        )));
    }
    for index in 0..items.len() {
        let path = FieldPath::item(ITEMS, index, "title");
        let Some(binding) = form.binding(&path) else {
            continue;
        };
        let focused = focus == Focus::Field(path);
        let (line, column) = input_line(
            &binding,
            format!("{}{}. ", focus_prefix(focused), index + 1),
            ITEM_PLACEHOLDER,
            focused,
            Some(Span::styled(REMOVE_CONTROL, Style::default().fg(Color::DarkGray))),
        );
        if focused {
            focused_line = Some(lines.len());
            anchor = Some(CursorAnchor {
                line: lines.len(),
                column,
            });
        }
        lines.push(line);
        lines.extend(
            form.errors()
                .for_list_item(ITEMS, index)
                .map(|(_, message)| error_line("     ", message)),
        );
    }

    if focus == Focus::AddItem {
        focused_line = Some(lines.len());
    }
    let mut add_item = button_line("Add Item", focus == Focus::AddItem);
    add_item.spans.insert(0, Span::raw("  "));
    lines.push(add_item);
    lines.push(Line::raw(""));

    if focus == Focus::Submit {
        focused_line = Some(lines.len());
    }
    lines.push(button_line("Submit", focus == Focus::Submit));

    match form.submit_status() {
        SubmitStatus::NotSubmitted => {}
        SubmitStatus::Invalid => lines.push(Line::from(Span::styled(
            format!("Fix {} error(s) and submit again", form.errors().len()),
            Style::default().fg(Color::Red),
        ))),
        SubmitStatus::Valid => lines.push(Line::from(Span::styled(
            format!("Submitted ✓ (attempt {})", form.submit_count()),
            Style::default().fg(Color::Green),
        ))),
    }

    (lines, anchor, focused_line)
}

/// Keep `focused` (plus the error line under it) inside the window.
fn scroll_into_view(scroll: u16, focused: usize, height: u16) -> u16 {
    let height = height.max(1) as usize;
    let scroll = scroll as usize;
    let scroll = if focused < scroll {
        focused.saturating_sub(1)
    } else if focused + 1 >= scroll + height {
        (focused + 2).saturating_sub(height)
    } else {
        scroll
    };
    scroll as u16
}

pub fn render_user_form(
    view: &mut UserForm,
    f: &mut Frame<'_>,
    area: Rect,
) -> Result<FormRenderMetrics> {
    let block = Block::default()
        .title(format!(" {} ", view.title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let (lines, anchor, focused_line) = build_lines(view);
    let total_lines = lines.len();

    if inner.width < 5 || inner.height < 3 {
        return Ok(FormRenderMetrics {
            total_lines,
            focused_line,
            scroll: view.scroll(),
            cursor: None,
            thumb_y: None,
        });
    }

    let submission = view.last_submission().map(str::to_string);
    let submission_height = submission
        .as_ref()
        .map(|json| (json.lines().count() as u16 + 2).min(SUBMISSION_MAX_HEIGHT))
        .unwrap_or(0)
        .min(inner.height / 2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(submission_height)])
        .split(inner);
    let body = Rect {
        width: chunks[0].width.saturating_sub(1),
        ..chunks[0]
    };

    if let Some(line) = focused_line {
        let scroll = scroll_into_view(view.scroll(), line, body.height);
        view.set_scroll(scroll);
    }
    let scroll = view.scroll();

    f.render_widget(
        Paragraph::new(Text::from(lines)).scroll((scroll, 0)),
        body,
    );

    // Scroll indicator on the right edge of the body
    let track = Rect {
        x: chunks[0].x + chunks[0].width.saturating_sub(1),
        width: 1,
        ..chunks[0]
    };
    let thumb_y = compute_scrollbar_thumb(
        total_lines,
        body.height as usize,
        scroll as usize,
        track.height,
    );
    if let Some(thumb) = thumb_y {
        let track_lines: Vec<Line> = (0..track.height)
            .map(|i| {
                if i as usize == thumb {
                    Line::from(Span::styled("█", Style::default().fg(Color::Gray)))
                } else {
                    Line::from(Span::styled("│", Style::default().fg(Color::DarkGray)))
                }
            })
            .collect();
        f.render_widget(Paragraph::new(Text::from(track_lines)), track);
    }

    if let Some(json) = submission {
        let panel = Paragraph::new(json)
            .style(Style::default().fg(Color::Green))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Last submission ")
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(panel, chunks[1]);
    }

    let cursor = anchor.and_then(|anchor| {
        let row = anchor.line.checked_sub(scroll as usize)?;
        if row >= body.height as usize {
            return None;
        }
        let x = (body.x + anchor.column + view.input().visual_cursor() as u16)
            .min(body.right().saturating_sub(1));
        let y = body.y + row as u16;
        f.set_cursor_position(Position::new(x, y));
        Some((x, y))
    });

    Ok(FormRenderMetrics {
        total_lines,
        focused_line,
        scroll,
        cursor,
        thumb_y,
    })
}
