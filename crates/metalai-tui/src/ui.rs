use metalai_core::{ChatMessage, ChatWidget, Sender};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

const LAUNCHER_LABEL: &str = " 🤖 MetalAI Assistant ";
const PLACEHOLDER: &str = "Ask about LCA, metals, or environmental impact...";
const GREETING: &str = "Hello! I'm MetalAI, ready to help with your LCA questions.";
const SUGGESTIONS: [&str; 3] = [
    "Carbon footprint calculations",
    "Material impact assessments",
    "Sustainability strategies",
];

const WINDOW_WIDTH: u16 = 52;
const WINDOW_HEIGHT: u16 = 26;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after[end + 2..];
            }
            // No closing **, keep the rest literal
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

/// Terminal columns taken by `c` (wide for CJK and most emoji)
fn char_width(c: char) -> usize {
    let mut buf = [0u8; 4];
    let s: &str = c.encode_utf8(&mut buf);
    Span::raw(s).width()
}

/// Horizontal window over the draft that keeps the cursor visible.
///
/// Returns how many chars to skip and the cursor column inside the window.
fn input_window(draft: &str, cursor: usize, inner_width: usize) -> (usize, usize) {
    let mut cursor_col: usize = draft.chars().take(cursor).map(char_width).sum();
    let mut skip = 0;

    let mut leading = draft.chars().take(cursor);
    while inner_width > 0 && cursor_col >= inner_width {
        match leading.next() {
            Some(c) => {
                cursor_col -= char_width(c);
                skip += 1;
            }
            None => break,
        }
    }

    (skip, cursor_col)
}

/// Place a `width` x `height` box in the bottom-right corner of `area`
fn bottom_right(area: Rect, width: u16, height: u16, margin: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(margin));
    let height = height.min(area.height.saturating_sub(margin));
    Rect::new(
        area.x + area.width.saturating_sub(width + margin),
        area.y + area.height.saturating_sub(height + margin),
        width,
        height,
    )
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [body_area, footer_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    render_backdrop(frame, body_area);
    render_footer(app, frame, footer_area);

    if app.widget.is_open() {
        app.launcher_area = None;
        render_window(app, frame, body_area);
    } else {
        app.close_area = None;
        app.chat_area = None;
        render_launcher(app, frame, body_area);
    }
}

fn render_backdrop(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" MetalAI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Life-Cycle Assessment ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    frame.render_widget(block, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.widget.is_open() {
        " Enter: send | ↑/↓ PgUp/PgDn: scroll | Esc: minimise | Ctrl+C: quit "
    } else {
        " Enter/o: open assistant | q: quit "
    };

    let footer = Paragraph::new(Span::styled(hints, Style::default().fg(Color::White)))
        .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn render_launcher(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = Span::raw(LAUNCHER_LABEL).width() as u16 + 2;
    let launcher_area = bottom_right(area, width, 3, 2);
    app.launcher_area = Some(launcher_area);

    let launcher = Paragraph::new(LAUNCHER_LABEL)
        .style(Style::default().fg(Color::White).bg(Color::Blue).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );

    frame.render_widget(Clear, launcher_area);
    frame.render_widget(launcher, launcher_area);
}

fn render_window(app: &mut App, frame: &mut Frame, area: Rect) {
    let window_area = bottom_right(area, WINDOW_WIDTH, WINDOW_HEIGHT, 1);
    frame.render_widget(Clear, window_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(window_area);
    frame.render_widget(block, window_area);

    let [header_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);

    render_window_header(app, frame, header_area);
    render_messages(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_window_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let header_style = Style::default().bg(Color::Blue).fg(Color::White);
    let header = Paragraph::new(vec![
        Line::from(Span::styled(" MetalAI", Style::default().bold())),
        Line::from(Span::styled(
            " Your LCA Assistant",
            Style::default().fg(Color::Gray),
        )),
    ])
    .style(header_style);
    frame.render_widget(header, area);

    let close_area = Rect::new(
        area.x + area.width.saturating_sub(4),
        area.y,
        area.width.min(3),
        1,
    );
    app.close_area = Some(close_area);
    frame.render_widget(
        Paragraph::new("[×]").style(Style::default().bg(Color::Red).fg(Color::White)),
        close_area,
    );
}

/// The conversation as drawn in the chat area. Scroll limits are measured on
/// this same paragraph.
pub(crate) fn conversation_paragraph(
    widget: &ChatWidget,
    animation_frame: u8,
) -> Paragraph<'static> {
    let text = if widget.messages().is_empty() && !widget.is_loading() {
        greeting_text()
    } else {
        let mut lines: Vec<Line<'static>> = Vec::new();
        for msg in widget.messages() {
            lines.extend(message_lines(msg));
        }

        if widget.is_loading() {
            lines.push(Line::from(Span::styled(
                "MetalAI",
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )));
            // Animated typing indicator: cycles through one to three dots
            let dots = "•".repeat((animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                dots,
                Style::default().fg(Color::DarkGray),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(text).wrap(Wrap { trim: true })
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.chat_height = area.height;
    app.chat_width = area.width;

    let chat = conversation_paragraph(&app.widget, app.animation_frame)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn message_lines(msg: &ChatMessage) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match msg.sender() {
        Sender::User => {
            lines.push(
                Line::from(Span::styled(
                    "You",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Right),
            );
            for line in msg.text().lines() {
                lines.push(
                    Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::Cyan),
                    ))
                    .alignment(Alignment::Right),
                );
            }
        }
        Sender::Bot => {
            lines.push(Line::from(Span::styled(
                "MetalAI",
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )));
            for line in msg.text().lines() {
                lines.push(parse_markdown_line(line));
            }
        }
    }

    lines.push(Line::default());
    lines
}

fn greeting_text() -> Text<'static> {
    let muted = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::default(),
        Line::from("🤖").alignment(Alignment::Center),
        Line::from(GREETING).alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled("Try asking about:", muted)).alignment(Alignment::Center),
    ];
    for suggestion in SUGGESTIONS {
        lines.push(
            Line::from(Span::styled(format!("• {}", suggestion), muted))
                .alignment(Alignment::Center),
        );
    }

    Text::from(lines)
}

/// Where the terminal cursor goes, or `None` while input is disabled
fn input_cursor(app: &App, area: Rect) -> Option<(u16, u16)> {
    if app.widget.is_loading() {
        return None;
    }

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (_, cursor_col) = input_window(app.widget.draft(), app.draft_cursor, inner_width);
    Some((area.x + 1 + cursor_col as u16, area.y + 1))
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let loading = app.widget.is_loading();

    let send_style = if app.widget.can_send() {
        Style::default().fg(Color::White).bg(Color::Blue).bold()
    } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    };
    let send_label = if loading { " ... " } else { " Send " };
    let border_color = if loading {
        Color::DarkGray
    } else {
        Color::Yellow
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title_top(Line::from(Span::styled(send_label, send_style)).right_aligned());

    let inner_width = area.width.saturating_sub(2) as usize;

    let input = if app.widget.draft().is_empty() {
        Paragraph::new(Span::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let (skip, _) = input_window(app.widget.draft(), app.draft_cursor, inner_width);
        let visible_text: String = app.widget.draft().chars().skip(skip).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(input_block), area);

    if let Some(position) = input_cursor(app, area) {
        frame.set_cursor_position(position);
    }
}
