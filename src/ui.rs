use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::App;
use crate::layout::{LineKind, TranscriptLine};
use crate::session::Sender;

const TITLE: &str = "Medical Appointment Assistant";
const PLACEHOLDER: &str = "Ask to book an appointment...";
const SEND_LABEL: &str = " Send ";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: title bar, chat, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_chat(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {TITLE} "), Style::default().fg(Color::White).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Blue));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Black).bg(Color::Gray);
    let label_style = Style::default().fg(Color::Gray);

    let mut spans = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Ctrl+U ", key_style),
        Span::styled(" clear ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];
    if !app.follow_tail {
        spans.push(Span::styled(" (scrolled back)", Style::default().fg(Color::DarkGray)));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);
    // Inner size minus borders, for scroll calculations
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);
    if app.follow_tail {
        app.scroll_to_bottom();
    } else {
        app.clamp_scroll();
    }

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let session = &app.session;
    if session.transcript().is_empty() && !session.is_pending() {
        let placeholder = Paragraph::new(Span::styled(
            "Tell the assistant when you'd like to be seen.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, area);
        return;
    }

    // Lines are pre-wrapped to the panel width, so only the visible slice is drawn
    let all_lines = app.transcript_lines();
    let max_scroll = app.max_scroll();
    let visible: Vec<Line> = all_lines
        .into_iter()
        .skip(app.chat_scroll)
        .take(app.chat_height as usize)
        .map(|line| styled_line(app, line))
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);

    if max_scroll > 0 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(max_scroll)
            .position(app.chat_scroll);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn styled_line(app: &App, line: TranscriptLine) -> Line<'static> {
    // User messages sit on the right, bot replies on the left
    let alignment = |sender: Sender| match sender {
        Sender::User => Alignment::Right,
        Sender::Bot => Alignment::Left,
    };
    let label_color = |sender: Sender| match sender {
        Sender::User => Color::Cyan,
        Sender::Bot => Color::Yellow,
    };

    match line.kind {
        LineKind::Label(sender) => Line::from(Span::styled(
            line.text,
            Style::default().fg(label_color(sender)).add_modifier(Modifier::BOLD),
        ))
        .alignment(alignment(sender)),
        LineKind::Body(sender) => Line::from(line.text).alignment(alignment(sender)),
        LineKind::Blank => Line::default(),
        LineKind::TypingLabel => Line::from(Span::styled(
            line.text,
            Style::default().fg(label_color(Sender::Bot)).add_modifier(Modifier::BOLD),
        )),
        LineKind::Typing => {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            Line::from(Span::styled(
                format!("Typing{dots}"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        }
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.session.is_pending();

    let [field_area, button_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_LABEL.len() as u16 + 2),
    ])
    .areas(area);

    // Both controls read as disabled while an exchange is in flight
    let border_color = if pending { Color::DarkGray } else { Color::Blue };
    let field_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Horizontal scrolling keeps the cursor visible (inner width minus borders)
    let inner_width = field_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let draft = app.session.draft();
    let field = if draft.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        let fg = if pending { Color::Gray } else { Color::White };
        Paragraph::new(visible_text).style(Style::default().fg(fg))
    };
    frame.render_widget(field.block(field_block), field_area);

    let button_style = if pending {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(Span::styled(SEND_LABEL, button_style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border_color)));
    frame.render_widget(button, button_area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((field_area.x + cursor_x + 1, field_area.y + 1));
}
