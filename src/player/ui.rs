use chrono::Local;
use podplay::constants::{APP_TITLE, EMPTY_PLAYER_PROMPT, NOW_PLAYING, TAGLINE};
use podplay::utils::time::{episode_date, format_seconds, header_date};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::App;
use super::surface::{Control, PlayerView};

const ACCENT: Color = Color::Rgb(4, 211, 129);
const RAIL: Color = Color::Rgb(159, 117, 255);

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(8),    // Episodes + player
            Constraint::Length(1), // Status line
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    draw_episode_list(f, body[0], app);
    draw_player(f, body[1], app);

    if let Some(message) = &app.status_message {
        let status = Paragraph::new(message.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(status, chunks[2]);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let date = header_date(Local::now().date_naive(), app.locale);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(date.chars().count() as u16 + 1)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("🎙 {APP_TITLE}"),
            Style::default().fg(RAIL).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(TAGLINE, Style::default().fg(Color::Gray)),
    ]));
    f.render_widget(title, chunks[0]);

    let date_widget = Paragraph::new(date)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Right);
    f.render_widget(date_widget, chunks[1]);

    let border = Block::default().borders(Borders::BOTTOM);
    f.render_widget(border, area);
}

fn draw_episode_list(f: &mut Frame, area: Rect, app: &App) {
    let current_id = app.queue.current_episode().map(|episode| episode.id.as_str());

    let items: Vec<ListItem> = app
        .library
        .iter()
        .map(|episode| {
            let is_current = current_id == Some(episode.id.as_str());
            let marker = if is_current { "▶ " } else { "  " };
            let title_style = if is_current {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let details = format!(
                "  {} · {} · {}",
                episode.members,
                episode_date(episode.published_at.date(), app.locale),
                format_seconds(episode.duration)
            );

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(ACCENT)),
                    Span::styled(episode.title.as_str(), title_style),
                ]),
                Line::from(Span::styled(details, Style::default().fg(Color::DarkGray))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Últimos lançamentos "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !app.library.is_empty() {
        state.select(Some(app.selected));
    }

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_player(f: &mut Frame, area: Rect, app: &App) {
    let view = app.surface.view(&app.queue);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(RAIL))
        .title(format!(" 🎧 {NOW_PLAYING} "));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(3),    // Episode info
            Constraint::Length(1), // Progress
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Transport controls
            Constraint::Length(3), // Key hints
        ])
        .split(inner);

    draw_current_episode(f, chunks[0], &view);
    draw_progress(f, chunks[1], &view);
    draw_controls(f, chunks[3], &view);
    draw_key_hints(f, chunks[4]);
}

fn draw_current_episode(f: &mut Frame, area: Rect, view: &PlayerView) {
    let widget = match view.episode {
        Some(episode) => Paragraph::new(vec![
            Line::from(Span::styled(
                episode.title.as_str(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                episode.members.as_str(),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        None => Paragraph::new(EMPTY_PLAYER_PROMPT)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
    };

    f.render_widget(widget, area);
}

fn draw_progress(f: &mut Frame, area: Rect, view: &PlayerView) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(9), // Elapsed
            Constraint::Min(10),   // Slider
            Constraint::Length(9), // Total
        ])
        .split(area);

    let dim = if view.episode.is_some() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    f.render_widget(
        Paragraph::new(view.elapsed.as_str()).style(dim),
        chunks[0],
    );

    match view.seek_bar {
        Some(seek_bar) => {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(ACCENT).bg(RAIL))
                .ratio(seek_bar.ratio())
                .label("");
            f.render_widget(gauge, chunks[1]);
        }
        None => {
            let empty = Paragraph::new("─".repeat(chunks[1].width as usize))
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, chunks[1]);
        }
    }

    f.render_widget(
        Paragraph::new(view.total.as_str())
            .style(dim)
            .alignment(Alignment::Right),
        chunks[2],
    );
}

fn control_style(control: Control) -> Style {
    if !control.enabled {
        Style::default().fg(Color::DarkGray)
    } else if control.active {
        Style::default()
            .fg(ACCENT)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_controls(f: &mut Frame, area: Rect, view: &PlayerView) {
    let play_label = if view.is_playing { " ⏸ " } else { " ▶ " };
    let play_style = if view.play_pause.enabled {
        Style::default()
            .fg(Color::Black)
            .bg(RAIL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let controls = Line::from(vec![
        Span::styled(" ⤮ ", control_style(view.shuffle)),
        Span::raw("  "),
        Span::styled(" ⏮ ", control_style(view.previous)),
        Span::raw("  "),
        Span::styled(play_label, play_style),
        Span::raw("  "),
        Span::styled(" ⏭ ", control_style(view.next)),
        Span::raw("  "),
        Span::styled(" ↻ ", control_style(view.repeat)),
    ]);

    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center),
        area,
    );
}

fn draw_key_hints(f: &mut Frame, area: Rect) {
    let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));

    let rows = vec![
        Line::from(vec![
            key("[space]", Color::Green),
            Span::raw(" play  "),
            key("[b/n]", Color::Magenta),
            Span::raw(" prev/next  "),
            key("[←→]", Color::Magenta),
            Span::raw(" seek"),
        ]),
        Line::from(vec![
            key("[s]", Color::Cyan),
            Span::raw(" shuffle  "),
            key("[l]", Color::Cyan),
            Span::raw(" loop  "),
            key("[c]", Color::Yellow),
            Span::raw(" clear"),
        ]),
        Line::from(vec![
            key("[enter]", Color::Green),
            Span::raw(" play list  "),
            key("[p]", Color::Green),
            Span::raw(" play one  "),
            key("[q]", Color::Red),
            Span::raw(" quit"),
        ]),
    ];

    f.render_widget(
        Paragraph::new(rows).alignment(Alignment::Center),
        area,
    );
}
