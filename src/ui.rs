use crate::core::{DeckCore, ViewMode};
use crate::player::PlayerState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

const APP_TITLE_WITH_VERSION: &str = "SongDeck v0.1.0  ";

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    panel_bg: Color,
    panel_alt_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    selected_bg: Color,
}

fn palette() -> Palette {
    Palette {
        bg: Color::Rgb(10, 15, 24),
        panel_bg: Color::Rgb(19, 29, 43),
        panel_alt_bg: Color::Rgb(24, 38, 58),
        border: Color::Rgb(69, 121, 176),
        text: Color::Rgb(214, 228, 248),
        muted: Color::Rgb(149, 173, 204),
        accent: Color::Rgb(100, 203, 184),
        alert: Color::Rgb(249, 174, 88),
        selected_bg: Color::Rgb(34, 55, 82),
    }
}

pub fn draw(frame: &mut Frame, core: &DeckCore, command_line: Option<&str>) {
    let colors = palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_TITLE_WITH_VERSION,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Songs {}", core.catalog.len()),
            Style::default().fg(colors.text),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("Playlists {}", core.playlists.len()),
            Style::default().fg(colors.text),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(scope_label(core), Style::default().fg(colors.alert)),
    ]))
    .block(panel_block("Status", colors.panel_bg, colors.text, colors.border));
    frame.render_widget(header, vertical[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(vertical[1]);

    let current_id = core.player.current();
    let items: Vec<ListItem> = core
        .visible()
        .into_iter()
        .map(|song| {
            let marker = if current_id == Some(song.id.as_str()) {
                " > "
            } else {
                "   "
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(colors.accent)),
                Span::styled(
                    format!("{:<6}", song.id),
                    Style::default().fg(colors.muted),
                ),
                Span::styled(song.title.clone(), Style::default().fg(colors.text)),
                Span::styled(
                    format!("  {} ({}, {})", song.artist, song.album, song.year),
                    Style::default().fg(colors.muted),
                ),
            ]))
        })
        .collect();

    let row_count = items.len();
    let mut state = ListState::default();
    state.select((row_count > 0).then_some(core.selected.min(row_count.saturating_sub(1))));

    let list_title = match &core.view {
        ViewMode::Library => String::from("Library"),
        ViewMode::Playlist(name) => format!("Library / Playlist / {name}"),
    };
    let list = List::new(items)
        .block(panel_block(
            &list_title,
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, body[0], &mut state);

    frame.render_widget(info_panel(core, &colors), body[1]);

    let footer_line = match command_line {
        Some(buffer) => Line::from(vec![
            Span::styled(":", Style::default().fg(colors.accent)),
            Span::styled(buffer.to_string(), Style::default().fg(colors.text)),
            Span::styled("_", Style::default().fg(colors.muted)),
        ]),
        None => Line::from(vec![
            Span::styled(
                "Keys: Enter play, p playlist play, n next, b previous, s stop, Backspace library, : command, ? help, Ctrl+C quit",
                Style::default().fg(colors.muted),
            ),
            Span::styled("  |  ", Style::default().fg(colors.muted)),
            Span::styled(core.status.as_str(), Style::default().fg(colors.text)),
        ]),
    };
    let footer = Paragraph::new(footer_line).block(panel_block(
        "Message",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(footer, vertical[2]);
}

fn scope_label(core: &DeckCore) -> String {
    match core.player.state() {
        PlayerState::Idle => String::from("Idle"),
        PlayerState::Library { .. } => String::from("Playing: Library"),
        PlayerState::Playlist { name, .. } => format!("Playing: {name}"),
    }
}

fn info_panel(core: &DeckCore, colors: &Palette) -> Paragraph<'static> {
    let now = core.current_song();
    let now_title = now.map(|song| song.title.clone()).unwrap_or_else(|| String::from("-"));
    let now_artist = now.map(|song| song.artist.clone()).unwrap_or_else(|| String::from("-"));
    let now_album = now
        .map(|song| format!("{} ({})", song.album, song.year))
        .unwrap_or_else(|| String::from("-"));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                "Now",
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {now_title}"), Style::default().fg(colors.text)),
        ]),
        Line::from(Span::styled(
            format!("Artist  {now_artist}"),
            Style::default().fg(colors.muted),
        )),
        Line::from(Span::styled(
            format!("Album   {now_album}"),
            Style::default().fg(colors.muted),
        )),
        Line::from(Span::styled(
            format!("History {}", core.player.history_len()),
            Style::default().fg(colors.alert),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Playlists",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    if core.playlists.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (none)",
            Style::default().fg(colors.muted),
        )));
    } else {
        for name in core.playlist_names() {
            let len = core.playlists[name].len();
            lines.push(Line::from(Span::styled(
                format!("  {name} ({len})"),
                Style::default().fg(colors.text),
            )));
        }
    }

    Paragraph::new(lines)
        .block(panel_block(
            "Song Info",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: true })
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}
