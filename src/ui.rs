//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It only
//! reads the [`App`] model and a [`PlayerSnapshot`]; it never mutates either.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Fetch, Screen, fuzzy_match_positions};
use crate::config::Settings;
use crate::player::{PlayerSnapshot, Track};

/// Shown for tracks whose length the catalog did not report.
const PLACEHOLDER_DURATION: &str = "0:30";

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text for `screen`.
pub(crate) fn controls_text(screen: Screen, seek_step_seconds: u64) -> String {
    let keys: Vec<String> = match screen {
        Screen::Albums => vec![
            "[j/k] up/down".into(),
            "[gg/G] top/bottom".into(),
            "[enter] open album".into(),
            "[tab] songs".into(),
            "[/] filter".into(),
            "[r] reload".into(),
            "[q] quit".into(),
        ],
        Screen::Songs | Screen::Album => vec![
            "[j/k] up/down".into(),
            "[enter] play".into(),
            "[space/p] play/pause".into(),
            "[h/l] prev/next".into(),
            format!("[H/L] seek -/+{seek_step_seconds}s"),
            "[+/-] volume".into(),
            "[m] mute".into(),
            "[s] stop".into(),
            "[K] details".into(),
            "[esc] back".into(),
            "[q] quit".into(),
        ],
    };
    keys.join(" | ")
}

/// Format seconds as `m:ss`.
pub(crate) fn format_mss(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn track_length_text(track: &Track) -> String {
    track
        .duration_hint()
        .map_or_else(|| PLACEHOLDER_DURATION.to_string(), |d| format_mss(d.as_secs_f64()))
}

/// Format an optional duration, rounding up partial seconds, showing total seconds.
fn format_duration_mmss_ceil(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "-".to_string();
    };

    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }

    format!("{}:{:02} ({}s)", total_secs / 60, total_secs % 60, total_secs)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Window of `total` rows that keeps `selected` centered when the list is
/// taller than `height`. Returns `(start, end, selected_in_window)`.
pub(crate) fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    let selected = selected.min(total.saturating_sub(1));
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

/// Render the entire UI into `frame`.
pub fn draw(frame: &mut Frame, app: &App, player: &PlayerSnapshot, settings: &Settings) {
    let show_dock = player.current_track.is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(if show_dock { 4 } else { 0 }),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_header(frame, app, &settings.ui.header_text, chunks[0]);
    match app.screen {
        Screen::Albums => draw_albums(frame, app, chunks[1]),
        Screen::Songs | Screen::Album => draw_tracks(frame, app, player, chunks[1]),
    }
    if show_dock {
        draw_dock(frame, player, chunks[2]);
    }

    if app.details_window && app.screen != Screen::Albums {
        draw_details(frame, app.selected_track(), chunks[1]);
    }

    let footer = Paragraph::new(controls_text(app.screen, settings.playback.seek_step_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, header_text: &str, area: Rect) {
    let mut parts = vec![header_text.trim().to_string(), app.artist.clone()];
    if app.catalog.ready().is_some() {
        parts.push(app.album_count_text());
    } else if app.catalog.is_loading() || app.album.is_loading() {
        parts.push("loading...".to_string());
    }
    let header = Paragraph::new(parts.join(" • "))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, area);
}

fn status_paragraph<'a>(text: String, title: String) -> Paragraph<'a> {
    Paragraph::new(text)
        .block(Block::bordered().padding(LEFT_PAD).title(title))
        .wrap(Wrap { trim: true })
}

fn draw_albums(frame: &mut Frame, app: &App, area: Rect) {
    let catalog = match &app.catalog {
        Fetch::Idle | Fetch::Loading => {
            frame.render_widget(
                status_paragraph("Loading albums...".into(), " albums ".into()),
                area,
            );
            return;
        }
        Fetch::Failed(msg) => {
            let text = format!("Could not load albums: {msg}\n\n[r] retry");
            frame.render_widget(status_paragraph(text, " albums ".into()).red(), area);
            return;
        }
        Fetch::Ready(c) => c,
    };
    if catalog.albums.is_empty() {
        frame.render_widget(
            status_paragraph("No albums found.".into(), " albums ".into()),
            area,
        );
        return;
    }

    let query = app.filter_query.trim();
    let display = app.display_indices();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected) = visible_window(display.len(), height, app.album_selected);

    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let album = &catalog.albums[i];
            let year = album.release_year().unwrap_or("----");
            let title = highlight_matches(&album.collection_name, query);
            ListItem::new(format!("{year} · {title}"))
        })
        .collect();

    let mut title = format!(" albums ({}) ", display.len());
    if app.filter_mode || !query.is_empty() {
        title = format!(" albums ({}) filter: {query} ", display.len());
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !display.is_empty() {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Uppercase the characters of `title` matched by the filter.
fn highlight_matches(title: &str, query: &str) -> String {
    let Some(positions) = fuzzy_match_positions(title, query).filter(|p| !p.is_empty()) else {
        return title.to_string();
    };
    let mut rendered = String::with_capacity(title.len());
    let mut pos_iter = positions.into_iter().peekable();
    for (ci, ch) in title.chars().enumerate() {
        if pos_iter.peek() == Some(&ci) {
            rendered.extend(ch.to_uppercase());
            pos_iter.next();
        } else {
            rendered.push(ch);
        }
    }
    rendered
}

fn draw_tracks(frame: &mut Frame, app: &App, player: &PlayerSnapshot, area: Rect) {
    let heading = match app.screen {
        Screen::Songs => " songs ".to_string(),
        _ => match &app.album {
            Fetch::Ready(d) => match d.album.release_year() {
                Some(y) => format!(" {} ({y}) ", d.album.collection_name),
                None => format!(" {} ", d.album.collection_name),
            },
            _ => " album ".to_string(),
        },
    };

    if app.screen == Screen::Album {
        match &app.album {
            Fetch::Idle | Fetch::Loading => {
                frame.render_widget(status_paragraph("Loading tracks...".into(), heading), area);
                return;
            }
            Fetch::Failed(msg) => {
                let text = format!("Could not load this album: {msg}\n\n[r] retry | [esc] back");
                frame.render_widget(status_paragraph(text, heading).red(), area);
                return;
            }
            Fetch::Ready(_) => {}
        }
    }
    if app.tracks.is_empty() {
        frame.render_widget(status_paragraph("No tracks.".into(), heading), area);
        return;
    }

    let active = if app.queue_on_screen() { player.index } else { None };
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected) = visible_window(app.tracks.len(), height, app.track_selected);

    let items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let i = start + offset;
            let marker = if active == Some(i) { "♪ " } else { "  " };
            let mut line = Line::from(vec![
                Span::raw(format!("{marker}{:>2}. ", i + 1)),
                Span::raw(track.title.clone()),
                Span::raw("  "),
                Span::raw(track_length_text(track)).dim(),
            ]);
            if !track.is_playable() {
                line = line.dim().italic();
            }
            if active == Some(i) {
                line = line.bold();
            }
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(heading))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Mini-player dock: transport, title, time and a progress gauge.
fn draw_dock(frame: &mut Frame, player: &PlayerSnapshot, area: Rect) {
    let Some(track) = &player.current_track else {
        return;
    };
    let block = Block::bordered()
        .title(format!(" {} ", player.transport.label()))
        .padding(LEFT_PAD);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let now_playing = Line::from(vec![
        Span::raw(track.title.clone()).bold(),
        Span::raw(" - "),
        Span::raw(track.artist.clone()),
        Span::raw(format!("  vol {:.0}%", player.volume * 100.0)).dim(),
    ]);
    frame.render_widget(Paragraph::new(now_playing), rows[0]);

    let label = format!(
        "{} / {}",
        format_mss(player.current_time_seconds),
        format_mss(player.duration_seconds)
    );
    let gauge = Gauge::default()
        .ratio(player.progress_ratio.clamp(0.0, 1.0))
        .label(label)
        .use_unicode(true);
    frame.render_widget(gauge, rows[1]);
}

/// Overlay track details (keeps the list visible under it).
fn draw_details(frame: &mut Frame, track: Option<&Track>, list_area: Rect) {
    let popup_area = centered_rect_sized(76, 10, list_area);
    frame.render_widget(Clear, popup_area);

    let text = match track {
        Some(track) => format!(
            "Title: {}\nArtist: {}\nAlbum: {}\nLength: {}\nPreview: {}\nPage: {}\nCover: {}",
            track.title,
            track.artist,
            track.album.as_deref().unwrap_or("-"),
            format_duration_mmss_ceil(track.duration_hint()),
            track.preview_url.as_deref().unwrap_or("(none)"),
            track.detail_url.as_deref().unwrap_or("-"),
            track.cover_url.as_deref().unwrap_or("-"),
        ),
        None => "No track selected".to_string(),
    };
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .padding(LEFT_PAD)
                .borders(Borders::ALL)
                .title(" details (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mss_formatting_floors_and_guards() {
        assert_eq!(format_mss(0.0), "0:00");
        assert_eq!(format_mss(29.9), "0:29");
        assert_eq!(format_mss(61.0), "1:01");
        assert_eq!(format_mss(f64::NAN), "0:00");
        assert_eq!(format_mss(-3.0), "0:00");
    }

    #[test]
    fn duration_ceil_rounds_partial_seconds_up() {
        assert_eq!(format_duration_mmss_ceil(None), "-");
        assert_eq!(
            format_duration_mmss_ceil(Some(Duration::from_millis(238_001))),
            "3:59 (239s)"
        );
    }

    #[test]
    fn window_centres_the_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
        assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
        assert_eq!(visible_window(100, 10, 98), (90, 100, 8));
        assert_eq!(visible_window(0, 10, 0), (0, 0, 0));
    }

    #[test]
    fn filter_matches_are_uppercased() {
        assert_eq!(highlight_matches("trench", "tch"), "TrenCH");
        assert_eq!(highlight_matches("Vessel", ""), "Vessel");
    }

    #[test]
    fn controls_mention_the_seek_step() {
        assert!(controls_text(Screen::Album, 5).contains("[H/L] seek -/+5s"));
        assert!(controls_text(Screen::Albums, 5).contains("[enter] open album"));
    }
}
