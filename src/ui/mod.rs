// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

mod jobs;
mod racks;

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::engine::FeedStatus;
use crate::feed::Rgb;

pub(crate) fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Racks and jobs
            Constraint::Length(1), // Footer/status
        ])
        .split(frame.area());

    render_title(frame, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    racks::render_racks(frame, body[0], app);

    if app.engine.detail_view().is_some() {
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(11)])
            .split(body[1]);
        jobs::render_jobs(frame, side[0], app);
        jobs::render_detail(frame, side[1], app);
    } else {
        jobs::render_jobs(frame, body[1], app);
    }

    render_footer(frame, chunks[2], app);
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(" rackviz - {} ", app.source);

    let banner = app.engine.banner();
    let banner_text = format!(" {} ", banner.text);

    let age = match app.last_update {
        Some(at) => format!("updated {} ago", format_age(at.elapsed())),
        None => "no data".to_string(),
    };
    let stats = format!(" {}  {:.0}fps  fetch {:.0}ms ", age, app.self_stats.fps, app.self_stats.fetch_time_ms);

    let padding = (area.width as usize).saturating_sub(title.len() + banner_text.len() + stats.len());

    let header_line = Line::from(vec![
        Span::styled(title, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled(
            banner_text,
            Style::default().fg(Color::Black).bg(rgb(banner.color)).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
        Span::styled(stats, Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(header_line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let engine = &app.engine;

    let text = if let Some(ref message) = app.message {
        Span::styled(format!(" {} ", message), Style::default().fg(Color::Red))
    } else if let Some(err) = engine.last_error() {
        let stale = if engine.status() == FeedStatus::Pending {
            String::new()
        } else {
            " | showing last good data".to_string()
        };
        Span::styled(
            format!(
                " Feed error ({} in a row): {}{} ",
                engine.consecutive_failures(),
                err,
                stale
            ),
            Style::default().fg(Color::Red),
        )
    } else {
        let filter = match engine.filter() {
            Some(job) => format!("filter: job {}  a:show all  ", job),
            None => String::new(),
        };
        Span::styled(
            format!(
                " {}q:quit  tab:category  j/k:nav  enter:select  x:close  t:racks  [/]:rotate  r:refresh ",
                filter
            ),
            Style::default().fg(Color::Gray),
        )
    };

    frame.render_widget(Paragraph::new(Line::from(text)), area);
}

/// Coarse age for the title bar
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h", secs / 3600)
    }
}
