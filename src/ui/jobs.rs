// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use super::rgb;
use crate::app::App;
use crate::engine::catalog::CategoryList;
use crate::engine::detail::DetailView;
use crate::engine::FeedStatus;
use crate::feed::JobCategory;

const SELECTED_BG: Color = Color::DarkGray;
const LABEL_FG: Color = Color::Gray;

pub fn render_jobs(frame: &mut Frame, area: Rect, app: &App) {
    let engine = &app.engine;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let titles: Vec<String> = JobCategory::ALL
        .iter()
        .map(|category| match engine.catalog().get(*category) {
            CategoryList::NotLoaded => category.to_string(),
            list => format!("{} ({})", category, list.len()),
        })
        .collect();
    let selected_tab = JobCategory::ALL.iter().position(|c| *c == app.tab).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Jobs "))
        .select(selected_tab)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    let block = Block::default().borders(Borders::ALL);

    if !engine.jobs_menu_ready() {
        let text = match engine.status() {
            FeedStatus::Maintenance => "Job data unavailable (maintenance)",
            FeedStatus::Pending | FeedStatus::Operational => "Waiting for feed...",
        };
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(LABEL_FG));
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    if engine.catalog().get(app.tab).is_empty() {
        let paragraph = Paragraph::new(format!("No {} jobs", app.tab))
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(LABEL_FG));
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = app
        .records()
        .iter()
        .map(|record| {
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(rgb(record.color))),
                Span::styled(record.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", record.subtitle), Style::default().fg(LABEL_FG)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(SELECTED_BG));
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(LABEL_FG)),
        Span::raw(value.into()),
    ])
}

pub fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = app.engine.detail_view() else {
        return;
    };

    match view {
        DetailView::Running {
            job_id,
            project,
            queue,
            mode,
            runtime,
            wall_time,
            node_count,
            progress_max,
            progress_limit,
        } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" Job {} ", job_id));
            let inner = block.inner(area);
            frame.render_widget(block, area);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
                .split(inner);

            let lines = vec![
                field("Project", project.clone()),
                field("Queue", format!("{} ({})", queue, mode)),
                field("Nodes", node_count.to_string()),
                field("Runtime", format!("{} / {}", runtime, wall_time)),
            ];
            frame.render_widget(Paragraph::new(lines), chunks[0]);

            let max_hours = app.engine.config().detail.max_walltime_hours;
            frame.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(Color::Cyan))
                    .ratio(*progress_max)
                    .label(format!("{:.0}% of {}h max", progress_max * 100.0, max_hours)),
                chunks[1],
            );
            frame.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(Color::Green))
                    .ratio(*progress_limit)
                    .label(format!("{:.0}% of wall time", progress_limit * 100.0)),
                chunks[2],
            );
        }
        DetailView::Queued {
            job_id,
            project,
            queue,
            mode,
            score,
            wall_time,
            time_queued,
            nodes_requested,
        } => {
            let lines = vec![
                field("Project", project.clone()),
                field("Queue", format!("{} ({})", queue, mode)),
                field("Score", score.clone()),
                field("Nodes", nodes_requested.to_string()),
                field("Wall time", wall_time.clone()),
                field("Queued for", time_queued.clone()),
            ];
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" Queued job {} ", job_id));
            frame.render_widget(Paragraph::new(lines).block(block), area);
        }
        DetailView::Reserved {
            name,
            queue,
            partitions,
            start_time,
            duration,
            time_remaining,
        } => {
            let lines = vec![
                field("Queue", queue.clone()),
                field("Partitions", partitions.clone()),
                field("Start", start_time.clone()),
                field("Duration", duration.clone()),
                field("Starts in", time_remaining.clone()),
            ];
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" Reservation {} ", name));
            frame.render_widget(Paragraph::new(lines).block(block), area);
        }
    }
}
