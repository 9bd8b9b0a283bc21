// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Front view of the racks: one cell per node at its grid slot.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::rgb;
use crate::app::App;
use crate::engine::color::NodeColor;
use crate::engine::{FeedStatus, VisualNode};

/// Width of one node cell ("001 ")
const CELL_WIDTH: u16 = 4;
const RACK_BORDER: Color = Color::Gray;
const HIDDEN_NODE: Color = Color::DarkGray;

pub fn render_racks(frame: &mut Frame, area: Rect, app: &App) {
    let engine = &app.engine;

    let title = match engine.cluster_yaw() {
        Some(yaw) => format!(" Racks (yaw {:.0}) ", yaw),
        None => " Racks ".to_string(),
    };
    let border_style = match engine.status() {
        FeedStatus::Maintenance => Style::default().fg(rgb(engine.banner().color)),
        FeedStatus::Operational | FeedStatus::Pending => Style::default(),
    };
    let block = Block::default().borders(Borders::ALL).border_style(border_style).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let nodes = engine.nodes();
    if nodes.is_empty() {
        let text = match engine.status() {
            FeedStatus::Maintenance => "Cluster under maintenance - node data unavailable",
            FeedStatus::Pending | FeedStatus::Operational => "Waiting for feed...",
        };
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(paragraph, inner);
        return;
    }

    let layout = &engine.config().layout;
    let lines = grid_lines(
        nodes,
        engine.racks().len(),
        layout.columns.max(1) as usize,
        layout.rows.max(1) as usize,
        engine.racks_visible(),
        inner.width,
    );
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Lay the racks out left to right, wrapping into bands when they do not fit
fn grid_lines(
    nodes: &[VisualNode],
    rack_count: usize,
    columns: usize,
    rows: usize,
    racks_visible: bool,
    width: u16,
) -> Vec<Line<'static>> {
    let used = nodes.iter().map(|n| n.slot.rack as usize + 1).max().unwrap_or(0);
    let rack_total = rack_count.max(used);

    // grid[rack][row][column]
    let mut grid: Vec<Vec<Vec<Option<&VisualNode>>>> = vec![vec![vec![None; columns]; rows]; rack_total];
    for node in nodes {
        let (rack, row, column) = (node.slot.rack as usize, node.slot.row as usize, node.slot.column as usize);
        if let Some(cell) = grid.get_mut(rack).and_then(|r| r.get_mut(row)).and_then(|r| r.get_mut(column)) {
            *cell = Some(node);
        }
    }

    let rack_width = columns as u16 * CELL_WIDTH + 2;
    let per_band = ((width / rack_width) as usize).max(1);

    let mut lines = Vec::new();
    for band_start in (0..rack_total).step_by(per_band) {
        let band = band_start..(band_start + per_band).min(rack_total);

        if racks_visible {
            let header: Vec<Span> = band
                .clone()
                .map(|rack| {
                    Span::styled(
                        format!("{:<width$}", format!("  R{}", rack), width = rack_width as usize),
                        Style::default().fg(RACK_BORDER).add_modifier(Modifier::BOLD),
                    )
                })
                .collect();
            lines.push(Line::from(header));
        }

        for row in 0..rows {
            let mut spans = Vec::new();
            for rack in band.clone() {
                spans.push(rack_edge(racks_visible));
                for column in 0..columns {
                    spans.extend(node_cell(grid[rack][row][column]));
                }
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::default());
    }
    lines
}

fn rack_edge(racks_visible: bool) -> Span<'static> {
    if racks_visible {
        Span::styled("│", Style::default().fg(RACK_BORDER))
    } else {
        Span::raw(" ")
    }
}

fn node_cell(node: Option<&VisualNode>) -> [Span<'static>; 2] {
    let Some(node) = node else {
        return [Span::raw("   "), Span::raw(" ")];
    };
    let label = node.label.clone();

    let cell = if !node.visible {
        Span::styled(" · ", Style::default().fg(HIDDEN_NODE))
    } else {
        match node.color {
            NodeColor::Active(color) => Span::styled(label, Style::default().fg(Color::Black).bg(rgb(color))),
            NodeColor::Suppressed => Span::styled(label, Style::default().fg(HIDDEN_NODE).add_modifier(Modifier::DIM)),
        }
    };
    [cell, Span::raw(" ")]
}
