// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::time::Instant;

use tracing::debug;

use crate::engine::catalog::JobRecord;
use crate::engine::layout::Pose;
use crate::engine::Engine;
use crate::feed::{FetchError, JobCategory};

/// Degrees the anchor turns per rotate key press
pub const ROTATE_STEP_DEG: f32 = 15.0;

/// Self-monitoring stats for the rackviz process
#[derive(Clone, Default)]
pub struct SelfStats {
    pub fps: f32,
    /// Duration of the last completed fetch in milliseconds
    pub fetch_time_ms: f32,
}

/// Application state
pub struct App {
    pub engine: Engine,
    /// Feed origin, for the title bar
    pub source: String,
    /// Job category shown in the jobs menu
    pub tab: JobCategory,
    /// Currently selected entry in the jobs menu
    pub selected: usize,
    /// Should quit
    pub should_quit: bool,
    /// Result of the last menu action that failed
    pub message: Option<String>,
    /// When the last snapshot was accepted
    pub last_update: Option<Instant>,
    pub self_stats: SelfStats,
}

impl App {
    pub fn new(engine: Engine, source: String) -> Self {
        Self {
            engine,
            source,
            tab: JobCategory::Running,
            selected: 0,
            should_quit: false,
            message: None,
            last_update: None,
            self_stats: SelfStats::default(),
        }
    }

    /// Feed a finished fetch into the engine
    pub fn on_fetch(&mut self, result: Result<String, FetchError>) {
        match result {
            Ok(text) => {
                if let Ok(outcome) = self.engine.apply_payload(&text) {
                    debug!(?outcome, "Snapshot applied");
                    self.last_update = Some(Instant::now());
                }
            }
            Err(err) => self.engine.record_fetch_error(&err),
        }
        self.clamp_selection();
    }

    /// Entries of the current tab
    pub fn records(&self) -> Vec<&JobRecord> {
        self.engine.catalog().get(self.tab).records()
    }

    pub fn selected_record(&self) -> Option<&JobRecord> {
        self.records().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.records().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
        self.selected = 0;
    }

    pub fn prev_tab(&mut self) {
        self.tab = self.tab.prev();
        self.selected = 0;
    }

    /// Move selection up
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.records().len() {
            self.selected += 1;
        }
    }

    /// Jump to top
    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    /// Jump to bottom
    pub fn select_last(&mut self) {
        self.selected = self.records().len().saturating_sub(1);
    }

    /// Run the action of the selected entry
    pub fn activate(&mut self) {
        let Some(action) = self.selected_record().map(|r| r.action.clone()) else {
            return;
        };
        self.message = self.engine.invoke(&action).err().map(|e| e.to_string());
    }

    pub fn show_all(&mut self) {
        self.engine.request_show_all();
        self.message = None;
    }

    pub fn close_detail(&mut self) {
        self.engine.close_detail();
    }

    pub fn toggle_racks(&mut self) {
        self.message = self.engine.toggle_racks().err().map(|e| e.to_string());
    }

    /// Turn the anchor about the vertical axis
    pub fn rotate_anchor(&mut self, degrees: f32) {
        let mut pose: Pose = *self.engine.anchor();
        pose.rotation.y += degrees;
        self.engine.update_anchor(pose);
    }
}
