// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Detail panel: the open job's fields, re-derived from every new snapshot.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::feed::types::{format_hms, format_score, JobCategory, MachineSnapshot};

/// Which job, if any, the panel shows. At most one panel is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "category", content = "key", rename_all = "lowercase")]
pub enum DetailSelection {
    #[default]
    None,
    Running(String),
    Queued(String),
    Reserved(String),
}

impl DetailSelection {
    pub fn new(category: JobCategory, key: impl Into<String>) -> Self {
        let key = key.into();
        match category {
            JobCategory::Running => DetailSelection::Running(key),
            JobCategory::Queued => DetailSelection::Queued(key),
            JobCategory::Reserved => DetailSelection::Reserved(key),
        }
    }

    pub fn category(&self) -> Option<JobCategory> {
        match self {
            DetailSelection::None => None,
            DetailSelection::Running(_) => Some(JobCategory::Running),
            DetailSelection::Queued(_) => Some(JobCategory::Queued),
            DetailSelection::Reserved(_) => Some(JobCategory::Reserved),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            DetailSelection::None => None,
            DetailSelection::Running(key) | DetailSelection::Queued(key) | DetailSelection::Reserved(key) => {
                Some(key)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
    /// Longest wall time the machine allows; scale of the first progress bar
    pub max_walltime_hours: u64,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self { max_walltime_hours: 12 }
    }
}

/// Display fields of the open panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum DetailView {
    Running {
        job_id: String,
        project: String,
        queue: String,
        mode: String,
        runtime: String,
        wall_time: String,
        node_count: usize,
        /// Runtime relative to the machine's maximum wall time, in [0, 1]
        progress_max: f64,
        /// Runtime relative to the job's own wall time limit, in [0, 1]
        progress_limit: f64,
    },
    Queued {
        job_id: String,
        project: String,
        queue: String,
        mode: String,
        score: String,
        wall_time: String,
        time_queued: String,
        nodes_requested: u32,
    },
    Reserved {
        name: String,
        queue: String,
        partitions: String,
        start_time: String,
        duration: String,
        time_remaining: String,
    },
}

/// Outcome of re-deriving the panel from a new snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailRefresh {
    /// Nothing open, or the fields did not change
    Unchanged,
    Updated,
    /// The open job left the snapshot, the panel closed itself
    Closed,
}

/// `numerator / denominator` clamped to [0, 1]; 0 for a zero denominator
pub fn progress_ratio(numerator: Duration, denominator: Duration) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    (numerator.as_secs_f64() / denominator.as_secs_f64()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct DetailPanel {
    selection: DetailSelection,
    view: Option<DetailView>,
    max_walltime: Duration,
}

impl DetailPanel {
    pub fn new(config: &DetailConfig) -> Self {
        Self {
            selection: DetailSelection::None,
            view: None,
            max_walltime: Duration::from_secs(config.max_walltime_hours.saturating_mul(3600)),
        }
    }

    pub fn selection(&self) -> &DetailSelection {
        &self.selection
    }

    pub fn view(&self) -> Option<&DetailView> {
        self.view.as_ref()
    }

    /// Open the panel for `selection`, replacing whatever was open.
    ///
    /// Returns false, leaving the panel untouched, if the job is not in
    /// `snapshot`.
    pub fn open(&mut self, selection: DetailSelection, snapshot: &MachineSnapshot) -> bool {
        if selection == DetailSelection::None {
            self.close();
            return true;
        }
        match self.build_view(&selection, snapshot) {
            Some(view) => {
                self.selection = selection;
                self.view = Some(view);
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self) {
        self.selection = DetailSelection::None;
        self.view = None;
    }

    /// Re-derive the open panel from `snapshot`, closing it if its job is gone
    pub fn refresh(&mut self, snapshot: &MachineSnapshot) -> DetailRefresh {
        if self.selection == DetailSelection::None {
            return DetailRefresh::Unchanged;
        }

        match self.build_view(&self.selection, snapshot) {
            None => {
                self.close();
                DetailRefresh::Closed
            }
            Some(view) if self.view.as_ref() == Some(&view) => DetailRefresh::Unchanged,
            Some(view) => {
                self.view = Some(view);
                DetailRefresh::Updated
            }
        }
    }

    fn build_view(&self, selection: &DetailSelection, snapshot: &MachineSnapshot) -> Option<DetailView> {
        match selection {
            DetailSelection::None => None,
            DetailSelection::Running(key) => snapshot.running_job(key).map(|job| DetailView::Running {
                job_id: job.job_id.clone(),
                project: job.project.clone(),
                queue: job.queue.clone(),
                mode: job.mode.clone(),
                runtime: format_hms(job.runtime_elapsed),
                wall_time: format_hms(job.wall_time_limit),
                node_count: job.allocated_node_ids.len(),
                progress_max: progress_ratio(job.runtime_elapsed, self.max_walltime),
                progress_limit: progress_ratio(job.runtime_elapsed, job.wall_time_limit),
            }),
            DetailSelection::Queued(key) => snapshot.queued_job(key).map(|job| DetailView::Queued {
                job_id: job.job_id.clone(),
                project: job.project.clone(),
                queue: job.queue.clone(),
                mode: job.mode.clone(),
                score: format_score(job.score),
                wall_time: format_hms(job.wall_time_limit),
                time_queued: format_hms(job.time_queued),
                nodes_requested: job.nodes_requested,
            }),
            DetailSelection::Reserved(key) => snapshot.reserved_job(key).map(|res| DetailView::Reserved {
                name: res.name.clone(),
                queue: res.queue.clone(),
                partitions: res.partitions.clone(),
                start_time: res.start_time.clone(),
                duration: format_hms(res.duration),
                time_remaining: format_hms(res.time_remaining),
            }),
        }
    }
}
