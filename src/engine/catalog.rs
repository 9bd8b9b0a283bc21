// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Job catalog: the menu entries for running, queued and reserved jobs.
//!
//! The catalog is rebuilt wholesale, and only when the change detector reports
//! that some category's key set moved. Between rebuilds the entries keep their
//! identity so the front-end selection stays put.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::change::CatalogKeys;
use super::color::Palette;
use crate::feed::types::{format_score, JobCategory, MachineSnapshot, Rgb};

/// What selecting a menu entry does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "key", rename_all = "snake_case")]
pub enum JobAction {
    /// Show only the job's allocated nodes and open its detail panel
    FilterRunning(String),
    ShowQueued(String),
    ShowReserved(String),
}

impl JobAction {
    pub fn category(&self) -> JobCategory {
        match self {
            JobAction::FilterRunning(_) => JobCategory::Running,
            JobAction::ShowQueued(_) => JobCategory::Queued,
            JobAction::ShowReserved(_) => JobCategory::Reserved,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            JobAction::FilterRunning(key) | JobAction::ShowQueued(key) | JobAction::ShowReserved(key) => key,
        }
    }
}

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    /// Identity key (job id, or reservation name)
    pub key: String,
    pub title: String,
    pub subtitle: String,
    pub color: Rgb,
    pub action: JobAction,
}

/// Menu entries of one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryList {
    /// Never built
    #[default]
    NotLoaded,
    /// Built from a snapshot that had no jobs in this category
    Empty,
    /// Entries sorted by key
    Jobs(BTreeMap<String, JobRecord>),
}

impl CategoryList {
    fn from_records(records: impl IntoIterator<Item = JobRecord>) -> Self {
        let jobs: BTreeMap<String, JobRecord> = records.into_iter().map(|r| (r.key.clone(), r)).collect();
        if jobs.is_empty() {
            CategoryList::Empty
        } else {
            CategoryList::Jobs(jobs)
        }
    }

    pub fn records(&self) -> Vec<&JobRecord> {
        match self {
            CategoryList::Jobs(jobs) => jobs.values().collect(),
            CategoryList::NotLoaded | CategoryList::Empty => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CategoryList::Jobs(jobs) => jobs.len(),
            CategoryList::NotLoaded | CategoryList::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<&JobRecord> {
        match self {
            CategoryList::Jobs(jobs) => jobs.get(key),
            CategoryList::NotLoaded | CategoryList::Empty => None,
        }
    }

    fn keys(&self) -> Option<HashSet<String>> {
        match self {
            CategoryList::NotLoaded => None,
            CategoryList::Empty => Some(HashSet::new()),
            CategoryList::Jobs(jobs) => Some(jobs.keys().cloned().collect()),
        }
    }
}

/// Menu entries for every category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCatalog {
    running: CategoryList,
    queued: CategoryList,
    reserved: CategoryList,
}

impl JobCatalog {
    /// Replace every category with entries built from `snapshot`
    pub fn rebuild(&mut self, snapshot: &MachineSnapshot, palette: &Palette) {
        self.running = CategoryList::from_records(snapshot.running_jobs.iter().map(|job| JobRecord {
            key: job.job_id.clone(),
            title: job.job_id.clone(),
            subtitle: job.project.clone(),
            color: job.color.unwrap_or(palette.idle),
            action: JobAction::FilterRunning(job.job_id.clone()),
        }));

        self.queued = CategoryList::from_records(snapshot.queued_jobs.iter().map(|job| JobRecord {
            key: job.job_id.clone(),
            title: job.job_id.clone(),
            subtitle: format!("{} score {}", job.project, format_score(job.score)),
            color: palette.queued,
            action: JobAction::ShowQueued(job.job_id.clone()),
        }));

        self.reserved = CategoryList::from_records(snapshot.reserved_jobs.iter().map(|res| JobRecord {
            key: res.name.clone(),
            title: res.name.clone(),
            subtitle: res.partitions.clone(),
            color: palette.reserved,
            action: JobAction::ShowReserved(res.name.clone()),
        }));
    }

    pub fn get(&self, category: JobCategory) -> &CategoryList {
        match category {
            JobCategory::Running => &self.running,
            JobCategory::Queued => &self.queued,
            JobCategory::Reserved => &self.reserved,
        }
    }

    pub fn record(&self, category: JobCategory, key: &str) -> Option<&JobRecord> {
        self.get(category).get(key)
    }

    /// Keys currently rendered, for the change detector
    pub fn keys(&self) -> CatalogKeys {
        CatalogKeys {
            running: self.running.keys(),
            queued: self.queued.keys(),
            reserved: self.reserved.keys(),
        }
    }

    /// True once the catalog has been built at least once
    pub fn is_loaded(&self) -> bool {
        JobCategory::ALL
            .iter()
            .all(|category| !matches!(self.get(*category), CategoryList::NotLoaded))
    }
}
