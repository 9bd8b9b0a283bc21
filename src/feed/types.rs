// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Typed machine state produced by the snapshot parser.
//!
//! A `MachineSnapshot` is immutable once parsed. The engine keeps the last
//! good one behind an `Arc` and swaps it wholesale on every successful fetch.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// An RGB display color, written as `#RRGGBB` in the feed and in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Error for a color string that is not `#RGB` or `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct InvalidColor(pub String);

impl FromStr for Rgb {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Rgb::new(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            // Short form: each digit is doubled (#1A3 == #11AA33)
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Identity of a compute node, normalized from the feed's composite key.
///
/// `cc042.cooley` and `cc042` both normalize to name `cc042`, number 42.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct NodeId {
    name: String,
    number: u32,
}

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.name
    }
}

/// Fixed-width shape of a composite node key: `<prefix><digits>[<suffix>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeIdPattern {
    pub prefix: String,
    pub digits: usize,
    pub suffix: String,
}

impl Default for NodeIdPattern {
    fn default() -> Self {
        Self {
            prefix: "cc".to_string(),
            digits: 3,
            suffix: ".cooley".to_string(),
        }
    }
}

impl NodeIdPattern {
    /// Extract a node id from a raw key, or `None` if the key has any other shape.
    ///
    /// The suffix is optional: job allocation lists carry bare names while the
    /// node table carries fully qualified ones.
    pub fn extract(&self, raw: &str) -> Option<NodeId> {
        let rest = raw.strip_prefix(self.prefix.as_str())?;
        let digits = rest.get(..self.digits)?;
        let tail = rest.get(self.digits..)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !tail.is_empty() && tail != self.suffix {
            return None;
        }

        Some(NodeId {
            name: format!("{}{}", self.prefix, digits),
            number: digits.parse().ok()?,
        })
    }
}

/// Node state as reported by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Idle,
    Allocated,
    Down,
}

impl From<&str> for NodeStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "idle" => NodeStatus::Idle,
            "allocated" => NodeStatus::Allocated,
            // Anything the feed does not call idle or allocated is drawn inert
            _ => NodeStatus::Down,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub status: NodeStatus,
    /// Job color, only meaningful while allocated. May be missing for a job
    /// that was scheduled but has not been assigned a color yet.
    pub color_hint: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunningJob {
    pub job_id: String,
    pub project: String,
    /// `None` for a job scheduled before its display color was assigned
    pub color: Option<Rgb>,
    pub runtime_elapsed: Duration,
    pub wall_time_limit: Duration,
    pub queue: String,
    pub mode: String,
    pub allocated_node_ids: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedJob {
    pub job_id: String,
    pub project: String,
    pub score: f64,
    pub queue: String,
    pub wall_time_limit: Duration,
    pub time_queued: Duration,
    pub nodes_requested: u32,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReservedJob {
    /// Reservation name, used as identity key
    pub name: String,
    pub queue: String,
    pub partitions: String,
    /// Start time as formatted by the feed
    pub start_time: String,
    pub duration: Duration,
    pub time_remaining: Duration,
}

/// Job lifecycle category tracked by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobCategory {
    Running,
    Queued,
    Reserved,
}

impl JobCategory {
    pub const ALL: [JobCategory; 3] = [JobCategory::Running, JobCategory::Queued, JobCategory::Reserved];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::Running => "running",
            JobCategory::Queued => "queued",
            JobCategory::Reserved => "reserved",
        }
    }

    /// Cycle to the next category (for tab switching)
    pub fn next(self) -> Self {
        match self {
            JobCategory::Running => JobCategory::Queued,
            JobCategory::Queued => JobCategory::Reserved,
            JobCategory::Reserved => JobCategory::Running,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            JobCategory::Running => JobCategory::Reserved,
            JobCategory::Queued => JobCategory::Running,
            JobCategory::Reserved => JobCategory::Queued,
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed state of the cluster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineSnapshot {
    /// When set, every other field is unpopulated and must not drive the display
    pub under_maintenance: bool,
    pub rack_count: u32,
    pub nodes_per_rack: u32,
    /// Nodes in feed order (layout order)
    pub nodes: Vec<NodeInfo>,
    pub running_jobs: Vec<RunningJob>,
    pub queued_jobs: Vec<QueuedJob>,
    pub reserved_jobs: Vec<ReservedJob>,
}

impl MachineSnapshot {
    pub fn maintenance() -> Self {
        Self {
            under_maintenance: true,
            ..Default::default()
        }
    }

    /// Identity keys of the jobs in one category, in feed order
    pub fn job_keys(&self, category: JobCategory) -> Vec<&str> {
        match category {
            JobCategory::Running => self.running_jobs.iter().map(|j| j.job_id.as_str()).collect(),
            JobCategory::Queued => self.queued_jobs.iter().map(|j| j.job_id.as_str()).collect(),
            JobCategory::Reserved => self.reserved_jobs.iter().map(|j| j.name.as_str()).collect(),
        }
    }

    pub fn running_job(&self, job_id: &str) -> Option<&RunningJob> {
        self.running_jobs.iter().find(|j| j.job_id == job_id)
    }

    pub fn queued_job(&self, job_id: &str) -> Option<&QueuedJob> {
        self.queued_jobs.iter().find(|j| j.job_id == job_id)
    }

    pub fn reserved_job(&self, name: &str) -> Option<&ReservedJob> {
        self.reserved_jobs.iter().find(|j| j.name == name)
    }
}

/// Format a duration as `HH:MM:SS` (hours may exceed 24)
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format a queue score with one decimal, rounding half away from zero
pub fn format_score(score: f64) -> String {
    // Adding 0.0 turns -0.0 into 0.0
    format!("{:.1}", (score * 10.0).round() / 10.0 + 0.0)
}
