// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Parse the cluster activity feed (JSON) into a typed `MachineSnapshot`.
//!
//! Parsing is all-or-nothing: any malformed node key, color, duration or a
//! duplicated identity key rejects the whole payload, so the engine keeps
//! displaying the previous snapshot.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{
    InvalidColor, MachineSnapshot, NodeIdPattern, NodeInfo, NodeStatus, QueuedJob, ReservedJob, Rgb,
    RunningJob,
};

/// Top-level key whose presence means the machine is under maintenance
pub const MAINTENANCE_MARKER: &str = "maint";

/// Upper bound on `dimensions.racks`; one visual rack is allocated per rack
pub const MAX_RACKS: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed payload is not a JSON object")]
    NotAnObject,

    #[error("malformed node id {key:?}")]
    MalformedNodeId { key: String },

    #[error("invalid color for {context}: {source}")]
    InvalidColor {
        context: String,
        #[source]
        source: InvalidColor,
    },

    #[error("invalid duration in {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("duplicate {kind} {key:?}")]
    Duplicate { kind: &'static str, key: String },
}

/// JSON scalar that the feed sends as either a string or a number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }

    fn to_f64(&self, field: &'static str) -> Result<f64, ParseError> {
        match self {
            Scalar::Int(i) => Ok(*i as f64),
            Scalar::Float(f) => Ok(*f),
            Scalar::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseError::InvalidNumber { field, value: s.clone() }),
        }
    }

    fn to_u32(&self, field: &'static str) -> Result<u32, ParseError> {
        let invalid = || ParseError::InvalidNumber {
            field,
            value: format!("{:?}", self),
        };
        match self {
            Scalar::Int(i) => u32::try_from(*i).map_err(|_| invalid()),
            Scalar::Text(s) => s.trim().parse().map_err(|_| invalid()),
            Scalar::Float(_) => Err(invalid()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    dimensions: RawDimensions,
    nodeinfo: Map<String, Value>,
    running: Vec<RawRunningJob>,
    queued: Vec<RawQueuedJob>,
    reservation: Vec<RawReservedJob>,
}

#[derive(Debug, Deserialize)]
struct RawDimensions {
    racks: u32,
    nodecards: u32,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    state: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRunningJob {
    jobid: Scalar,
    #[serde(default)]
    project: String,
    #[serde(default)]
    color: Option<String>,
    runtimef: String,
    walltimef: String,
    #[serde(default)]
    queue: String,
    #[serde(default)]
    mode: String,
    #[serde(default)]
    location: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawQueuedJob {
    jobid: Scalar,
    #[serde(default)]
    project: String,
    score: Scalar,
    #[serde(default)]
    queue: String,
    walltimef: String,
    queuedtimef: String,
    nodes: Scalar,
    #[serde(default)]
    mode: String,
}

#[derive(Debug, Deserialize)]
struct RawReservedJob {
    name: String,
    #[serde(default)]
    queue: String,
    #[serde(default)]
    partitions: String,
    #[serde(default)]
    startf: String,
    durationf: String,
    tminus: String,
}

/// Parse a raw feed payload into a snapshot
pub fn parse_snapshot(text: &str, pattern: &NodeIdPattern) -> Result<MachineSnapshot, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = value else {
        return Err(ParseError::NotAnObject);
    };

    // Maintenance is a valid terminal state, not an error
    if map.contains_key(MAINTENANCE_MARKER) {
        return Ok(MachineSnapshot::maintenance());
    }

    let raw: RawFeed = serde_json::from_value(Value::Object(map))?;
    if raw.dimensions.racks > MAX_RACKS {
        return Err(ParseError::InvalidNumber {
            field: "dimensions.racks",
            value: raw.dimensions.racks.to_string(),
        });
    }

    let mut seen_nodes = HashSet::new();
    let mut nodes = Vec::with_capacity(raw.nodeinfo.len());
    for (key, value) in raw.nodeinfo {
        let id = pattern
            .extract(&key)
            .ok_or_else(|| ParseError::MalformedNodeId { key: key.clone() })?;
        if !seen_nodes.insert(id.clone()) {
            return Err(ParseError::Duplicate {
                kind: "node",
                key: id.to_string(),
            });
        }

        let node: RawNode = serde_json::from_value(value)?;
        let status = NodeStatus::from(node.state.as_str());
        let color_hint = parse_optional_color(node.color.as_deref(), || format!("node {}", id))?;

        nodes.push(NodeInfo { id, status, color_hint });
    }

    let running_jobs = raw
        .running
        .into_iter()
        .map(|job| convert_running(job, pattern))
        .collect::<Result<Vec<_>, _>>()?;
    check_unique("running job", running_jobs.iter().map(|j| j.job_id.as_str()))?;

    let queued_jobs = raw
        .queued
        .into_iter()
        .map(convert_queued)
        .collect::<Result<Vec<_>, _>>()?;
    check_unique("queued job", queued_jobs.iter().map(|j| j.job_id.as_str()))?;

    let reserved_jobs = raw
        .reservation
        .into_iter()
        .map(convert_reserved)
        .collect::<Result<Vec<_>, _>>()?;
    check_unique("reservation", reserved_jobs.iter().map(|j| j.name.as_str()))?;

    Ok(MachineSnapshot {
        under_maintenance: false,
        rack_count: raw.dimensions.racks,
        nodes_per_rack: raw.dimensions.nodecards,
        nodes,
        running_jobs,
        queued_jobs,
        reserved_jobs,
    })
}

fn convert_running(raw: RawRunningJob, pattern: &NodeIdPattern) -> Result<RunningJob, ParseError> {
    let job_id = raw.jobid.into_string();
    let color = parse_optional_color(raw.color.as_deref(), || format!("running job {}", job_id))?;

    let allocated_node_ids = raw
        .location
        .iter()
        .map(|name| {
            pattern
                .extract(name.trim())
                .ok_or_else(|| ParseError::MalformedNodeId { key: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RunningJob {
        runtime_elapsed: parse_duration("runtimef", &raw.runtimef)?,
        wall_time_limit: parse_duration("walltimef", &raw.walltimef)?,
        job_id,
        project: raw.project,
        color,
        queue: raw.queue,
        mode: raw.mode,
        allocated_node_ids,
    })
}

fn convert_queued(raw: RawQueuedJob) -> Result<QueuedJob, ParseError> {
    Ok(QueuedJob {
        score: raw.score.to_f64("score")?,
        wall_time_limit: parse_duration("walltimef", &raw.walltimef)?,
        time_queued: parse_duration("queuedtimef", &raw.queuedtimef)?,
        nodes_requested: raw.nodes.to_u32("nodes")?,
        job_id: raw.jobid.into_string(),
        project: raw.project,
        queue: raw.queue,
        mode: raw.mode,
    })
}

fn convert_reserved(raw: RawReservedJob) -> Result<ReservedJob, ParseError> {
    // A reservation that already started reports a negative countdown
    let time_remaining = match raw.tminus.trim().strip_prefix('-') {
        Some(elapsed) => {
            parse_duration("tminus", elapsed)?;
            Duration::ZERO
        }
        None => parse_duration("tminus", &raw.tminus)?,
    };

    Ok(ReservedJob {
        duration: parse_duration("durationf", &raw.durationf)?,
        time_remaining,
        name: raw.name,
        queue: raw.queue,
        partitions: raw.partitions,
        start_time: raw.startf,
    })
}

/// Missing, null and empty colors mean "not assigned yet"
fn parse_optional_color(hex: Option<&str>, context: impl FnOnce() -> String) -> Result<Option<Rgb>, ParseError> {
    match hex.map(str::trim) {
        None | Some("") => Ok(None),
        Some(hex) => hex.parse().map(Some).map_err(|source| ParseError::InvalidColor {
            context: context(),
            source,
        }),
    }
}

/// Parse `[D:]HH:MM:SS` or `MM:SS` into a duration
pub fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::InvalidDuration {
        field,
        value: value.to_string(),
    };

    let parts: Vec<&str> = value.trim().split(':').collect();
    if !(2..=4).contains(&parts.len()) {
        return Err(invalid());
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        numbers.push(part.parse::<u64>().map_err(|_| invalid())?);
    }

    // Every field after the leading one is bounded by its unit
    let bounds: &[u64] = match numbers.len() {
        2 => &[u64::MAX, 60],
        3 => &[u64::MAX, 60, 60],
        _ => &[u64::MAX, 24, 60, 60],
    };
    if numbers.iter().zip(bounds).any(|(n, max)| n >= max) {
        return Err(invalid());
    }

    let units: &[u64] = match numbers.len() {
        2 => &[60, 1],
        3 => &[3600, 60, 1],
        _ => &[86_400, 3600, 60, 1],
    };
    let secs = numbers
        .iter()
        .zip(units)
        .try_fold(0u64, |acc, (n, unit)| acc.checked_add(n.checked_mul(*unit)?))
        .ok_or_else(invalid)?;

    Ok(Duration::from_secs(secs))
}

fn check_unique<'a>(kind: &'static str, keys: impl Iterator<Item = &'a str>) -> Result<(), ParseError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(ParseError::Duplicate {
                kind,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}
