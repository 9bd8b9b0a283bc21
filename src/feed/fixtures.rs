// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Feed payloads shared by unit tests.

use super::parser::parse_snapshot;
use super::types::{MachineSnapshot, NodeIdPattern};

pub const MAINTENANCE_FEED: &str = r#"{"maint": true, "message": "scheduled maintenance"}"#;

/// A small but complete activity feed: four nodes, one job per category.
pub fn sample_feed() -> String {
    r##"{
        "dimensions": {"racks": 2, "nodecards": 21},
        "nodeinfo": {
            "cc001.cooley": {"state": "allocated", "color": "#128F7C"},
            "cc002.cooley": {"state": "allocated"},
            "cc003.cooley": {"state": "idle"},
            "cc010.cooley": {"state": "down"}
        },
        "running": [
            {
                "jobid": "101",
                "project": "Climate",
                "color": "#128F7C",
                "runtimef": "01:30:00",
                "walltimef": "03:00:00",
                "queue": "default",
                "mode": "script",
                "location": ["cc001", "cc002"]
            }
        ],
        "queued": [
            {
                "jobid": 202,
                "project": "Lattice",
                "score": "0.842",
                "queue": "default",
                "walltimef": "06:00:00",
                "queuedtimef": "00:45:00",
                "nodes": 8,
                "mode": "script"
            }
        ],
        "reservation": [
            {
                "name": "maint-window",
                "queue": "R.maint",
                "partitions": "cc001-cc010",
                "startf": "2026-10-17 08:00",
                "durationf": "2:00:00:00",
                "tminus": "-01:00:00"
            }
        ]
    }"##
    .to_string()
}

/// Build a feed with explicit job keys per category; every node is idle.
pub fn feed_with_jobs(running: &[&str], queued: &[&str], reserved: &[&str]) -> String {
    let running: Vec<String> = running
        .iter()
        .map(|id| {
            format!(
                r##"{{"jobid": "{id}", "project": "P{id}", "color": "#3366CC", "runtimef": "00:10:00",
                    "walltimef": "01:00:00", "queue": "default", "mode": "script", "location": ["cc001"]}}"##
            )
        })
        .collect();
    let queued: Vec<String> = queued
        .iter()
        .map(|id| {
            format!(
                r#"{{"jobid": "{id}", "project": "Q{id}", "score": 1.25, "queue": "default",
                    "walltimef": "01:00:00", "queuedtimef": "00:01:00", "nodes": 1, "mode": "script"}}"#
            )
        })
        .collect();
    let reserved: Vec<String> = reserved
        .iter()
        .map(|name| {
            format!(
                r#"{{"name": "{name}", "queue": "R.{name}", "partitions": "cc001", "startf": "now",
                    "durationf": "01:00:00", "tminus": "00:30:00"}}"#
            )
        })
        .collect();

    format!(
        r#"{{"dimensions": {{"racks": 1, "nodecards": 21}},
            "nodeinfo": {{"cc001.cooley": {{"state": "idle"}}, "cc002.cooley": {{"state": "idle"}}}},
            "running": [{}], "queued": [{}], "reservation": [{}]}}"#,
        running.join(","),
        queued.join(","),
        reserved.join(",")
    )
}

/// Build a feed of `count` idle nodes named cc001.. in order, with no jobs.
pub fn feed_with_nodes(count: usize) -> String {
    let nodes: Vec<String> = (1..=count)
        .map(|i| format!(r#""cc{:03}.cooley": {{"state": "idle"}}"#, i))
        .collect();
    format!(
        r#"{{"dimensions": {{"racks": 8, "nodecards": 21}}, "nodeinfo": {{{}}},
            "running": [], "queued": [], "reservation": []}}"#,
        nodes.join(",")
    )
}

pub fn snapshot(text: &str) -> MachineSnapshot {
    parse_snapshot(text, &NodeIdPattern::default()).expect("fixture feed must parse")
}
