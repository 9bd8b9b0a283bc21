// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Headless mode: poll the feed without a terminal and print one NDJSON
//! `FrameReport` per fetch cycle to stdout.

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use serde::Serialize;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;

use crate::engine::detail::DetailSelection;
use crate::engine::{ApplyOutcome, Engine, FeedStatus};
use crate::feed::{FetchError, JobCategory};
use crate::poller::Poller;

/// Report format version
pub const REPORT_VERSION: u32 = 1;

/// State of the engine after one fetch cycle, sent as one NDJSON line.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    /// Message type discriminator (always "frame")
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub version: u32,
    /// Unix timestamp in milliseconds when the cycle completed
    pub timestamp: u64,
    pub cycle: u64,
    pub status: FeedStatus,
    pub nodes: usize,
    pub visible_nodes: usize,
    pub racks: usize,
    pub running: usize,
    pub queued: usize,
    pub reserved: usize,
    /// Present when the snapshot was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ApplyOutcome>,
    pub detail: DetailSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub consecutive_failures: u32,
    /// If this is the last report before exit, explains why
    /// Values: "completed" | "interrupted"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_reason: Option<&'static str>,
}

impl FrameReport {
    pub fn capture(engine: &Engine, cycle: u64, outcome: Option<ApplyOutcome>) -> Self {
        let catalog = engine.catalog();
        Self {
            msg_type: "frame",
            version: REPORT_VERSION,
            timestamp: Self::now(),
            cycle,
            status: engine.status(),
            nodes: engine.nodes().len(),
            visible_nodes: engine.nodes().iter().filter(|n| n.visible).count(),
            racks: engine.racks().len(),
            running: catalog.get(JobCategory::Running).len(),
            queued: catalog.get(JobCategory::Queued).len(),
            reserved: catalog.get(JobCategory::Reserved).len(),
            outcome,
            detail: engine.detail_selection().clone(),
            error: engine.last_error().map(str::to_string),
            consecutive_failures: engine.consecutive_failures(),
            final_reason: None,
        }
    }

    pub fn with_final_reason(mut self, reason: &'static str) -> Self {
        self.final_reason = Some(reason);
        self
    }

    /// Current Unix timestamp in milliseconds
    pub fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Apply one fetch result and build its report
pub fn process_cycle(engine: &mut Engine, cycle: u64, result: Result<String, FetchError>) -> FrameReport {
    let outcome = match result {
        Ok(text) => engine.apply_payload(&text).ok(),
        Err(err) => {
            engine.record_fetch_error(&err);
            None
        }
    };
    FrameReport::capture(engine, cycle, outcome)
}

/// Poll until `cycles` reports were written (forever if `None`) or Ctrl-C
pub async fn run_headless(mut engine: Engine, mut poller: Poller, cycles: Option<u64>) -> Result<()> {
    info!(source = %poller.describe(), "Headless mode starting");

    let mut stdout = io::stdout().lock();
    let mut ticker = interval(std::time::Duration::from_millis(250));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cycle = 0u64;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poller.start_if_due(Instant::now());
            }

            result = poller.completed(), if poller.is_in_flight() => {
                cycle += 1;
                let mut report = process_cycle(&mut engine, cycle, result);
                let done = cycles.is_some_and(|limit| cycle >= limit);
                if done {
                    report = report.with_final_reason("completed");
                }
                writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
                stdout.flush()?;
                if done {
                    break;
                }
            }

            _ = &mut shutdown => {
                poller.cancel();
                let report = FrameReport::capture(&engine, cycle, None).with_final_reason("interrupted");
                writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
                stdout.flush()?;
                info!("Received interrupt, exiting");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::feed::fixtures::{sample_feed, MAINTENANCE_FEED};

    #[test]
    fn test_report_after_operational_snapshot() {
        let mut engine = Engine::new(EngineConfig::default());
        let report = process_cycle(&mut engine, 1, Ok(sample_feed()));

        assert_eq!(report.status, FeedStatus::Operational);
        assert_eq!(report.nodes, 4);
        assert_eq!(report.visible_nodes, 4);
        assert_eq!(report.racks, 2);
        assert_eq!((report.running, report.queued, report.reserved), (1, 1, 1));
        assert!(report.outcome.unwrap().catalog_rebuilt);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "frame");
        assert_eq!(json["status"], "operational");
        assert_eq!(json["detail"]["category"], "none");
        assert!(json.get("error").is_none());
        assert!(json.get("final_reason").is_none());
    }

    #[test]
    fn test_report_keeps_last_good_state_on_error() {
        let mut engine = Engine::new(EngineConfig::default());
        process_cycle(&mut engine, 1, Ok(sample_feed()));
        let report = process_cycle(&mut engine, 2, Err(FetchError::Status(503)));

        assert_eq!(report.nodes, 4);
        assert!(report.outcome.is_none());
        assert_eq!(report.consecutive_failures, 1);
        assert_eq!(report.error.as_deref(), Some("feed returned HTTP 503"));
    }

    #[test]
    fn test_report_in_maintenance() {
        let mut engine = Engine::new(EngineConfig::default());
        let report = process_cycle(&mut engine, 1, Ok(MAINTENANCE_FEED.to_string())).with_final_reason("completed");

        assert_eq!(report.status, FeedStatus::Maintenance);
        assert_eq!(report.nodes, 0);
        assert_eq!(report.running, 0);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "maintenance");
        assert_eq!(json["final_reason"], "completed");
    }
}
