// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Reconciliation engine: folds successive snapshots into the visual model.
//!
//! Per accepted snapshot the order is fixed: layout, node colors, change
//! detection, catalog rebuild, detail refresh, node visibility. Menu requests
//! from the front-end go through the same engine so every state change is
//! applied on one task.

pub mod catalog;
pub mod change;
pub mod color;
pub mod detail;
pub mod layout;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::feed::types::{JobCategory, MachineSnapshot, NodeId, NodeIdPattern, NodeStatus, Rgb};
use crate::feed::{parse_snapshot, FetchError, ParseError};
use catalog::{JobAction, JobCatalog};
use change::{diff_category, needs_rebuild, CategoryChange};
use color::{color_for, NodeColor, Palette};
use detail::{DetailConfig, DetailPanel, DetailRefresh, DetailSelection, DetailView};
use layout::{compute_layout, GridSlot, LayoutConfig, Pose, Vec3};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub palette: Palette,
    pub node_id: NodeIdPattern,
    pub detail: DetailConfig,
}

/// What the last accepted snapshot said about the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// Nothing accepted yet
    Pending,
    Operational,
    Maintenance,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cluster data unavailable (maintenance or not loaded yet)")]
    Unavailable,

    #[error("no {category} job {key:?}")]
    UnknownJob { category: JobCategory, key: String },
}

/// A rendered compute node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: NodeId,
    /// Short label drawn on the node
    pub label: String,
    pub status: NodeStatus,
    pub color: NodeColor,
    pub slot: GridSlot,
    pub position: Vec3,
    /// False while the node is missing from the latest snapshot
    pub present: bool,
    /// False while a job filter hides the node, or while it is not present
    pub visible: bool,
}

/// A rendered rack frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualRack {
    pub index: u32,
    pub position: Vec3,
    pub visible: bool,
}

/// Status marker text and color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banner {
    pub text: &'static str,
    pub color: Rgb,
}

/// What one accepted snapshot changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub status: FeedStatus,
    pub layout_recomputed: bool,
    pub catalog_rebuilt: bool,
    pub detail_closed: bool,
    pub filter_cleared: bool,
}

/// Visual model of the machine, created on the first operational snapshot.
///
/// Nodes are keyed by id and only ever added. A node that drops out of the
/// feed keeps its slot and is hidden until it comes back.
#[derive(Debug, Clone, Default)]
struct ClusterModel {
    index: HashMap<NodeId, usize>,
    /// Rack count of the latest snapshot; racks past it are hidden
    rack_count: u32,
    yaw_deg: f32,
    nodes: Vec<VisualNode>,
    racks: Vec<VisualRack>,
}

impl ClusterModel {
    /// Add visuals for node ids and racks not seen before. Returns true if
    /// anything was added.
    fn extend(&mut self, snapshot: &MachineSnapshot, racks_visible: bool) -> bool {
        let mut grew = false;
        for node in &snapshot.nodes {
            if self.index.contains_key(&node.id) {
                continue;
            }
            self.index.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(VisualNode {
                id: node.id.clone(),
                label: format!("{:03}", node.id.number()),
                status: node.status,
                color: NodeColor::Suppressed,
                slot: GridSlot { rack: 0, row: 0, column: 0 },
                position: Vec3::ZERO,
                present: false,
                visible: false,
            });
            grew = true;
        }

        self.rack_count = snapshot.rack_count;
        while (self.racks.len() as u32) < snapshot.rack_count {
            self.racks.push(VisualRack {
                index: self.racks.len() as u32,
                position: Vec3::ZERO,
                visible: racks_visible,
            });
            grew = true;
        }
        grew
    }

    /// Position every node and rack relative to `pose`
    fn place(&mut self, pose: &Pose, config: &LayoutConfig) {
        let rack_total = self.racks.len() as u32;
        let layout = compute_layout(self.nodes.len(), rack_total, pose, config);
        if layout.racks_used > rack_total {
            warn!(
                racks_used = layout.racks_used,
                rack_count = rack_total,
                "Node grid extends past the reported rack count"
            );
        }

        self.yaw_deg = layout.yaw_deg;
        for (node, placement) in self.nodes.iter_mut().zip(&layout.nodes) {
            node.slot = placement.slot;
            node.position = placement.position;
        }
        for (rack, position) in self.racks.iter_mut().zip(&layout.racks) {
            rack.position = *position;
        }
    }

    fn recolor(&mut self, snapshot: &MachineSnapshot, palette: &Palette) {
        for visual in &mut self.nodes {
            visual.present = false;
        }
        for node in &snapshot.nodes {
            if let Some(visual) = self.index.get(&node.id).and_then(|&i| self.nodes.get_mut(i)) {
                visual.status = node.status;
                visual.color = color_for(node, palette);
                visual.present = true;
            }
        }
        for visual in self.nodes.iter_mut().filter(|n| !n.present) {
            visual.color = NodeColor::Suppressed;
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    status: FeedStatus,
    /// Last accepted operational snapshot
    snapshot: Option<Arc<MachineSnapshot>>,
    cluster: Option<ClusterModel>,
    anchor: Pose,
    catalog: JobCatalog,
    detail: DetailPanel,
    /// Running job whose nodes are the only ones shown
    filter: Option<String>,
    racks_visible: bool,
    consecutive_failures: u32,
    last_error: Option<String>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let detail = DetailPanel::new(&config.detail);
        Self {
            config,
            status: FeedStatus::Pending,
            snapshot: None,
            cluster: None,
            anchor: Pose::default(),
            catalog: JobCatalog::default(),
            detail,
            filter: None,
            racks_visible: true,
            consecutive_failures: 0,
            last_error: None,
        }
    }

    /// Parse a raw payload and apply it. On a parse error the previous state
    /// is kept and the failure is recorded.
    pub fn apply_payload(&mut self, text: &str) -> Result<ApplyOutcome, ParseError> {
        match parse_snapshot(text, &self.config.node_id) {
            Ok(snapshot) => Ok(self.apply_snapshot(snapshot)),
            Err(err) => {
                warn!(error = %err, "Discarding unparseable snapshot");
                self.record_failure(err.to_string());
                Err(err)
            }
        }
    }

    /// Record a failed fetch. The previous snapshot stays displayed.
    pub fn record_fetch_error(&mut self, err: &FetchError) {
        warn!(error = %err, "Feed fetch failed");
        self.record_failure(err.to_string());
    }

    fn record_failure(&mut self, message: String) {
        self.consecutive_failures += 1;
        self.last_error = Some(message);
    }

    pub fn apply_snapshot(&mut self, snapshot: MachineSnapshot) -> ApplyOutcome {
        self.consecutive_failures = 0;
        self.last_error = None;

        if snapshot.under_maintenance {
            if self.status != FeedStatus::Maintenance {
                info!("Machine is under maintenance");
            }
            self.status = FeedStatus::Maintenance;
            return ApplyOutcome {
                status: self.status,
                layout_recomputed: false,
                catalog_rebuilt: false,
                detail_closed: false,
                filter_cleared: false,
            };
        }

        if self.status != FeedStatus::Operational {
            info!(
                nodes = snapshot.nodes.len(),
                racks = snapshot.rack_count,
                "Machine is operational"
            );
        }
        self.status = FeedStatus::Operational;

        let layout_recomputed = self.sync_cluster(&snapshot);
        let catalog_rebuilt = self.sync_catalog(&snapshot);

        let open = self.detail.selection().clone();
        let detail_closed = match self.detail.refresh(&snapshot) {
            DetailRefresh::Closed => {
                info!(
                    category = ?open.category(),
                    key = open.key(),
                    "Detail panel closed, job left the feed"
                );
                true
            }
            DetailRefresh::Updated | DetailRefresh::Unchanged => false,
        };

        let filter_cleared = match &self.filter {
            Some(job_id) if snapshot.running_job(job_id).is_none() => {
                info!(job_id = %job_id, "Node filter cleared, job left the feed");
                self.filter = None;
                true
            }
            _ => false,
        };

        self.snapshot = Some(Arc::new(snapshot));
        self.apply_visibility();

        ApplyOutcome {
            status: self.status,
            layout_recomputed,
            catalog_rebuilt,
            detail_closed,
            filter_cleared,
        }
    }

    /// Create or grow the visual model. Returns true if positions were recomputed.
    fn sync_cluster(&mut self, snapshot: &MachineSnapshot) -> bool {
        let cluster = self.cluster.get_or_insert_with(ClusterModel::default);
        let grew = cluster.extend(snapshot, self.racks_visible);

        if grew {
            debug!(nodes = cluster.nodes.len(), racks = cluster.racks.len(), "Laying out cluster");
            let per_rack = self.config.layout.nodes_per_rack();
            if snapshot.nodes_per_rack != 0 && snapshot.nodes_per_rack != per_rack {
                warn!(
                    feed = snapshot.nodes_per_rack,
                    layout = per_rack,
                    "Feed reports a different number of nodes per rack than the layout grid holds"
                );
            }
            cluster.place(&self.anchor, &self.config.layout);
        }
        cluster.recolor(snapshot, &self.config.palette);

        grew
    }

    /// Rebuild the catalog if any category's key set moved
    fn sync_catalog(&mut self, snapshot: &MachineSnapshot) -> bool {
        let keys = self.catalog.keys();
        if !needs_rebuild(&keys, snapshot) {
            return false;
        }

        for category in JobCategory::ALL {
            if let CategoryChange::Changed(diff) = diff_category(&keys, snapshot, category) {
                debug!(
                    %category,
                    added = ?diff.added,
                    removed = ?diff.removed,
                    "Job keys changed"
                );
            }
        }
        self.catalog.rebuild(snapshot, &self.config.palette);
        true
    }

    fn apply_visibility(&mut self) {
        let Some(cluster) = self.cluster.as_mut() else {
            return;
        };

        let allowed: Option<HashSet<&NodeId>> = match (&self.filter, &self.snapshot) {
            (Some(job_id), Some(snapshot)) => snapshot
                .running_job(job_id)
                .map(|job| job.allocated_node_ids.iter().collect()),
            _ => None,
        };

        for node in &mut cluster.nodes {
            node.visible = node.present && allowed.as_ref().map_or(true, |ids| ids.contains(&node.id));
        }
        let rack_count = cluster.rack_count;
        for rack in &mut cluster.racks {
            rack.visible = self.racks_visible && rack.index < rack_count;
        }
    }

    /// Move the tracked anchor. The cluster is re-placed if it exists.
    pub fn update_anchor(&mut self, pose: Pose) {
        self.anchor = pose;
        if let Some(cluster) = self.cluster.as_mut() {
            cluster.place(&self.anchor, &self.config.layout);
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn anchor(&self) -> &Pose {
        &self.anchor
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn is_operational(&self) -> bool {
        self.status == FeedStatus::Operational
    }

    pub fn banner(&self) -> Banner {
        let palette = &self.config.palette;
        match self.status {
            FeedStatus::Pending => Banner {
                text: "waiting for feed",
                color: palette.idle,
            },
            FeedStatus::Operational => Banner {
                text: "operational",
                color: palette.operational,
            },
            FeedStatus::Maintenance => Banner {
                text: "under maintenance",
                color: palette.maintenance,
            },
        }
    }

    pub fn nodes(&self) -> &[VisualNode] {
        self.cluster.as_ref().map(|c| c.nodes.as_slice()).unwrap_or_default()
    }

    pub fn racks(&self) -> &[VisualRack] {
        self.cluster.as_ref().map(|c| c.racks.as_slice()).unwrap_or_default()
    }

    /// Yaw the cluster was last placed with, in degrees
    pub fn cluster_yaw(&self) -> Option<f32> {
        self.cluster.as_ref().map(|c| c.yaw_deg)
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    /// The jobs menu is only offered once there is something to list
    pub fn jobs_menu_ready(&self) -> bool {
        self.is_operational() && self.catalog.is_loaded()
    }

    pub fn detail_view(&self) -> Option<&DetailView> {
        self.detail.view()
    }

    pub fn detail_selection(&self) -> &DetailSelection {
        self.detail.selection()
    }

    /// Running job currently filtering the node view
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn racks_visible(&self) -> bool {
        self.racks_visible
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn available_snapshot(&self) -> Result<Arc<MachineSnapshot>, EngineError> {
        match (&self.snapshot, self.status) {
            (Some(snapshot), FeedStatus::Operational) => Ok(Arc::clone(snapshot)),
            _ => Err(EngineError::Unavailable),
        }
    }

    /// Show only the nodes of running job `job_id` and open its detail panel
    pub fn request_filter_by_job(&mut self, job_id: &str) -> Result<(), EngineError> {
        let snapshot = self.available_snapshot()?;
        if !self.detail.open(DetailSelection::Running(job_id.to_string()), &snapshot) {
            return Err(EngineError::UnknownJob {
                category: JobCategory::Running,
                key: job_id.to_string(),
            });
        }

        debug!(job_id, "Filtering nodes by job");
        self.filter = Some(job_id.to_string());
        self.apply_visibility();
        Ok(())
    }

    /// Drop the node filter
    pub fn request_show_all(&mut self) {
        if self.filter.take().is_some() {
            debug!("Showing all nodes");
            self.apply_visibility();
        }
    }

    /// Open the detail panel for one job without touching the node filter
    pub fn request_job_detail(&mut self, category: JobCategory, key: &str) -> Result<(), EngineError> {
        let snapshot = self.available_snapshot()?;
        if self.detail.open(DetailSelection::new(category, key), &snapshot) {
            Ok(())
        } else {
            Err(EngineError::UnknownJob {
                category,
                key: key.to_string(),
            })
        }
    }

    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    /// Perform the action attached to a catalog entry
    pub fn invoke(&mut self, action: &JobAction) -> Result<(), EngineError> {
        debug!(category = %action.category(), key = action.key(), "Menu action");
        match action {
            JobAction::FilterRunning(job_id) => self.request_filter_by_job(job_id),
            JobAction::ShowQueued(key) => self.request_job_detail(JobCategory::Queued, key),
            JobAction::ShowReserved(key) => self.request_job_detail(JobCategory::Reserved, key),
        }
    }

    /// Show or hide the rack frames. Returns the new visibility.
    pub fn toggle_racks(&mut self) -> Result<bool, EngineError> {
        self.available_snapshot()?;
        self.racks_visible = !self.racks_visible;
        self.apply_visibility();
        Ok(self.racks_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fixtures::{feed_with_jobs, feed_with_nodes, sample_feed, MAINTENANCE_FEED};

    fn engine() -> Engine {
        Engine::new(EngineConfig::default())
    }

    fn visible_ids(engine: &Engine) -> Vec<&str> {
        engine
            .nodes()
            .iter()
            .filter(|n| n.visible)
            .map(|n| n.id.as_str())
            .collect()
    }

    #[test]
    fn test_maintenance_first_populates_nothing() {
        let mut engine = engine();
        let outcome = engine.apply_payload(MAINTENANCE_FEED).unwrap();

        assert_eq!(outcome.status, FeedStatus::Maintenance);
        assert!(!engine.is_operational());
        assert!(engine.nodes().is_empty());
        assert!(engine.racks().is_empty());
        assert!(!engine.catalog().is_loaded());
        assert!(!engine.jobs_menu_ready());
        assert_eq!(engine.banner().text, "under maintenance");
        assert!(matches!(engine.request_filter_by_job("101"), Err(EngineError::Unavailable)));
        assert!(matches!(engine.toggle_racks(), Err(EngineError::Unavailable)));
    }

    #[test]
    fn test_maintenance_after_operational_keeps_model_but_disables_menu() {
        let mut engine = engine();
        engine.apply_payload(&sample_feed()).unwrap();
        assert!(engine.jobs_menu_ready());

        engine.apply_payload(MAINTENANCE_FEED).unwrap();
        assert_eq!(engine.status(), FeedStatus::Maintenance);
        assert_eq!(engine.nodes().len(), 4);
        assert!(!engine.jobs_menu_ready());
        assert!(matches!(
            engine.request_job_detail(JobCategory::Queued, "202"),
            Err(EngineError::Unavailable)
        ));

        engine.apply_payload(&sample_feed()).unwrap();
        assert!(engine.is_operational());
        assert_eq!(engine.banner().color, Palette::default().operational);
    }

    #[test]
    fn test_parse_error_keeps_last_good_state() {
        let mut engine = engine();
        engine.apply_payload(&sample_feed()).unwrap();
        let before = engine.nodes().to_vec();

        assert!(engine.apply_payload("{not json").is_err());
        assert!(engine.apply_payload(r#"{"dimensions": {}}"#).is_err());
        assert_eq!(engine.nodes(), before.as_slice());
        assert!(engine.is_operational());
        assert_eq!(engine.consecutive_failures(), 2);
        assert!(engine.last_error().is_some());

        engine.apply_payload(&sample_feed()).unwrap();
        assert_eq!(engine.consecutive_failures(), 0);
        assert_eq!(engine.last_error(), None);
    }

    #[test]
    fn test_fetch_error_is_recorded() {
        let mut engine = engine();
        engine.record_fetch_error(&FetchError::Status(503));
        assert_eq!(engine.consecutive_failures(), 1);
        assert_eq!(engine.last_error(), Some("feed returned HTTP 503"));
        assert_eq!(engine.status(), FeedStatus::Pending);
    }

    #[test]
    fn test_node_colors_follow_policy() {
        let mut engine = engine();
        engine.apply_payload(&sample_feed()).unwrap();

        let nodes = engine.nodes();
        assert_eq!(nodes[0].color, NodeColor::Active(Rgb::new(0x12, 0x8F, 0x7C)));
        assert_eq!(nodes[1].color, NodeColor::Active(Rgb::WHITE));
        assert_eq!(nodes[2].color, NodeColor::Active(Rgb::WHITE));
        assert_eq!(nodes[3].color, NodeColor::Suppressed);
        assert_eq!(nodes[3].label, "010");
    }

    #[test]
    fn test_catalog_rebuilt_only_on_key_change() {
        let mut engine = engine();
        assert!(engine.apply_payload(&feed_with_jobs(&["1", "2"], &[], &[])).unwrap().catalog_rebuilt);
        assert!(!engine.apply_payload(&feed_with_jobs(&["2", "1"], &[], &[])).unwrap().catalog_rebuilt);
        assert!(engine.apply_payload(&feed_with_jobs(&["1", "2"], &["3"], &[])).unwrap().catalog_rebuilt);
    }

    #[test]
    fn test_layout_recomputed_only_when_nodes_change() {
        let mut engine = engine();
        assert!(engine.apply_payload(&feed_with_nodes(30)).unwrap().layout_recomputed);
        assert!(!engine.apply_payload(&feed_with_nodes(30)).unwrap().layout_recomputed);
        assert!(engine.apply_payload(&feed_with_nodes(31)).unwrap().layout_recomputed);

        let slot = engine.nodes()[21].slot;
        assert_eq!(slot, GridSlot { rack: 1, row: 0, column: 0 });
    }

    #[test]
    fn test_nodes_survive_leaving_the_feed() {
        let mut engine = engine();
        engine.apply_payload(&feed_with_nodes(25)).unwrap();
        let slot_22 = engine.nodes()[21].slot;
        assert_eq!(slot_22, GridSlot { rack: 1, row: 0, column: 0 });

        let without_first = feed_with_nodes(25).replace(r#""cc001.cooley": {"state": "idle"},"#, "");
        let outcome = engine.apply_payload(&without_first).unwrap();
        assert!(!outcome.layout_recomputed);
        assert_eq!(engine.nodes().len(), 25);
        assert_eq!(engine.nodes()[0].label, "001");
        assert!(!engine.nodes()[0].present);
        assert!(!engine.nodes()[0].visible);
        assert_eq!(engine.nodes()[0].color, NodeColor::Suppressed);
        assert_eq!(engine.nodes()[21].slot, slot_22);
        assert_eq!(visible_ids(&engine).len(), 24);

        let outcome = engine.apply_payload(&feed_with_nodes(25)).unwrap();
        assert!(!outcome.layout_recomputed);
        assert!(engine.nodes()[0].present);
        assert!(engine.nodes()[0].visible);
        assert_eq!(engine.nodes()[0].slot, GridSlot { rack: 0, row: 0, column: 0 });
        assert_eq!(visible_ids(&engine).len(), 25);
    }

    #[test]
    fn test_running_job_without_color_uses_idle_entry_color() {
        let mut engine = engine();
        for color in ["\"\"", "null"] {
            let feed = sample_feed().replace("\"color\": \"#128F7C\",", &format!("\"color\": {color},"));
            engine.apply_payload(&feed).unwrap();
            assert_eq!(engine.consecutive_failures(), 0);
            let record = engine.catalog().record(JobCategory::Running, "101").unwrap();
            assert_eq!(record.color, Palette::default().idle);
        }
    }

    #[test]
    fn test_update_anchor_moves_cluster() {
        let mut engine = engine();
        engine.update_anchor(Pose {
            position: Vec3::new(1.0, 0.0, 0.0),
            ..Pose::default()
        });
        engine.apply_payload(&feed_with_nodes(3)).unwrap();
        let before = engine.nodes()[0].position;

        engine.update_anchor(Pose {
            position: Vec3::new(3.0, 0.0, 0.0),
            ..Pose::default()
        });
        let after = engine.nodes()[0].position;
        assert!((after.x - before.x - 2.0).abs() < 1e-4);

        // Same pose again is a no-op on positions
        engine.update_anchor(*engine.anchor());
        assert_eq!(engine.nodes()[0].position, after);
    }

    #[test]
    fn test_filter_by_running_job() {
        let mut engine = engine();
        engine.apply_payload(&sample_feed()).unwrap();

        let action = engine.catalog().record(JobCategory::Running, "101").unwrap().action.clone();
        engine.invoke(&action).unwrap();

        assert_eq!(engine.filter(), Some("101"));
        assert_eq!(visible_ids(&engine), vec!["cc001", "cc002"]);
        assert_eq!(engine.detail_selection(), &DetailSelection::Running("101".to_string()));

        engine.request_show_all();
        assert_eq!(engine.filter(), None);
        assert_eq!(visible_ids(&engine).len(), 4);
        // Show-all leaves the panel open
        assert!(engine.detail_view().is_some());
    }

    #[test]
    fn test_unknown_job_is_rejected() {
        let mut engine = engine();
        engine.apply_payload(&sample_feed()).unwrap();

        assert!(matches!(
            engine.request_filter_by_job("999"),
            Err(EngineError::UnknownJob { category: JobCategory::Running, .. })
        ));
        assert_eq!(engine.filter(), None);
        assert!(engine.detail_view().is_none());
    }

    #[test]
    fn test_open_panel_closes_when_job_disappears() {
        let mut engine = engine();
        engine.apply_payload(&feed_with_jobs(&["1", "2"], &[], &[])).unwrap();
        engine.request_filter_by_job("1").unwrap();

        let outcome = engine.apply_payload(&feed_with_jobs(&["2"], &[], &[])).unwrap();
        assert!(outcome.detail_closed);
        assert!(outcome.filter_cleared);
        assert!(engine.detail_view().is_none());
        assert_eq!(engine.filter(), None);
        assert!(engine.nodes().iter().all(|n| n.visible));
    }

    #[test]
    fn test_queued_and_reserved_details() {
        let mut engine = engine();
        engine.apply_payload(&sample_feed()).unwrap();

        engine.request_job_detail(JobCategory::Queued, "202").unwrap();
        assert!(matches!(engine.detail_view(), Some(DetailView::Queued { score, .. }) if score == "0.8"));

        engine.invoke(&JobAction::ShowReserved("maint-window".to_string())).unwrap();
        assert!(matches!(engine.detail_view(), Some(DetailView::Reserved { .. })));
        assert_eq!(engine.filter(), None);

        engine.close_detail();
        assert!(engine.detail_view().is_none());
    }

    #[test]
    fn test_toggle_racks() {
        let mut engine = engine();
        engine.apply_payload(&sample_feed()).unwrap();
        assert_eq!(engine.racks().len(), 2);

        assert!(!engine.toggle_racks().unwrap());
        assert!(engine.racks().iter().all(|r| !r.visible));
        assert!(engine.toggle_racks().unwrap());
        assert!(engine.racks().iter().all(|r| r.visible));
    }
}
