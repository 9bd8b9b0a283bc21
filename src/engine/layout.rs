// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Rack/node layout: grid slots with fixed wrap thresholds, and placement of
//! the whole cluster relative to a tracked anchor pose.
//!
//! Everything here is derived from node indices and the pose; nothing is
//! accumulated between calls, so recomputing with the same inputs yields the
//! same positions.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Point or offset in meters. `y` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotate about the vertical axis by `degrees` (clockwise seen from above)
    pub fn rotate_y(self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vec3::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Real-world pose of the tracked anchor. Rotation is Euler angles in degrees
/// (pitch about x, yaw about y, roll about z).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Nodes per row before wrapping to the next row
    pub columns: u32,
    /// Rows per rack before wrapping to the next rack
    pub rows: u32,
    /// Height of the top row
    pub rack_height: f32,
    /// Distance between neighbouring racks
    pub rack_width: f32,
    pub row_step: f32,
    pub column_step: f32,
    /// Gap between the rack edge and the first column
    pub column_inset: f32,
    /// Depth of the node faces in front of the rack plane
    pub node_depth: f32,
    /// Offset of the grid origin from the anchor, in the anchor's frame
    pub anchor_offset: Vec3,
    /// Anchor pitch beyond which the yaw is taken from |yaw| + |roll|
    pub tilt_threshold_deg: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 7,
            rack_height: 2.0,
            rack_width: 0.7,
            row_step: 0.3,
            column_step: 0.2,
            column_inset: 0.1,
            node_depth: -0.2,
            anchor_offset: Vec3::new(-2.0, -0.9, -0.9),
            tilt_threshold_deg: 90.0,
        }
    }
}

impl LayoutConfig {
    pub fn nodes_per_rack(&self) -> u32 {
        self.columns.max(1) * self.rows.max(1)
    }
}

/// Grid coordinates of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridSlot {
    pub rack: u32,
    pub row: u32,
    pub column: u32,
}

/// Grid slot of the node at `index` in feed order.
///
/// Columns fill first; after `columns` nodes the row advances, after `rows`
/// rows the rack advances and the row restarts at the top.
pub fn grid_slot(index: usize, config: &LayoutConfig) -> GridSlot {
    let columns = config.columns.max(1) as usize;
    let rows = config.rows.max(1) as usize;
    GridSlot {
        rack: (index / config.nodes_per_rack() as usize) as u32,
        row: ((index / columns) % rows) as u32,
        column: (index % columns) as u32,
    }
}

/// Offset of a node from the grid origin (before anchoring)
pub fn slot_offset(slot: GridSlot, config: &LayoutConfig) -> Vec3 {
    Vec3::new(
        config.node_depth,
        config.rack_height - slot.row as f32 * config.row_step,
        slot.rack as f32 * config.rack_width + slot.column as f32 * config.column_step + config.column_inset,
    )
}

/// Offset of rack `index` from the grid origin
pub fn rack_offset(index: u32, config: &LayoutConfig) -> Vec3 {
    Vec3::new(0.0, 0.0, index as f32 * config.rack_width)
}

/// Normalize an angle to [0, 360)
pub fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Yaw that keeps the grid perpendicular to the anchor's forward axis.
///
/// When the anchor is tilted past the threshold (the tracked surface seen
/// edge-on or upside down) yaw and roll swap roles in the Euler decomposition;
/// combining their magnitudes keeps the grid from flipping between frames.
pub fn cluster_yaw(pose: &Pose, config: &LayoutConfig) -> f32 {
    let pitch = normalize_degrees(pose.rotation.x);
    let yaw = normalize_degrees(pose.rotation.y);
    let roll = normalize_degrees(pose.rotation.z);

    if pitch > config.tilt_threshold_deg {
        yaw.abs() + roll.abs()
    } else {
        yaw - roll
    }
}

/// Anchor-relative placement of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub slot: GridSlot,
    pub position: Vec3,
}

/// Placement of the whole cluster model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub yaw_deg: f32,
    /// Nodes, in the order they were given
    pub nodes: Vec<Placement>,
    /// Rack origins in world space
    pub racks: Vec<Vec3>,
    /// Number of racks the node grid actually spans
    pub racks_used: u32,
}

/// Anchor a grid-local offset to world space
pub fn anchor(local: Vec3, pose: &Pose, yaw_deg: f32, config: &LayoutConfig) -> Vec3 {
    pose.position + (config.anchor_offset + local).rotate_y(yaw_deg)
}

/// Lay out `node_count` nodes and `rack_count` racks around `pose`
pub fn compute_layout(node_count: usize, rack_count: u32, pose: &Pose, config: &LayoutConfig) -> Layout {
    let yaw_deg = cluster_yaw(pose, config);

    let nodes: Vec<Placement> = (0..node_count)
        .map(|index| {
            let slot = grid_slot(index, config);
            Placement {
                slot,
                position: anchor(slot_offset(slot, config), pose, yaw_deg, config),
            }
        })
        .collect();

    let racks = (0..rack_count)
        .map(|index| anchor(rack_offset(index, config), pose, yaw_deg, config))
        .collect();

    let racks_used = nodes.last().map(|p| p.slot.rack + 1).unwrap_or(0);

    Layout {
        yaw_deg,
        nodes,
        racks,
        racks_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        let d = a - b;
        d.x.abs() < 1e-4 && d.y.abs() < 1e-4 && d.z.abs() < 1e-4
    }

    #[test]
    fn test_grid_wrap_thresholds() {
        let config = LayoutConfig::default();

        assert_eq!(grid_slot(0, &config), GridSlot { rack: 0, row: 0, column: 0 });
        assert_eq!(grid_slot(2, &config), GridSlot { rack: 0, row: 0, column: 2 });
        assert_eq!(grid_slot(3, &config), GridSlot { rack: 0, row: 1, column: 0 });
        assert_eq!(grid_slot(20, &config), GridSlot { rack: 0, row: 6, column: 2 });
        // 3 x 7 = 21 nodes fill one rack
        assert_eq!(grid_slot(21, &config), GridSlot { rack: 1, row: 0, column: 0 });
        assert_eq!(grid_slot(45, &config), GridSlot { rack: 2, row: 1, column: 0 });
    }

    #[test]
    fn test_grid_wrap_is_configurable() {
        let config = LayoutConfig {
            columns: 2,
            rows: 2,
            ..LayoutConfig::default()
        };
        assert_eq!(config.nodes_per_rack(), 4);
        assert_eq!(grid_slot(4, &config), GridSlot { rack: 1, row: 0, column: 0 });
    }

    #[test]
    fn test_slot_offsets() {
        let config = LayoutConfig::default();

        let first = slot_offset(grid_slot(0, &config), &config);
        assert!(approx(first, Vec3::new(-0.2, 2.0, 0.1)));

        let last_in_rack = slot_offset(grid_slot(20, &config), &config);
        assert!(approx(last_in_rack, Vec3::new(-0.2, 2.0 - 6.0 * 0.3, 0.4 + 0.1)));

        // Next rack restarts at the top, shifted by one rack width
        let next_rack = slot_offset(grid_slot(21, &config), &config);
        assert!(approx(next_rack, Vec3::new(-0.2, 2.0, 0.7 + 0.1)));
    }

    #[test]
    fn test_layout_is_idempotent() {
        let config = LayoutConfig::default();
        let pose = Pose {
            position: Vec3::new(1.0, 1.0, 1.0),
            rotation: Vec3::new(10.0, 35.0, 5.0),
        };

        let first = compute_layout(60, 3, &pose, &config);
        let second = compute_layout(60, 3, &pose, &config);
        assert_eq!(first, second);
        assert_eq!(first.racks_used, 3);
    }

    #[test]
    fn test_identity_pose_applies_anchor_offset() {
        let config = LayoutConfig::default();
        let layout = compute_layout(1, 1, &Pose::default(), &config);

        assert_eq!(layout.yaw_deg, 0.0);
        assert!(approx(layout.nodes[0].position, Vec3::new(-2.2, 1.1, -0.8)));
        assert!(approx(layout.racks[0], Vec3::new(-2.0, -0.9, -0.9)));
    }

    #[test]
    fn test_anchor_translation_moves_everything() {
        let config = LayoutConfig::default();
        let moved = Pose {
            position: Vec3::new(5.0, 0.0, -3.0),
            ..Pose::default()
        };

        let base = compute_layout(4, 1, &Pose::default(), &config);
        let shifted = compute_layout(4, 1, &moved, &config);
        for (a, b) in base.nodes.iter().zip(&shifted.nodes) {
            assert!(approx(b.position - a.position, Vec3::new(5.0, 0.0, -3.0)));
        }
    }

    #[test]
    fn test_yaw_rotation() {
        let rotated = Vec3::new(1.0, 2.0, 0.0).rotate_y(90.0);
        assert!(approx(rotated, Vec3::new(0.0, 2.0, -1.0)));
    }

    #[test]
    fn test_cluster_yaw_tilt_disambiguation() {
        let config = LayoutConfig::default();

        let upright = Pose {
            rotation: Vec3::new(30.0, 120.0, 20.0),
            ..Pose::default()
        };
        assert_eq!(cluster_yaw(&upright, &config), 100.0);

        let tilted = Pose {
            rotation: Vec3::new(100.0, 120.0, 20.0),
            ..Pose::default()
        };
        assert_eq!(cluster_yaw(&tilted, &config), 140.0);

        // Negative pitch normalizes into the tilted range (e.g. -10 == 350)
        let negative = Pose {
            rotation: Vec3::new(-10.0, 120.0, 20.0),
            ..Pose::default()
        };
        assert_eq!(cluster_yaw(&negative, &config), 140.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert!(normalize_degrees(-1e-9) < 360.0);
    }
}
