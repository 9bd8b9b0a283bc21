// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Node color policy: node state plus optional job color hint to display color.

use serde::{Deserialize, Serialize};

use crate::feed::types::{NodeInfo, NodeStatus, Rgb};

/// Display colors that do not come from the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Idle nodes, and allocated nodes still waiting for a job color
    pub idle: Rgb,
    /// Queued job entries in the jobs menu
    pub queued: Rgb,
    /// Reservation entries in the jobs menu
    pub reserved: Rgb,
    /// Status marker while the machine is operational
    pub operational: Rgb,
    /// Status marker while the machine is under maintenance
    pub maintenance: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            idle: Rgb::WHITE,
            queued: Rgb::new(0xFF, 0xCA, 0x00),
            reserved: Rgb::new(0x12, 0x8F, 0x7C),
            operational: Rgb::new(0x12, 0x8F, 0x7C),
            maintenance: Rgb::new(0xFF, 0xCA, 0x00),
        }
    }
}

/// Result of the color policy for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "color")]
pub enum NodeColor {
    /// Rendered as an active node in this color
    Active(Rgb),
    /// Down: rendered inert, never colored
    Suppressed,
}

impl NodeColor {
    pub fn rgb(&self) -> Option<Rgb> {
        match self {
            NodeColor::Active(rgb) => Some(*rgb),
            NodeColor::Suppressed => None,
        }
    }
}

/// Map a node to its display color.
///
/// An allocated node without a hint is shown idle: the scheduler placed a job
/// there but the feed has not assigned the job a color yet.
pub fn color_for(node: &NodeInfo, palette: &Palette) -> NodeColor {
    match (node.status, node.color_hint) {
        (NodeStatus::Down, _) => NodeColor::Suppressed,
        (NodeStatus::Allocated, Some(hint)) => NodeColor::Active(hint),
        (NodeStatus::Allocated, None) | (NodeStatus::Idle, _) => NodeColor::Active(palette.idle),
    }
}
