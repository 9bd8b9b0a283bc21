// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Optional TOML configuration. Every key has a default, so an empty file (or
//! no file) describes the stock Cooley deployment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::color::Palette;
use crate::engine::detail::DetailConfig;
use crate::engine::layout::LayoutConfig;
use crate::engine::EngineConfig;
use crate::feed::NodeIdPattern;

pub const DEFAULT_FEED_URL: &str = "https://status.alcf.anl.gov/cooley/activity.json";

/// One year; longer limits are a configuration mistake
pub const MAX_WALLTIME_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    /// Read the feed from this file instead of `url`
    pub file: Option<PathBuf>,
    pub refresh_secs: u64,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            file: None,
            refresh_secs: 10,
            timeout_secs: 8,
        }
    }
}

impl FeedConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub layout: LayoutConfig,
    pub palette: Palette,
    pub node_id: NodeIdPattern,
    pub detail: DetailConfig,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.feed.refresh_secs == 0 {
            bail!("feed.refresh_secs must be at least 1");
        }
        if self.feed.timeout_secs == 0 {
            bail!("feed.timeout_secs must be at least 1");
        }
        if self.layout.columns == 0 || self.layout.rows == 0 {
            bail!(
                "layout.columns and layout.rows must be positive (got {} x {})",
                self.layout.columns,
                self.layout.rows
            );
        }
        if self.node_id.digits == 0 {
            bail!("node_id.digits must be positive");
        }
        if self.detail.max_walltime_hours == 0 || self.detail.max_walltime_hours > MAX_WALLTIME_HOURS {
            bail!(
                "detail.max_walltime_hours must be between 1 and {} (got {})",
                MAX_WALLTIME_HOURS,
                self.detail.max_walltime_hours
            );
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            layout: self.layout.clone(),
            palette: self.palette.clone(),
            node_id: self.node_id.clone(),
            detail: self.detail.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Rgb;

    #[test]
    fn test_empty_config_is_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.feed.url, DEFAULT_FEED_URL);
        assert_eq!(cfg.feed.refresh_interval(), Duration::from_secs(10));
        assert_eq!(cfg.layout.columns, 3);
        assert_eq!(cfg.layout.rows, 7);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let cfg: Config = toml::from_str(
            r##"
            [feed]
            refresh_secs = 30

            [layout]
            rows = 8
            anchor_offset = { x = -1.0, y = 0.0, z = 0.5 }

            [palette]
            idle = "#202020"

            [node_id]
            suffix = ".theta"
            "##,
        )
        .unwrap();

        assert_eq!(cfg.feed.refresh_secs, 30);
        assert_eq!(cfg.feed.timeout_secs, 8);
        assert_eq!(cfg.layout.rows, 8);
        assert_eq!(cfg.layout.columns, 3);
        assert_eq!(cfg.layout.anchor_offset.z, 0.5);
        assert_eq!(cfg.palette.idle, Rgb::new(0x20, 0x20, 0x20));
        assert_eq!(cfg.palette.queued, Palette::default().queued);
        assert_eq!(cfg.node_id.prefix, "cc");
        assert_eq!(cfg.engine_config().node_id.suffix, ".theta");
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[palette]\nidle = \"white\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let mut cfg = Config::default();
        cfg.layout.columns = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.feed.refresh_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.detail.max_walltime_hours = u64::MAX;
        assert!(cfg.validate().is_err());
        cfg.detail.max_walltime_hours = MAX_WALLTIME_HOURS;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_from_missing_file_has_context() {
        let err = Config::load_from(Path::new("/nonexistent/rackviz.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rackviz.toml"));
    }
}
