// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Where feed payloads come from: an HTTP endpoint or a local file.
//!
//! A fetch returns a boxed `'static` future so the poller can hold it across
//! loop iterations and cancel it by dropping it.

use std::path::PathBuf;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Transport-level failure. The cycle is skipped and retried on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(u16),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
}

/// A single idempotent read of the feed payload
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<String, FetchError>>;

    /// Human readable origin for logs and the status line
    fn describe(&self) -> String;
}

/// Feed served over HTTP(S)
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl FeedSource for HttpFeed {
    fn fetch(&self) -> BoxFuture<'static, Result<String, FetchError>> {
        let request = self.client.get(&self.url);
        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        }
        .boxed()
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Feed read from a local JSON file (re-read on every fetch)
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeedSource for FileFeed {
    fn fetch(&self) -> BoxFuture<'static, Result<String, FetchError>> {
        let path = self.path.clone();
        async move { Ok(tokio::fs::read_to_string(&path).await?) }.boxed()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
