// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cluster activity feed: transport, parsing and the typed snapshot.

pub mod parser;
pub mod source;
pub mod types;

#[cfg(test)]
pub mod fixtures;

pub use parser::{parse_snapshot, ParseError};
pub use source::{FeedSource, FetchError, FileFeed, HttpFeed};
pub use types::{JobCategory, NodeIdPattern, Rgb};
