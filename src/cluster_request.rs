//! The cluster request (C1 §3.3): a named, versioned pair of parallel maps
//! that the dispatcher consumes and fills in.

use crate::request::Request;
use crate::result::HostResult;
use std::collections::BTreeMap;

/// Semantic version tag carried by every cluster request, identifying which
/// wire-format revision of the operation's endpoints to target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A triple: the operation name, a semantic version tag, and the two
/// parallel `host -> Request` / `host -> HostResult` maps. `BTreeMap` is
/// used (rather than a hash map) so iteration order is deterministic, which
/// keeps join-all error messages and tests stable across runs.
#[derive(Debug, Clone)]
pub struct ClusterRequest {
    pub name: String,
    pub version: ApiVersion,
    pub requests: BTreeMap<String, Request>,
    pub results: BTreeMap<String, HostResult>,
}

impl ClusterRequest {
    pub fn new(name: impl Into<String>, version: ApiVersion) -> Self {
        Self {
            name: name.into(),
            version,
            requests: BTreeMap::new(),
            results: BTreeMap::new(),
        }
    }

    pub fn set_request(&mut self, host: impl Into<String>, request: Request) {
        self.requests.insert(host.into(), request);
    }

    /// The hosts this cluster request is currently scoped to.
    pub fn hosts(&self) -> Vec<String> {
        self.requests.keys().cloned().collect()
    }

    /// P1: verify the result map has exactly the same key set as the
    /// request map did at dispatch time.
    pub fn has_complete_results(&self) -> bool {
        self.requests.len() == self.results.len()
            && self.requests.keys().all(|h| self.results.contains_key(h))
    }
}
