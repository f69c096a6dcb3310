//! Connector capabilities
//!
//! Indexing pipelines pick how to drive a connector from the set of
//! capabilities it declares.

use serde::Serialize;
use std::fmt;

/// A way a connector can deliver documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Full load of every document in one pass
    BulkLoad,
    /// Documents changed within a time window
    IncrementalPoll,
    /// Document ids only, for pruning deleted documents
    SlimListing,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::BulkLoad => "bulk_load",
            Capability::IncrementalPoll => "incremental_poll",
            Capability::SlimListing => "slim_listing",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for capability in [
            Capability::BulkLoad,
            Capability::IncrementalPoll,
            Capability::SlimListing,
        ] {
            let json = serde_json::to_string(&capability).unwrap();
            assert_eq!(json, format!("\"{}\"", capability));
        }
    }
}
