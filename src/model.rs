//! Core data model: problem stubs and enriched problem records

/// Minimal identity for a solved problem, as parsed from the listing
///
/// Identity is `name`, which is unique within one crawl. `href` is the
/// problem's canonical path on the judge site (e.g. `/problems/hello`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemStub {
    pub name: String,
    pub href: String,
}

/// The user's placement on a problem's fastest-solutions leaderboard
///
/// Only present when the fast-path statistics lookup found the user on the
/// leaderboard; `href` is the statistics page the rank came from. Encoding
/// rank and href together keeps "rank present iff href present" true by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopPlacement {
    pub rank: String,
    pub href: String,
}

/// A problem stub enriched with runtime statistics
///
/// Runtime fields keep the site's own cell text (e.g. `"0.87s"`); the empty
/// string means the site had no value to offer, which is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemRecord {
    pub name: String,
    pub href: String,

    /// Runtime of the first row of the fastest-solutions table
    pub fastest_global: String,

    /// The user's own best accepted runtime
    pub mine: String,

    /// Leaderboard placement, if the user appeared in the top list
    pub top: Option<TopPlacement>,
}

impl ProblemRecord {
    /// Builds a record from a stub with no enrichment data yet
    pub fn from_stub(stub: ProblemStub) -> Self {
        Self {
            name: stub.name,
            href: stub.href,
            fastest_global: String::new(),
            mine: String::new(),
            top: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stub_has_empty_fields() {
        let stub = ProblemStub {
            name: "Hello World".to_string(),
            href: "/problems/hello".to_string(),
        };
        let record = ProblemRecord::from_stub(stub);

        assert_eq!(record.name, "Hello World");
        assert_eq!(record.href, "/problems/hello");
        assert_eq!(record.fastest_global, "");
        assert_eq!(record.mine, "");
        assert!(record.top.is_none());
    }
}
