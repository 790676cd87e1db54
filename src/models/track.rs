//! Track model.
//!
//! A track is a named partition of submissions (e.g., a subject area).
//! It carries its submission count and an ordered list of semantically
//! adjacent tracks used when tracks have to be merged.

use serde::{Deserialize, Serialize};

/// A submission track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier.
    pub id: String,
    /// Number of submissions in the track.
    pub paper_count: u32,
    /// Other track ids, nearest semantic neighbor first.
    pub fallback_adjacency: Vec<String>,
}

impl Track {
    /// Creates an empty track.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            paper_count: 0,
            fallback_adjacency: Vec::new(),
        }
    }

    /// Sets the number of submissions.
    pub fn with_paper_count(mut self, paper_count: u32) -> Self {
        self.paper_count = paper_count;
        self
    }

    /// Appends a fallback neighbor (call in nearest-first order).
    pub fn with_fallback(mut self, track_id: impl Into<String>) -> Self {
        self.fallback_adjacency.push(track_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_builder() {
        let t = Track::new("NLP")
            .with_paper_count(120)
            .with_fallback("ML")
            .with_fallback("IR");

        assert_eq!(t.id, "NLP");
        assert_eq!(t.paper_count, 120);
        assert_eq!(t.fallback_adjacency, vec!["ML", "IR"]);
    }
}
