//! Committee track-assignment and load-balancing engine.
//!
//! Partitions conference tracks among Senior Area Chairs (SACs) so paper
//! loads stay balanced, then places Area Chairs (ACs) under SACs while
//! respecting track affinity, conflicts, and load caps.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Track`, `SeniorAreaChair`, `AreaChair`,
//!   `MatchingInput`, and the result types `LoadPlan`, `MergeOutcome`,
//!   `AcAssignment`
//! - **`assign`**: The four algorithms: primary track selection, priority
//!   load planning, track merging, AC placement
//! - **`rules`**: Scarcity and tie-break keys shared by the algorithms
//! - **`partition`**: Union-find over track ids
//! - **`metrics`**: Load disparity indicators
//! - **`handoff`**: Conversions between matching rounds
//! - **`pipeline`**: End-to-end run over a validated roster
//! - **`config`**: Engine parameters and JSON loading
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown tracks)
//!
//! # Determinism
//!
//! All inputs are ordered maps. Every tie is broken by lexicographic id,
//! so identical inputs always give identical outputs.

pub mod assign;
pub mod config;
pub mod handoff;
pub mod metrics;
pub mod models;
pub mod partition;
pub mod pipeline;
pub mod rules;
pub mod validation;
