//! Track partitioning and AC placement passes.
//!
//! Data flows `TrackAssigner → TrackMerger` (or `LoadPlanner` alone, the
//! alternative strategy) `→ AreaChairAssigner`, which consumes whichever
//! SAC → tracks membership the caller selected.
//!
//! All passes are synchronous and stateless: every call builds its working
//! set from the caller's maps and returns fresh result maps.
//!
//! # Reference
//! Tarjan (1975), union-find with path compression

mod area_chair;
mod load_plan;
mod merge;
mod primary;

pub use area_chair::{AcAssignmentRequest, AreaChairAssigner};
pub use load_plan::{equal_split, LoadPlanner, ShareChange, ShareDelta};
pub use merge::{semantic_distance, TrackMerger};
pub use primary::TrackAssigner;
