//! Committee matching domain models.
//!
//! Inputs describe tracks and the two committee tiers; outcomes describe
//! what each assignment pass produced. All ids are opaque strings.
//!
//! # Domain Mappings
//!
//! | u-committee | Conference | Journal | Grant panel |
//! |-------------|-----------|---------|-------------|
//! | Track | Subject area | Section | Program area |
//! | SeniorAreaChair | SAC | Senior editor | Panel chair |
//! | AreaChair | AC | Action editor | Panel member |

mod chair;
mod input;
mod outcome;
mod track;

pub use chair::{AreaChair, SeniorAreaChair};
pub use input::MatchingInput;
pub use outcome::{AcAssignment, LoadPlan, MergeOutcome, MergeRecord, StopReason};
pub use track::Track;
