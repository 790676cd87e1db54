//! Input validation for matching runs.
//!
//! The assignment passes assume well-formed input and never re-check it;
//! callers run these checks once at the outer surface. Detects:
//! - Duplicate IDs within a role
//! - IDs used in two roles
//! - SACs without candidate tracks
//! - References to unknown tracks
//! - Out-of-range configuration values

use std::collections::HashSet;

use thiserror::Error;

use crate::config::EngineConfig;
use crate::models::MatchingInput;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same role share an ID.
    DuplicateId,
    /// An ID appears both as a SAC and as an AC.
    RoleOverlap,
    /// A reference points to a track that doesn't exist.
    UnknownTrack,
    /// A SAC has no candidate tracks.
    EmptyCandidates,
    /// A configuration value is out of range.
    InvalidParameter,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a roster before a matching run.
///
/// Checks:
/// 1. No duplicate track, SAC, or AC IDs
/// 2. No ID is both a SAC and an AC
/// 3. Every SAC has at least one candidate track
/// 4. Every SAC candidate/priority/allowed track exists
/// 5. Every AC primary track exists
/// 6. Every fallback neighbor exists
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &MatchingInput) -> ValidationResult {
    let mut errors = Vec::new();

    let mut track_ids = HashSet::new();
    for t in &input.tracks {
        if !track_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate track ID: {}", t.id),
            ));
        }
    }

    let mut sac_ids = HashSet::new();
    for s in &input.sacs {
        if !sac_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate SAC ID: {}", s.id),
            ));
        }
    }

    let mut ac_ids = HashSet::new();
    for a in &input.acs {
        if !ac_ids.insert(a.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate AC ID: {}", a.id),
            ));
        }
        if sac_ids.contains(a.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::RoleOverlap,
                format!("'{}' is both a SAC and an AC", a.id),
            ));
        }
    }

    let mut check_track = |owner: &str, field: &str, track: &str| {
        if !track_ids.contains(track) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTrack,
                format!("{owner} {field} references unknown track '{track}'"),
            ));
        }
    };

    for s in &input.sacs {
        let owner = format!("SAC '{}'", s.id);
        for t in &s.candidate_tracks {
            check_track(&owner, "candidate", t);
        }
        for t in &s.priority_tracks {
            check_track(&owner, "priority", t);
        }
        for t in &s.allowed_tracks {
            check_track(&owner, "allowed", t);
        }
    }
    for a in &input.acs {
        if let Some(t) = &a.primary_track {
            check_track(&format!("AC '{}'", a.id), "primary", t);
        }
    }
    for t in &input.tracks {
        for n in &t.fallback_adjacency {
            check_track(&format!("Track '{}'", t.id), "fallback", n);
        }
    }

    for s in &input.sacs {
        if s.candidate_tracks.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCandidates,
                format!("SAC '{}' has no candidate tracks", s.id),
            ));
        }
    }

    into_result(errors)
}

/// Validates configuration ranges.
///
/// Checks:
/// 1. Disparity threshold is finite and non-negative
/// 2. Minimum merge score is finite
/// 3. Disparity weight is within `[0, 1]`
/// 4. Small-track fraction is within `[0, 1]`
/// 5. Iteration cap is positive
pub fn validate_config(config: &EngineConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let mut invalid = |message: String| {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            message,
        ));
    };

    let merge = &config.merge;
    if !merge.disparity_threshold.is_finite() || merge.disparity_threshold < 0.0 {
        invalid(format!(
            "merge.disparity_threshold must be finite and >= 0, got {}",
            merge.disparity_threshold
        ));
    }
    if !merge.min_merge_score.is_finite() {
        invalid(format!(
            "merge.min_merge_score must be finite, got {}",
            merge.min_merge_score
        ));
    }
    if !(0.0..=1.0).contains(&merge.disparity_weight) {
        invalid(format!(
            "merge.disparity_weight must be within [0, 1], got {}",
            merge.disparity_weight
        ));
    }

    let ptl = &config.priority_track_loads;
    if !(0.0..=1.0).contains(&ptl.small_track_percent_of_median) {
        invalid(format!(
            "priority_track_loads.small_track_percent_of_median must be within [0, 1], got {}",
            ptl.small_track_percent_of_median
        ));
    }
    if ptl.max_iterations == 0 {
        invalid("priority_track_loads.max_iterations must be positive".to_string());
    }

    into_result(errors)
}
