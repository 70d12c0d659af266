// ==========================================
// Motor de Asignación - Assignment Entity
// ==========================================
// The atomic unit produced and persisted by a confirmed run.
// Invariant: (registration_id, evaluator_id, phase) is unique; rows are
// append-only. Corrections are a separate operation outside this engine.
// ==========================================

use crate::domain::types::Phase;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Soft-violation tagging
// ==========================================

/// Why a placement had to relax a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelaxReason {
    /// Evaluator belongs to the registration's own institution
    SameInstitution,
    /// Evaluator was placed above cuota_por_evaluador
    QuotaExceeded,
}

impl RelaxReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelaxReason::SameInstitution => "SAME_INSTITUTION",
            RelaxReason::QuotaExceeded => "QUOTA_EXCEEDED",
        }
    }
}

/// Placement status: compliant, or relaxed with an explicit reason
/// (tagged variant rather than free text so consumers can branch on it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Compliant,
    Relaxed { reason: RelaxReason },
}

impl AssignmentStatus {
    pub fn is_relaxed(&self) -> bool {
        matches!(self, AssignmentStatus::Relaxed { .. })
    }

    /// Database label pair (status, reason)
    pub fn to_columns(&self) -> (&'static str, Option<&'static str>) {
        match self {
            AssignmentStatus::Compliant => ("COMPLIANT", None),
            AssignmentStatus::Relaxed { reason } => ("RELAXED", Some(reason.as_str())),
        }
    }

    pub fn from_columns(status: &str, reason: Option<&str>) -> Option<Self> {
        match status {
            "COMPLIANT" => Some(AssignmentStatus::Compliant),
            "RELAXED" => match reason {
                Some("SAME_INSTITUTION") => Some(AssignmentStatus::Relaxed {
                    reason: RelaxReason::SameInstitution,
                }),
                Some("QUOTA_EXCEEDED") => Some(AssignmentStatus::Relaxed {
                    reason: RelaxReason::QuotaExceeded,
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

// ==========================================
// Assignment
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: String,
    pub registration_id: String,
    pub evaluator_id: String,
    pub phase: Phase,
    pub status: AssignmentStatus,
    pub created_at: NaiveDateTime,
}

impl Assignment {
    /// Build a new assignment row with a fresh id and current timestamp
    pub fn new(
        registration_id: &str,
        evaluator_id: &str,
        phase: Phase,
        status: AssignmentStatus,
    ) -> Self {
        Self {
            assignment_id: Uuid::new_v4().to_string(),
            registration_id: registration_id.to_string(),
            evaluator_id: evaluator_id.to_string(),
            phase,
            status,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_column_round_trip() {
        let cases = [
            AssignmentStatus::Compliant,
            AssignmentStatus::Relaxed {
                reason: RelaxReason::SameInstitution,
            },
            AssignmentStatus::Relaxed {
                reason: RelaxReason::QuotaExceeded,
            },
        ];
        for status in cases {
            let (s, r) = status.to_columns();
            assert_eq!(AssignmentStatus::from_columns(s, r), Some(status));
        }
        assert_eq!(AssignmentStatus::from_columns("RELAXED", None), None);
    }

    #[test]
    fn test_new_assignment_has_distinct_ids() {
        let a = Assignment::new("i1", "e1", Phase::Final, AssignmentStatus::Compliant);
        let b = Assignment::new("i1", "e2", Phase::Final, AssignmentStatus::Compliant);
        assert_ne!(a.assignment_id, b.assignment_id);
        assert!(!a.status.is_relaxed());
    }
}
