//! Evaluation module - the judgment attached to each relation

use std::fmt;

/// Evaluation status of a relation
///
/// `Pending` is the initial state and is reported by the backing service as
/// `NONE` (or a missing value). Any state may move to any other; `Pending` is
/// reached again through an undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EvaluationStatus {
    /// No judgment yet
    #[default]
    Pending,

    /// Relation confirmed
    Accepted,

    /// Relation rejected
    Rejected,

    /// Evaluator could not decide
    Unsure,
}

impl EvaluationStatus {
    /// All statuses, in bucket order
    pub const ALL: [EvaluationStatus; 4] = [
        EvaluationStatus::Accepted,
        EvaluationStatus::Rejected,
        EvaluationStatus::Unsure,
        EvaluationStatus::Pending,
    ];

    /// Wire name of the status (also used as the grouping bucket)
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "NONE",
            EvaluationStatus::Accepted => "ACCEPTED",
            EvaluationStatus::Rejected => "REJECTED",
            EvaluationStatus::Unsure => "UNSURE",
        }
    }

    /// Parse a wire value; unknown or empty values are treated as pending
    ///
    /// # Examples
    ///
    /// ```
    /// use ontolens_domain::EvaluationStatus;
    ///
    /// assert_eq!(EvaluationStatus::parse("accepted"), EvaluationStatus::Accepted);
    /// assert_eq!(EvaluationStatus::parse("NONE"), EvaluationStatus::Pending);
    /// assert_eq!(EvaluationStatus::parse(""), EvaluationStatus::Pending);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACCEPTED" => EvaluationStatus::Accepted,
            "REJECTED" => EvaluationStatus::Rejected,
            "UNSURE" | "UNCERTAIN" => EvaluationStatus::Unsure,
            _ => EvaluationStatus::Pending,
        }
    }

    /// Whether a judgment has been made
    pub fn is_decided(&self) -> bool {
        !matches!(self, EvaluationStatus::Pending)
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence status of an evaluation in the downstream graph store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStatus {
    /// Whether the current decision has been written downstream
    pub is_synced: bool,

    /// When it was last written (unix seconds)
    pub last_synced: Option<u64>,
}

/// The judgment attached to a relation
///
/// Owned by the relation it judges. The client never computes evaluation
/// results; it only mirrors what the server reports.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// Current status
    pub result: EvaluationStatus,

    /// Free-text reasoning
    pub justification: Option<String>,

    /// True when a human overrode an automatic evaluation
    pub is_manual: bool,

    /// When the relation was last evaluated (unix seconds)
    pub last_evaluated: Option<u64>,

    /// Downstream persistence state
    pub sync_status: SyncStatus,
}

impl Evaluation {
    /// A fresh, unjudged evaluation
    pub fn pending() -> Self {
        Self::default()
    }

    /// An evaluation with the given status and nothing else set
    pub fn with_result(result: EvaluationStatus) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }
}

/// The five server-side actions that mutate an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationAction {
    /// Ask the server for a fresh automatic judgment
    Evaluate,

    /// Force the relation to `Accepted`
    Accept,

    /// Force the relation to `Rejected`
    Reject,

    /// Return the relation to `Pending`, clearing `is_manual`
    Undo,

    /// Persist the current evaluation downstream
    Sync,
}

impl EvaluationAction {
    /// Action name, as used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationAction::Evaluate => "evaluate",
            EvaluationAction::Accept => "accept",
            EvaluationAction::Reject => "reject",
            EvaluationAction::Undo => "undo",
            EvaluationAction::Sync => "sync",
        }
    }

    /// Status the server is expected to report after this action
    ///
    /// `None` means the server decides (`Evaluate`) or the status is left as
    /// is (`Sync`).
    pub fn expected_status(&self) -> Option<EvaluationStatus> {
        match self {
            EvaluationAction::Accept => Some(EvaluationStatus::Accepted),
            EvaluationAction::Reject => Some(EvaluationStatus::Rejected),
            EvaluationAction::Undo => Some(EvaluationStatus::Pending),
            EvaluationAction::Evaluate | EvaluationAction::Sync => None,
        }
    }
}

impl fmt::Display for EvaluationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
