//! Counters for input that was skipped or merged during a rebuild

/// What a graph build dropped or collapsed
///
/// None of these are errors. Malformed entities and dangling relations are
/// skipped so ingestion never fails; duplicates are idempotent no-ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildDiagnostics {
    /// Entities missing a type or primary key
    pub malformed_entities: usize,

    /// Entities whose node already existed
    pub duplicate_entities: usize,

    /// Relations with an endpoint not present in the registry
    pub unresolved_relations: usize,

    /// Relations whose id was already seen in the same input
    pub duplicate_relations: usize,
}

impl BuildDiagnostics {
    /// Create empty diagnostics
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of inputs that did not produce a node or an edge member
    pub fn total_skipped(&self) -> usize {
        self.malformed_entities
            + self.duplicate_entities
            + self.unresolved_relations
            + self.duplicate_relations
    }

    /// Whether every input was used
    pub fn is_clean(&self) -> bool {
        self.total_skipped() == 0
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let lines = [
            "Build Diagnostics".to_string(),
            "=================".to_string(),
            format!("Malformed entities: {}", self.malformed_entities),
            format!("Duplicate entities: {}", self.duplicate_entities),
            format!("Unresolved relations: {}", self.unresolved_relations),
            format!("Duplicate relations: {}", self.duplicate_relations),
        ];
        lines.join("\n")
    }
}
