//! Data model shared across the pipeline stages.

use serde::{Deserialize, Serialize};

/// Caller-supplied complexity level, clamped to [1, 5].
///
/// Maps to the iteration count embedded in the decomposition instruction as
/// a sizing hint (identity mapping: level 3 asks for 3 subtasks). A hint
/// only - the model's output is not forced to that count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Complexity(u8);

impl Complexity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Clamps out-of-range input to the nearest bound.
    pub fn new(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Number of subtasks suggested to the decomposition instruction.
    pub fn iterations(self) -> u8 {
        self.0
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// One subtask paired with the code the model produced for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskResult {
    pub task: String,
    pub result: String,
}

/// Aggregate outcome of one `process` call. Immutable once constructed;
/// cached snapshots are returned unchanged, `processing_time` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub original_prompt: String,
    pub complexity_level: Complexity,
    /// Elapsed wall-clock time, formatted as a duration string.
    pub processing_time: String,
    /// Ordered by subtask-submission order, not completion order.
    pub subtask_results: Vec<SubtaskResult>,
    pub final_result: String,
}
