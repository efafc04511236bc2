//! Append-only outcome history for batches and statements.
//!
//! Every entry is created with its pessimistic mark and flipped at most once
//! to the optimistic counterpart, never the reverse. A batch is therefore
//! never reported correct unless every constituent statement both parsed and
//! executed without error. The engine never prunes history; bounding it is
//! the owning process's responsibility.

use serde::{Deserialize, Serialize};

/// Terminal classification of a batch or statement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMark {
    ApiCallError,
    ApiCallCorrect,
    CodeRunError,
    CodeRunCorrect,
}

/// Outcome of one whole batch against one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub mark: HistoryMark,
    /// Index of the slide the batch targeted.
    pub slide_idx: usize,
    /// The raw batch text as received.
    pub actions: String,
}

/// Outcome of one attempted statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementEntry {
    pub mark: HistoryMark,
    /// The statement line as received.
    pub line: String,
    /// Captured failure trace; absent on success.
    pub trace: Option<String>,
}

/// Two append-only ordered sequences: batch outcomes and statement outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    batches: Vec<BatchEntry>,
    statements: Vec<StatementEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch attempt, pre-marked as failed.
    pub fn begin_batch(&mut self, slide_idx: usize, actions: &str) {
        self.batches.push(BatchEntry {
            mark: HistoryMark::ApiCallError,
            slide_idx,
            actions: actions.to_string(),
        });
    }

    /// Flip the most recent batch entry to its optimistic mark.
    pub fn mark_batch_correct(&mut self) {
        if let Some(entry) = self.batches.last_mut() {
            entry.mark = HistoryMark::ApiCallCorrect;
        }
    }

    /// Record a statement attempt, pre-marked as failed.
    pub fn begin_statement(&mut self, line: &str) {
        self.statements.push(StatementEntry {
            mark: HistoryMark::CodeRunError,
            line: line.to_string(),
            trace: None,
        });
    }

    /// Flip the most recent statement entry to its optimistic mark.
    pub fn mark_statement_correct(&mut self) {
        if let Some(entry) = self.statements.last_mut() {
            entry.mark = HistoryMark::CodeRunCorrect;
        }
    }

    /// Attach a failure trace to the most recent statement entry.
    pub fn attach_trace(&mut self, trace: &str) {
        if let Some(entry) = self.statements.last_mut() {
            entry.trace = Some(trace.to_string());
        }
    }

    pub fn batches(&self) -> &[BatchEntry] {
        &self.batches
    }

    pub fn statements(&self) -> &[StatementEntry] {
        &self.statements
    }
}
