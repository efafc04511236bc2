//! Deferred mutation protocol: tagged pending edits and the pure commit step.
//!
//! Mutating operations that address a shape's internal indexing never touch
//! the text frame directly during a batch. They queue a [`PendingEdit`] into
//! one of three per-shape buckets (`delete`, `replace`, `clone`), and every
//! coordinate captured in a queued edit addresses the shape's structure as it
//! existed at batch start. [`apply_edits`] resolves all queued edits against
//! that original structure in one pass, so application order can never shift
//! an index out from under a later edit.
//!
//! Conflict rules: a replace targeting a run deleted in the same batch is
//! ignored (delete wins); cloning a paragraph whose runs were all deleted is
//! an error. Clones copy the edited form of the source paragraph and are
//! appended after the last paragraph in queue order. A paragraph emptied by
//! deletions is removed.

use std::collections::{HashMap, HashSet};

use crate::slide::{Paragraph, Run, TextFrame};

/// One queued, not-yet-applied edit bound to pre-batch coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEdit {
    DeleteRun { paragraph: usize, run: usize },
    ReplaceRun { paragraph: usize, run: usize, text: String },
    CloneParagraph { paragraph: usize },
}

/// Per-shape queues, keyed by edit kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingQueues {
    pub delete: Vec<PendingEdit>,
    pub replace: Vec<PendingEdit>,
    pub clone: Vec<PendingEdit>,
}

impl PendingQueues {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.replace.is_empty() && self.clone.is_empty()
    }

    /// Total queued edits across all buckets.
    pub fn len(&self) -> usize {
        self.delete.len() + self.replace.len() + self.clone.len()
    }
}

/// Apply queued edits to a text frame, producing the new structure.
///
/// Pure function from (original structure, pending edits) to (new structure).
/// Every coordinate is validated against the original structure; an
/// out-of-range coordinate is an error, not a silent skip.
pub fn apply_edits(frame: &TextFrame, queues: &PendingQueues) -> Result<TextFrame, String> {
    let mut deleted: HashSet<(usize, usize)> = HashSet::new();
    for edit in &queues.delete {
        let PendingEdit::DeleteRun { paragraph, run } = edit else {
            return Err(format!("delete queue holds a non-delete edit: {edit:?}"));
        };
        check_run(frame, *paragraph, *run)?;
        deleted.insert((*paragraph, *run));
    }

    let mut replaced: HashMap<(usize, usize), &str> = HashMap::new();
    for edit in &queues.replace {
        let PendingEdit::ReplaceRun { paragraph, run, text } = edit else {
            return Err(format!("replace queue holds a non-replace edit: {edit:?}"));
        };
        check_run(frame, *paragraph, *run)?;
        // Later replaces of the same run win; a deleted run stays deleted.
        replaced.insert((*paragraph, *run), text.as_str());
    }

    let mut paragraphs = Vec::with_capacity(frame.paragraphs.len());
    let mut edited: Vec<Option<Paragraph>> = Vec::with_capacity(frame.paragraphs.len());
    for (para_idx, para) in frame.paragraphs.iter().enumerate() {
        let runs: Vec<Run> = para
            .runs
            .iter()
            .enumerate()
            .filter(|(run_idx, _)| !deleted.contains(&(para_idx, *run_idx)))
            .map(|(run_idx, run)| match replaced.get(&(para_idx, run_idx)) {
                Some(text) => Run {
                    text: (*text).to_string(),
                },
                None => run.clone(),
            })
            .collect();

        let had_delete = deleted.iter().any(|(p, _)| *p == para_idx);
        if runs.is_empty() && had_delete {
            edited.push(None);
            continue;
        }
        let para = Paragraph { runs };
        edited.push(Some(para.clone()));
        paragraphs.push(para);
    }

    for edit in &queues.clone {
        let PendingEdit::CloneParagraph { paragraph } = edit else {
            return Err(format!("clone queue holds a non-clone edit: {edit:?}"));
        };
        if *paragraph >= frame.paragraphs.len() {
            return Err(format!("paragraph {paragraph} out of range"));
        }
        match &edited[*paragraph] {
            Some(para) => paragraphs.push(para.clone()),
            None => {
                return Err(format!(
                    "cannot clone paragraph {paragraph}: all of its runs were deleted"
                ));
            }
        }
    }

    Ok(TextFrame { paragraphs })
}

fn check_run(frame: &TextFrame, paragraph: usize, run: usize) -> Result<(), String> {
    let Some(para) = frame.paragraphs.get(paragraph) else {
        return Err(format!("paragraph {paragraph} out of range"));
    };
    if run >= para.runs.len() {
        return Err(format!("run {run} out of range in paragraph {paragraph}"));
    }
    Ok(())
}
