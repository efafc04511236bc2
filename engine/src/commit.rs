//! Commit phase: drain queued pending edits into the slide structure.
//!
//! The interpreter only queues; this is the document-model side that applies.
//! All shapes are resolved against their pre-batch structure first and written
//! back only if every shape commits cleanly, so a failing shape leaves the
//! slide untouched.

use anyhow::{Result, anyhow};

use crate::core::pending::{PendingQueues, apply_edits};
use crate::slide::{ShapeKind, SlidePage, TextFrame};

/// Apply and clear every shape's pending edits.
pub fn commit_pending(slide: &mut SlidePage) -> Result<()> {
    let mut committed: Vec<(usize, TextFrame)> = Vec::new();
    for shape in &slide.shapes {
        if shape.pending.is_empty() {
            continue;
        }
        let frame = shape.text_frame().ok_or_else(|| {
            anyhow!(
                "shape {} has pending edits but no text frame",
                shape.shape_idx
            )
        })?;
        let next = apply_edits(frame, &shape.pending)
            .map_err(|err| anyhow!("commit failed on shape {}: {err}", shape.shape_idx))?;
        committed.push((shape.shape_idx, next));
    }

    for (shape_idx, next) in committed {
        if let Some(shape) = slide.shape_mut(shape_idx) {
            if let ShapeKind::TextBox { frame } = &mut shape.kind {
                *frame = next;
            }
            shape.pending = PendingQueues::default();
        }
    }
    Ok(())
}
