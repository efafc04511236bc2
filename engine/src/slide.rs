//! In-memory slide model at the engine's document boundary.
//!
//! The interpreter only requires that a slide yields shapes with a stable
//! integer index, that a shape exposes pending-edit queues keyed by kind, and
//! that Picture shapes are distinguishable for type guards. Shape indices are
//! assigned by the producing document model and survive deletions; they are
//! identifiers, not positions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::pending::PendingQueues;

/// One run of text within a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

/// Paragraph/run structure of a text-bearing shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

/// Shape payload distinguishing text boxes from pictures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    TextBox { frame: TextFrame },
    Picture { img_path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    /// Stable identifier within the slide; never reassigned on deletion.
    pub shape_idx: usize,
    #[serde(flatten)]
    pub kind: ShapeKind,
    /// Pending edits queued during the current batch. Ephemeral; never
    /// persisted with the document.
    #[serde(skip)]
    pub pending: PendingQueues,
}

impl Shape {
    pub fn is_picture(&self) -> bool {
        matches!(self.kind, ShapeKind::Picture { .. })
    }

    pub fn text_frame(&self) -> Option<&TextFrame> {
        match &self.kind {
            ShapeKind::TextBox { frame } => Some(frame),
            ShapeKind::Picture { .. } => None,
        }
    }

    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match &mut self.kind {
            ShapeKind::TextBox { frame } => Some(frame),
            ShapeKind::Picture { .. } => None,
        }
    }
}

/// One slide: stable index plus ordered shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePage {
    pub slide_idx: usize,
    pub shapes: Vec<Shape>,
}

impl SlidePage {
    pub fn shape(&self, shape_idx: usize) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.shape_idx == shape_idx)
    }

    pub fn shape_mut(&mut self, shape_idx: usize) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .find(|shape| shape.shape_idx == shape_idx)
    }

    /// Remove a shape by stable index. Remaining indices are untouched.
    pub fn remove_shape(&mut self, shape_idx: usize) -> bool {
        let before = self.shapes.len();
        self.shapes.retain(|shape| shape.shape_idx != shape_idx);
        self.shapes.len() != before
    }
}

/// Check semantic invariants not expressible in JSON Schema:
/// - No duplicate shape indices
/// - Every paragraph has at least one run
pub fn validate_invariants(slide: &SlidePage) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for shape in &slide.shapes {
        if !seen.insert(shape.shape_idx) {
            errors.push(format!(
                "slide {}: duplicate shape index {}",
                slide.slide_idx, shape.shape_idx
            ));
        }
        if let Some(frame) = shape.text_frame() {
            for (para_idx, para) in frame.paragraphs.iter().enumerate() {
                if para.runs.is_empty() {
                    errors.push(format!(
                        "slide {} shape {}: paragraph {} has no runs",
                        slide.slide_idx, shape.shape_idx, para_idx
                    ));
                }
            }
        }
    }
    errors
}
