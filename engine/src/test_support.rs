//! Test-only helpers for constructing slides and shapes.

use crate::core::pending::PendingQueues;
use crate::slide::{Paragraph, Run, Shape, ShapeKind, SlidePage, TextFrame};

/// Build a text frame from nested string slices: one inner slice per
/// paragraph, one string per run.
pub fn frame(paragraphs: &[&[&str]]) -> TextFrame {
    TextFrame {
        paragraphs: paragraphs
            .iter()
            .map(|runs| Paragraph {
                runs: runs
                    .iter()
                    .map(|text| Run {
                        text: (*text).to_string(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Create a text-box shape with the given stable index and content.
pub fn text_shape(shape_idx: usize, paragraphs: &[&[&str]]) -> Shape {
    Shape {
        shape_idx,
        kind: ShapeKind::TextBox {
            frame: frame(paragraphs),
        },
        pending: PendingQueues::default(),
    }
}

/// Create a picture shape with the given stable index and asset path.
pub fn picture(shape_idx: usize, img_path: &str) -> Shape {
    Shape {
        shape_idx,
        kind: ShapeKind::Picture {
            img_path: img_path.to_string(),
        },
        pending: PendingQueues::default(),
    }
}

/// Create a slide with the given index and shapes.
pub fn slide_with_shapes(slide_idx: usize, shapes: Vec<Shape>) -> SlidePage {
    SlidePage { slide_idx, shapes }
}
