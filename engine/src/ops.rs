//! The whitelisted edit operations and the element resolver.
//!
//! Every operation receives the slide as an implicit leading argument bound by
//! the interpreter; the declared parameters are only what the agent writes.
//! Text edits never mutate the frame directly: they queue pending edits so
//! that paragraph/run coordinates stay valid against the pre-batch structure
//! (see [`crate::core::pending`]). Image edits apply immediately because they
//! never shift indices.

use std::path::Path;

use anyhow::{Result, anyhow, bail};

use crate::core::pending::PendingEdit;
use crate::core::registry::{OpSpec, ParamSpec, index_arg, str_arg};
use crate::core::value::{TypeTag, Value};
use crate::slide::{Shape, SlidePage};

/// Locate a shape by stable index.
pub fn resolve_shape(slide: &mut SlidePage, shape_idx: usize) -> Result<&mut Shape> {
    slide
        .shape_mut(shape_idx)
        .ok_or_else(|| anyhow!("cannot find element {shape_idx}, is it deleted or does not exist?"))
}

fn resolve_text_shape(slide: &mut SlidePage, shape_idx: usize) -> Result<&mut Shape> {
    let shape = resolve_shape(slide, shape_idx)?;
    if shape.text_frame().is_none() {
        bail!("element {shape_idx} is not a text element");
    }
    Ok(shape)
}

fn resolve_picture(slide: &mut SlidePage, shape_idx: usize) -> Result<&mut Shape> {
    let shape = resolve_shape(slide, shape_idx)?;
    if !shape.is_picture() {
        bail!("element {shape_idx} is not a Picture");
    }
    Ok(shape)
}

fn del_span(slide: &mut SlidePage, args: &[Value]) -> Result<()> {
    let div_id = index_arg(args, 0, "div_id")?;
    let paragraph = index_arg(args, 1, "paragraph_id")?;
    let run = index_arg(args, 2, "span_id")?;
    let shape = resolve_text_shape(slide, div_id)?;
    shape
        .pending
        .delete
        .push(PendingEdit::DeleteRun { paragraph, run });
    Ok(())
}

fn del_image(slide: &mut SlidePage, args: &[Value]) -> Result<()> {
    let figure_id = index_arg(args, 0, "figure_id")?;
    resolve_picture(slide, figure_id)?;
    slide.remove_shape(figure_id);
    Ok(())
}

fn replace_text(slide: &mut SlidePage, args: &[Value]) -> Result<()> {
    let div_id = index_arg(args, 0, "div_id")?;
    let paragraph = index_arg(args, 1, "paragraph_id")?;
    let run = index_arg(args, 2, "span_id")?;
    let text = str_arg(args, 3, "text")?.to_string();
    let shape = resolve_text_shape(slide, div_id)?;
    shape
        .pending
        .replace
        .push(PendingEdit::ReplaceRun { paragraph, run, text });
    Ok(())
}

fn replace_image(slide: &mut SlidePage, args: &[Value]) -> Result<()> {
    let figure_id = index_arg(args, 0, "figure_id")?;
    let image_path = str_arg(args, 1, "image_path")?;
    // Asset check comes before any shape lookup so a bad path has no side
    // effect at all.
    if !Path::new(image_path).exists() {
        bail!("the image {image_path} does not exist");
    }
    let image_path = image_path.to_string();
    let shape = resolve_picture(slide, figure_id)?;
    if let crate::slide::ShapeKind::Picture { img_path } = &mut shape.kind {
        *img_path = image_path;
    }
    Ok(())
}

fn clone_paragraph(slide: &mut SlidePage, args: &[Value]) -> Result<()> {
    let div_id = index_arg(args, 0, "div_id")?;
    let paragraph = index_arg(args, 1, "paragraph_id")?;
    let shape = resolve_text_shape(slide, div_id)?;
    shape
        .pending
        .clone
        .push(PendingEdit::CloneParagraph { paragraph });
    Ok(())
}

/// Operations of the `Agent` capability category, in registration order.
pub fn agent_operations() -> Vec<OpSpec> {
    vec![
        OpSpec {
            name: "del_span",
            params: vec![
                ParamSpec::required("div_id", TypeTag::Int),
                ParamSpec::required("paragraph_id", TypeTag::Int),
                ParamSpec::required("span_id", TypeTag::Int),
            ],
            description: "Delete the span at (paragraph_id, span_id) of the given text element; \
                          a paragraph left without spans is removed.",
            handler: del_span,
        },
        OpSpec {
            name: "del_image",
            params: vec![ParamSpec::required("figure_id", TypeTag::Int)],
            description: "Delete the image element with the given figure_id.",
            handler: del_image,
        },
        OpSpec {
            name: "clone_paragraph",
            params: vec![
                ParamSpec::required("div_id", TypeTag::Int),
                ParamSpec::required("paragraph_id", TypeTag::Int),
            ],
            description: "Clone the paragraph; the clone receives a paragraph_id one greater \
                          than the current maximum in the parent element.",
            handler: clone_paragraph,
        },
        OpSpec {
            name: "replace_text",
            params: vec![
                ParamSpec::required("div_id", TypeTag::Int),
                ParamSpec::required("paragraph_id", TypeTag::Int),
                ParamSpec::required("span_id", TypeTag::Int),
                ParamSpec::required("text", TypeTag::Str),
            ],
            description: "Replace the text of the span at (paragraph_id, span_id).",
            handler: replace_text,
        },
        OpSpec {
            name: "replace_image",
            params: vec![
                ParamSpec::required("figure_id", TypeTag::Int),
                ParamSpec::required("image_path", TypeTag::Str),
            ],
            description: "Replace the image of the given figure with the image at image_path.",
            handler: replace_image,
        },
    ]
}
