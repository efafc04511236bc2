//! End-to-end interpreter scenarios: batch execution, deferred edits through
//! commit, documentation rendering, and the document round trip.

use std::fs;

use engine::commit::commit_pending;
use engine::core::history::HistoryMark;
use engine::docs::describe;
use engine::exec::{BatchOutcome, Interpreter, InterpreterConfig};
use engine::io::deck::{load_slide, write_slide};
use engine::test_support::{frame, picture, slide_with_shapes, text_shape};

fn interpreter() -> Interpreter {
    Interpreter::new(InterpreterConfig::default()).expect("interpreter")
}

/// Full edit turn: agent batch queues a delete and a replace against the same
/// shape, both bound to pre-batch coordinates, then the commit phase applies
/// them.
///
/// Shape 3 holds one paragraph of two runs. `del_span(3, 0, 1)` removes the
/// second run; `replace_text(3, 0, 0, 'Hello')` rewrites the first. Both use
/// the indices the agent saw before any edit.
#[test]
fn batch_queues_deferred_edits_and_commit_applies_them() {
    let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["old", "extra"]])]);
    let mut interp = interpreter();

    let outcome = interp.execute(
        "del_span(3, 0, 1)\nreplace_text(3, 0, 0, 'Hello')",
        &mut slide,
    );
    assert_eq!(outcome, BatchOutcome::Applied);

    let pending = &slide.shape(3).expect("shape").pending;
    assert_eq!(pending.delete.len(), 1);
    assert_eq!(pending.replace.len(), 1);
    // The interpreter itself never applies a queued edit.
    assert_eq!(
        slide.shape(3).expect("shape").text_frame(),
        Some(&frame(&[&["old", "extra"]]))
    );

    commit_pending(&mut slide).expect("commit");
    assert_eq!(
        slide.shape(3).expect("shape").text_frame(),
        Some(&frame(&[&["Hello"]]))
    );
    assert!(slide.shape(3).expect("shape").pending.is_empty());

    assert_eq!(interp.history().batches()[0].mark, HistoryMark::ApiCallCorrect);
}

/// A missing element rejects the batch with an annotated single line and one
/// traced statement entry.
#[test]
fn missing_element_is_rejected_with_trace() {
    let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
    let mut interp = interpreter();

    let outcome = interp.execute("del_image(9)", &mut slide);

    let BatchOutcome::Rejected { annotated, trace } = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(annotated, "--> Error Line: del_image(9)");
    assert!(trace.contains("cannot find element 9"));

    let statements = interp.history().statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].mark, HistoryMark::CodeRunError);
    assert!(statements[0].trace.is_some());
    assert_eq!(interp.history().batches()[0].mark, HistoryMark::ApiCallError);
}

/// A replacement asset that does not exist fails before any shape lookup, so
/// the slide is untouched even when the target shape also does not exist.
#[test]
fn missing_asset_fails_before_shape_lookup() {
    let mut slide = slide_with_shapes(0, vec![picture(3, "/tmp/old.png")]);
    let before = slide.clone();
    let mut interp = interpreter();

    let outcome = interp.execute("replace_image(3, '/tmp/missing.png')", &mut slide);

    let BatchOutcome::Rejected { trace, .. } = outcome else {
        panic!("expected rejection");
    };
    assert!(trace.contains("/tmp/missing.png does not exist"));
    assert_eq!(slide, before);
}

/// Image-only operations reject non-Picture targets before queueing anything.
#[test]
fn type_mismatch_queues_nothing() {
    let mut slide = slide_with_shapes(0, vec![text_shape(1, &[&["a"]])]);
    let mut interp = interpreter();

    let outcome = interp.execute("del_image(1)", &mut slide);

    let BatchOutcome::Rejected { trace, .. } = outcome else {
        panic!("expected rejection");
    };
    assert!(trace.contains("element 1 is not a Picture"));
    assert!(slide.shape(1).expect("shape").pending.is_empty());
    assert!(slide.shape(1).is_some());
}

/// Execution short-circuits at the first failing line; later valid statements
/// never run and never reach history.
#[test]
fn short_circuit_stops_later_statements() {
    let mut slide = slide_with_shapes(
        0,
        vec![text_shape(3, &[&["a", "b"]]), picture(4, "/tmp/x.png")],
    );
    let mut interp = interpreter();

    let outcome = interp.execute(
        "del_span(3, 0, 0)\nconjure_shape(5)\ndel_image(4)",
        &mut slide,
    );

    let BatchOutcome::Rejected { annotated, .. } = outcome else {
        panic!("expected rejection");
    };
    assert!(annotated.contains("--> Error Line: conjure_shape(5)"));
    // del_image(4) never ran.
    assert!(slide.shape(4).is_some());
    assert_eq!(interp.history().statements().len(), 1);
}

/// Prose-wrapped statements execute; pure prose batches fail on the final
/// line.
#[test]
fn prose_handling_matches_grammar_rules() {
    let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
    let mut interp = interpreter();

    let outcome = interp.execute(
        "Here is my edit:\nreplace_text(3, 0, 0, 'New title')\nThat should do it.",
        &mut slide,
    );
    assert_eq!(outcome, BatchOutcome::Applied);

    let outcome = interp.execute("Nothing to do here.", &mut slide);
    let BatchOutcome::Rejected { trace, .. } = outcome else {
        panic!("expected rejection");
    };
    assert!(trace.contains("no executable statement found"));
}

/// The documentation pack lists every whitelisted operation and never the
/// implicit slide argument.
#[test]
fn docs_cover_the_whitelist() {
    let interp = interpreter();
    let rendered = describe(interp.registry().operations(), true).expect("describe");

    for name in [
        "del_span",
        "del_image",
        "clone_paragraph",
        "replace_text",
        "replace_image",
    ] {
        assert!(rendered.contains(&format!("def {name}(")), "missing {name}");
    }
    assert!(!rendered.contains("slide"));
}

/// Clones land after the last paragraph and copy the same-batch edits of
/// their source paragraph.
#[test]
fn clone_paragraph_round_trip() {
    let mut slide = slide_with_shapes(0, vec![text_shape(0, &[&["title"], &["body"]])]);
    let mut interp = interpreter();

    let outcome = interp.execute(
        "replace_text(0, 0, 0, 'Title')\nclone_paragraph(0, 0)",
        &mut slide,
    );
    assert_eq!(outcome, BatchOutcome::Applied);

    commit_pending(&mut slide).expect("commit");
    assert_eq!(
        slide.shape(0).expect("shape").text_frame(),
        Some(&frame(&[&["Title"], &["body"], &["Title"]]))
    );
}

/// A full disk round trip: load a document, execute, commit, write, reload.
#[test]
fn document_round_trip_through_disk() {
    let temp = tempfile::tempdir().expect("tempdir");
    let slide_path = temp.path().join("slide.json");
    let asset_path = temp.path().join("new.png");
    fs::write(&asset_path, b"png").expect("write asset");

    let slide = slide_with_shapes(
        2,
        vec![text_shape(0, &[&["hello", "there"]]), picture(1, "/tmp/old.png")],
    );
    write_slide(&slide_path, &slide).expect("write slide");

    let mut slide = load_slide(&slide_path).expect("load slide");
    let mut interp = interpreter();
    let batch = format!(
        "del_span(0, 0, 1)\nreplace_image(1, '{}')",
        asset_path.to_string_lossy()
    );
    assert_eq!(interp.execute(&batch, &mut slide), BatchOutcome::Applied);
    commit_pending(&mut slide).expect("commit");
    write_slide(&slide_path, &slide).expect("rewrite slide");

    let reloaded = load_slide(&slide_path).expect("reload slide");
    assert_eq!(
        reloaded.shape(0).expect("shape").text_frame(),
        Some(&frame(&[&["hello"]]))
    );
    match &reloaded.shape(1).expect("shape").kind {
        engine::slide::ShapeKind::Picture { img_path } => {
            assert_eq!(img_path, &asset_path.to_string_lossy().into_owned());
        }
        other => panic!("unexpected kind {other:?}"),
    }
}
