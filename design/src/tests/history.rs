use atelier_store::Frame;
use atelier_types::{FrameId, Variant};

use super::design;
use crate::Design;

/// Accepts three frames in sequence, each deriving from the previous.
fn three_frames(design: &mut Design) -> (FrameId, FrameId, FrameId) {
    let first = design.create_frame();
    let stock = design.edit(first).create_node("Stock").unwrap();
    let first = design.accept(first).unwrap();

    let second = design.derive_frame(first);
    design
        .edit(second)
        .set_attribute(stock, "name", Variant::from("a"))
        .unwrap();
    let second = design.accept(second).unwrap();

    let third = design.derive_frame(second);
    design
        .edit(third)
        .set_attribute(stock, "name", Variant::from("b"))
        .unwrap();
    let third = design.accept(third).unwrap();

    (first, second, third)
}

#[test]
fn undo_and_redo_walk_the_history() {
    let mut design = design();
    let (first, second, third) = three_frames(&mut design);

    assert_eq!(design.current_frame_id(), Some(third));
    assert_eq!(design.undo_list(), &[first, second]);
    assert!(design.redo_list().is_empty());

    design.undo(first);
    assert_eq!(design.current_frame_id(), Some(first));
    assert!(design.undo_list().is_empty());
    assert_eq!(design.redo_list(), &[second, third]);

    design.redo(third);
    assert_eq!(design.current_frame_id(), Some(third));
    assert_eq!(design.undo_list(), &[first, second]);
    assert!(design.redo_list().is_empty());
}

#[test]
fn undo_one_step_at_a_time() {
    let mut design = design();
    let (first, second, third) = three_frames(&mut design);

    design.undo(second);
    assert_eq!(design.current_frame_id(), Some(second));
    assert_eq!(design.undo_list(), &[first]);
    assert_eq!(design.redo_list(), &[third]);

    design.redo(third);
    assert_eq!(design.undo_list(), &[first, second]);
    assert!(design.redo_list().is_empty());
}

#[test]
fn accepting_clears_the_redo_list() {
    let mut design = design();
    let (first, _, _) = three_frames(&mut design);

    design.undo(first);
    assert_eq!(design.redo_list().len(), 2);

    let frame = design.derive_frame(first);
    design.edit(frame).create_node("Flow").unwrap();
    let accepted = design.accept(frame).unwrap();

    assert_eq!(design.current_frame_id(), Some(accepted));
    assert_eq!(design.undo_list(), &[first]);
    assert!(design.redo_list().is_empty());
}

#[test]
fn history_accounts_for_every_accepted_frame() {
    let mut design = design();
    let (first, _, _) = three_frames(&mut design);

    let accounted = design.undo_list().len() + design.redo_list().len() + 1;
    assert_eq!(accounted, design.frames().count());

    design.undo(first);
    let accounted = design.undo_list().len() + design.redo_list().len() + 1;
    assert_eq!(accounted, design.frames().count());
}

#[test]
fn detached_acceptance_skips_the_history() {
    let mut design = design();
    let (_, _, third) = three_frames(&mut design);

    let frame = design.create_frame();
    design.edit(frame).create_node("Stock").unwrap();
    let detached = design.accept_detached(frame).unwrap();

    assert!(design.contains_frame(detached));
    assert_eq!(design.current_frame_id(), Some(third));
    assert!(!design.undo_list().contains(&detached));
    assert!(design.redo_list().is_empty());
}

#[test]
#[should_panic(expected = "not on the undo list")]
fn undo_to_unknown_frame_panics() {
    let mut design = design();
    three_frames(&mut design);
    design.undo(FrameId::new(4242));
}

#[test]
#[should_panic(expected = "not on the redo list")]
fn redo_to_unknown_frame_panics() {
    let mut design = design();
    let (first, _, _) = three_frames(&mut design);
    design.undo(first);
    design.redo(first);
}

#[test]
fn undo_then_branch_then_current_stays_reachable() {
    let mut design = design();
    let (first, second, third) = three_frames(&mut design);

    design.undo(second);
    let frame = design.derive_frame(second);
    design.edit(frame).create_node("Auxiliary").unwrap();
    let branch = design.accept(frame).unwrap();

    // The old redo branch is gone; the new branch is current.
    assert_eq!(design.current_frame_id(), Some(branch));
    assert_eq!(design.undo_list(), &[first, second]);
    assert!(design.redo_list().is_empty());
    // The abandoned frame still exists as a stable frame, merely
    // unreachable through the history.
    assert!(design.contains_frame(third));
    assert!(design.frame(third).unwrap().len() > 0);
}
