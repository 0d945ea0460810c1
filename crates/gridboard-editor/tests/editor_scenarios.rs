#![forbid(unsafe_code)]

//! End-to-end editing scenarios across all three crates.
//!
//! Covers:
//! - Sibling reorder within a column (the index-shift case)
//! - Moving the last module out of a column
//! - Self-containment rejection leaving the tree untouched
//! - Mixed edits with undo/redo stepping through exact past states
//! - Duplication with wholesale ID regeneration
//! - A full drag gesture wired from the controller into the editor
//! - History bounds and undo/redo as exact inverses, including over
//!   randomized edit sequences
//! - JSON round-trip of a nested tree built through the editor

use gridboard_drag::{
    Attachment, Bounds, DragController, DragNotification, Pointer,
};
use gridboard_editor::{Editor, EditorConfig, HistoryConfig, ModuleRegistry};
use gridboard_model::{
    LayoutTree, Module, NodeAddress, NodeId, NodeRef, Placement, Section, resolve, validate,
};
use proptest::prelude::*;

// ============================================================================
// Fixture registry
// ============================================================================

struct Showcase;

impl ModuleRegistry for Showcase {
    fn create_default(&self, type_name: &str, id: NodeId) -> Option<Module> {
        match type_name {
            "text" | "image" | "blurb" => Some(Module::leaf(id, type_name)),
            "horizontal" | "stack" => Some(Module::container(id, type_name)),
            "tabs" => Some(Module::sectioned(
                id,
                type_name,
                [Section::from("left"), Section::from("right")],
            )),
            _ => None,
        }
    }
}

fn editor_with(config: EditorConfig) -> Editor<Showcase> {
    Editor::new(Showcase, config)
}

/// One row, one column, three leaf modules: A(text), B(image), C(blurb).
fn three_in_a_column() -> Editor<Showcase> {
    let mut editor = editor_with(EditorConfig::default());
    editor.add_row().unwrap();
    editor.add_column(0).unwrap();
    editor.add_module(0, 0, "text").unwrap();
    editor.add_module(0, 0, "image").unwrap();
    editor.add_module(0, 0, "blurb").unwrap();
    editor
}

fn type_at(tree: &LayoutTree, address: &NodeAddress) -> String {
    match resolve(tree, address).unwrap() {
        NodeRef::Module(module) => module.type_name.clone(),
        other => panic!("expected module at {address}, found {:?}", other.kind()),
    }
}

// ============================================================================
// Scenario: sibling reorder
// ============================================================================

#[test]
fn drag_first_module_below_its_next_sibling() {
    let mut editor = three_in_a_column();

    // A dropped after B. A's removal shifts B from index 1 to 0, so the
    // drop lands at index 1, not 2.
    let changed = editor
        .move_node(
            &NodeAddress::module(0, 0, 0),
            &NodeAddress::module(0, 0, 1),
            &Placement::After,
        )
        .unwrap();
    assert!(changed);

    let tree = editor.tree();
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 0)), "image");
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 1)), "text");
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 2)), "blurb");

    // One undo restores the original order.
    assert!(editor.undo());
    assert_eq!(type_at(editor.tree(), &NodeAddress::module(0, 0, 0)), "text");
}

#[test]
fn swap_two_modules_with_two_moves() {
    let mut editor = three_in_a_column();

    editor
        .move_node(
            &NodeAddress::module(0, 0, 0),
            &NodeAddress::module(0, 0, 2),
            &Placement::After,
        )
        .unwrap();
    editor
        .move_node(
            &NodeAddress::module(0, 0, 1),
            &NodeAddress::module(0, 0, 0),
            &Placement::Before,
        )
        .unwrap();

    let tree = editor.tree();
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 0)), "blurb");
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 1)), "image");
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 2)), "text");
}

// ============================================================================
// Scenario: emptying a column, then a self-containment attempt
// ============================================================================

#[test]
fn move_last_module_out_then_reject_self_containment() {
    let mut editor = editor_with(EditorConfig::default());
    editor.add_row().unwrap();
    editor.add_column(0).unwrap();
    editor.add_column(0).unwrap();
    editor.add_module(0, 0, "horizontal").unwrap();
    editor.add_module(0, 1, "text").unwrap();

    // The only module of column 1 moves inside the container in
    // column 0; the column stays behind, empty but addressable.
    editor
        .move_node(
            &NodeAddress::module(0, 1, 0),
            &NodeAddress::module(0, 0, 0),
            &Placement::inside(),
        )
        .unwrap();
    assert!(editor.tree().rows[0].columns[1].modules.is_empty());
    let container = NodeAddress::module(0, 0, 0);
    assert_eq!(type_at(editor.tree(), &container.clone().child(0)), "text");

    // Dragging the container onto its own child must fail cleanly.
    let before = editor.tree().clone();
    let result = editor.move_node(
        &container,
        &container.clone().child(0),
        &Placement::After,
    );
    assert!(result.is_err());
    assert_eq!(editor.tree(), &before);
    validate(editor.tree(), editor.limits()).unwrap();
}

// ============================================================================
// Scenario: mixed edits with undo/redo
// ============================================================================

#[test]
fn undo_twice_redo_once_lands_on_the_middle_state() {
    let mut editor = editor_with(EditorConfig::default());
    editor.add_row().unwrap();
    editor.add_column(0).unwrap();

    editor.add_module(0, 0, "text").unwrap();
    let after_first = editor.tree().clone();
    editor.add_module(0, 0, "image").unwrap();
    let after_second = editor.tree().clone();
    editor.add_module(0, 0, "blurb").unwrap();

    assert!(editor.undo());
    assert!(editor.undo());
    assert_eq!(editor.tree(), &after_first);

    assert!(editor.redo());
    assert_eq!(editor.tree(), &after_second);

    // A new edit here forks history: redo is gone.
    editor.add_module(0, 0, "text").unwrap();
    assert!(!editor.can_redo());
    assert!(!editor.redo());
}

#[test]
fn undo_is_an_exact_inverse_across_an_edit_sequence() {
    let mut editor = three_in_a_column();
    let mut states = vec![editor.tree().clone()];

    editor.add_column(0).unwrap();
    states.push(editor.tree().clone());
    editor
        .move_node(
            &NodeAddress::module(0, 0, 2),
            &NodeAddress::column(0, 1),
            &Placement::inside(),
        )
        .unwrap_err();
    // A rejected move records nothing, so the walk below still lines up.
    editor.delete(&NodeAddress::module(0, 0, 1)).unwrap();
    states.push(editor.tree().clone());
    editor.duplicate(&NodeAddress::row(0)).unwrap();
    states.push(editor.tree().clone());

    for expected in states.iter().rev() {
        assert_eq!(editor.tree(), expected);
        editor.undo();
    }
}

#[test]
fn history_depth_is_bounded() {
    let mut editor = editor_with(
        EditorConfig::default().with_history(HistoryConfig::new(3)),
    );
    editor.add_row().unwrap();
    editor.add_column(0).unwrap();
    for _ in 0..10 {
        editor.add_module(0, 0, "text").unwrap();
    }

    let mut undos = 0;
    while editor.undo() {
        undos += 1;
    }
    assert_eq!(undos, 3);
    // Three undos from ten modules leaves seven.
    assert_eq!(editor.tree().rows[0].columns[0].modules.len(), 7);
}

// ============================================================================
// Scenario: duplication
// ============================================================================

#[test]
fn duplicating_a_row_regenerates_every_id_and_keeps_content() {
    let mut editor = editor_with(EditorConfig::default());
    editor.add_row().unwrap();
    editor.add_column(0).unwrap();
    editor.add_module(0, 0, "tabs").unwrap();
    editor
        .insert_module(
            &NodeAddress::module(0, 0, 0),
            &Placement::inside_section("left"),
            "text",
        )
        .unwrap();

    let copy = editor.duplicate(&NodeAddress::row(0)).unwrap();
    assert_eq!(copy, NodeAddress::row(1));

    let tree = editor.tree();
    validate(tree, editor.limits()).unwrap();

    // Same shape and types, disjoint ids.
    let original = &tree.rows[0];
    let duplicate = &tree.rows[1];
    assert_eq!(original.columns.len(), duplicate.columns.len());
    assert_eq!(
        type_at(tree, &NodeAddress::module(1, 0, 0)),
        type_at(tree, &NodeAddress::module(0, 0, 0)),
    );
    assert_eq!(
        type_at(tree, &NodeAddress::module(1, 0, 0).section_child("left", 0)),
        "text"
    );

    let original_ids = LayoutTree {
        rows: vec![original.clone()],
    }
    .all_ids();
    let duplicate_ids = LayoutTree {
        rows: vec![duplicate.clone()],
    }
    .all_ids();
    assert!(original_ids.is_disjoint(&duplicate_ids));
}

// ============================================================================
// Scenario: a full drag gesture
// ============================================================================

#[test]
fn drag_gesture_from_pointer_samples_to_applied_move() {
    let mut editor = three_in_a_column();
    let mut controller = DragController::new();

    // The host registers each rendered module with its address.
    let source = controller.register(Attachment::new(NodeAddress::module(0, 0, 0)));
    let _middle = controller.register(Attachment::new(NodeAddress::module(0, 0, 1)));
    let below = controller.register(Attachment::new(NodeAddress::module(0, 0, 2)));

    controller.begin_drag(source).unwrap();
    assert_eq!(
        controller.poll_notification(),
        Some(DragNotification::DragStarted {
            source: NodeAddress::module(0, 0, 0),
        })
    );

    // Pointer in the lower half of the bottom module: an After drop.
    let bounds = Bounds {
        x: 0.0,
        y: 200.0,
        width: 320.0,
        height: 80.0,
    };
    let hover = controller.hover(below, Pointer { x: 10.0, y: 270.0 }, bounds);
    assert_eq!(
        hover,
        Some((NodeAddress::module(0, 0, 2), Placement::After))
    );

    let request = controller.finish_drag().unwrap();
    assert!(!controller.is_dragging());

    let changed = editor.apply_move(&request).unwrap();
    assert!(changed);
    let tree = editor.tree();
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 0)), "image");
    assert_eq!(type_at(tree, &NodeAddress::module(0, 0, 2)), "text");
    validate(tree, editor.limits()).unwrap();
}

#[test]
fn dropping_a_module_at_its_own_position_changes_nothing() {
    let mut editor = three_in_a_column();
    let before = editor.tree().clone();
    let can_undo_before = editor.can_undo();

    // "Before my next sibling" is where the module already sits.
    let changed = editor
        .move_node(
            &NodeAddress::module(0, 0, 1),
            &NodeAddress::module(0, 0, 2),
            &Placement::Before,
        )
        .unwrap();
    assert!(!changed);
    assert_eq!(editor.tree(), &before);
    assert_eq!(editor.can_undo(), can_undo_before);
}

// ============================================================================
// Serialization and randomized history
// ============================================================================

#[test]
fn nested_trees_round_trip_through_json() {
    let mut editor = editor_with(EditorConfig::default());
    editor.add_row().unwrap();
    editor.add_column(0).unwrap();
    editor.add_module(0, 0, "tabs").unwrap();
    editor
        .insert_module(
            &NodeAddress::module(0, 0, 0),
            &Placement::inside_section("left"),
            "text",
        )
        .unwrap();
    editor.add_module(0, 0, "stack").unwrap();
    editor
        .insert_module(&NodeAddress::module(0, 0, 1), &Placement::inside(), "image")
        .unwrap();

    let json = serde_json::to_string(editor.tree()).unwrap();
    let parsed: LayoutTree = serde_json::from_str(&json).unwrap();
    assert_eq!(&parsed, editor.tree());
}

proptest! {
    /// Every mutating operation (add, delete, duplicate, paste, move)
    /// is inverted by exactly one undo, whatever order the host issues
    /// them in.
    #[test]
    fn undo_walks_back_through_any_edit_sequence(
        ops in proptest::collection::vec(0u8..5, 1..12),
    ) {
        let mut editor = editor_with(EditorConfig::default());
        editor.add_row().unwrap();
        editor.add_column(0).unwrap();
        editor.add_module(0, 0, "text").unwrap();

        let mut states = vec![editor.tree().clone()];
        for op in ops {
            let modules = editor.tree().rows[0].columns[0].modules.len();
            match op {
                0 => {
                    editor.add_module(0, 0, "image").unwrap();
                }
                1 => {
                    editor.duplicate(&NodeAddress::module(0, 0, 0)).unwrap();
                }
                2 if modules > 1 => {
                    editor
                        .delete(&NodeAddress::module(0, 0, modules - 1))
                        .unwrap();
                }
                3 if modules > 1 => {
                    let changed = editor
                        .move_node(
                            &NodeAddress::module(0, 0, 0),
                            &NodeAddress::module(0, 0, modules - 1),
                            &Placement::After,
                        )
                        .unwrap();
                    prop_assert!(changed);
                }
                4 => {
                    let clipboard = editor
                        .delete(&NodeAddress::module(0, 0, 0))
                        .unwrap();
                    states.push(editor.tree().clone());
                    editor.add_module(0, 0, "blurb").unwrap();
                    states.push(editor.tree().clone());
                    editor
                        .paste(&clipboard, &NodeAddress::module(0, 0, 0), &Placement::Before)
                        .unwrap();
                }
                _ => continue,
            }
            states.push(editor.tree().clone());
        }

        for expected in states.iter().rev() {
            prop_assert_eq!(editor.tree(), expected);
            editor.undo();
        }
    }
}
