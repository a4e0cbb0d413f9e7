//! Integration tests for the layout/visibility controller.

use std::collections::HashSet;

use rstest::{fixture, rstest};

use dectree::application::{
    LayoutController, NodeState, Point, StableId, ViewportConfig, VisibilityState,
};
use dectree::domain::{DisplayTree, NodeKey, TreeBuilder};
use dectree::infrastructure::source::parse_records;
use dectree::infrastructure::traits::RecordingSurface;
use dectree::util::testing::{complete_records, init_test_setup, sample_records};

type Controller = LayoutController<RecordingSurface>;

#[fixture]
fn controller() -> Controller {
    init_test_setup();
    let tree = TreeBuilder::new().build(&sample_records(), 1).unwrap();
    LayoutController::new(tree, RecordingSurface::new())
}

fn key(c: &Controller, name: &str) -> NodeKey {
    c.tree().find_by_name(name).unwrap()
}

fn assert_near(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
        "{:?} != {:?}",
        actual,
        expected
    );
}

fn visible_names(c: &Controller) -> HashSet<String> {
    c.tree()
        .iter()
        .filter(|(k, _)| c.layout_of(*k).is_some())
        .map(|(_, n)| n.name.clone())
        .collect()
}

// ============================================================
// Toggle
// ============================================================

#[rstest]
fn given_expanded_node_when_toggled_twice_then_state_is_restored(mut controller: Controller) {
    // Arrange
    controller.render_initial().unwrap();
    let a = key(&controller, "A");
    let before: VisibilityState = *controller.visibility(a).unwrap();

    // Act
    controller.toggle(a).unwrap();
    let collapsed = *controller.visibility(a).unwrap();
    controller.toggle(a).unwrap();

    // Assert
    assert_eq!(collapsed.state(), NodeState::Collapsed);
    assert_eq!(collapsed.hidden_children, before.visible_children);
    assert_eq!(*controller.visibility(a).unwrap(), before);
    assert_eq!(controller.node_state(a), Some(NodeState::Expanded));
}

#[rstest]
fn given_collapsed_node_when_recompute_then_descendants_are_hidden(mut controller: Controller) {
    let initial = controller.render_initial().unwrap();
    let a = key(&controller, "A");

    let frame = controller.toggle(a).unwrap();

    let names: HashSet<&str> = frame.names().into_iter().collect();
    assert!(names.contains("A"));
    assert!(!names.contains("B"));
    assert!(!names.contains("D"));
    assert!(frame
        .nodes
        .iter()
        .all(|n| !controller.tree().is_descendant_of(n.key, a)));
    assert_eq!(frame.nodes.len(), initial.nodes.len() - 2);
}

#[rstest]
fn given_collapsed_node_when_toggled_again_then_visible_set_is_restored(
    mut controller: Controller,
) {
    let initial = controller.render_initial().unwrap();
    let a = key(&controller, "A");

    controller.toggle(a).unwrap();
    let restored = controller.toggle(a).unwrap();

    assert_eq!(restored.names(), initial.names());
    let depths = |f: &dectree::application::Frame| -> Vec<(String, usize)> {
        f.nodes.iter().map(|n| (n.name.clone(), n.depth)).collect()
    };
    assert_eq!(depths(&restored), depths(&initial));
    for node in &initial.nodes {
        let again = restored.find(&node.name).unwrap();
        assert_eq!(again.layout.position(), node.layout.position());
    }
}

#[rstest]
fn given_leaf_when_toggled_then_view_is_unchanged(mut controller: Controller) {
    let initial = controller.render_initial().unwrap();
    let c = key(&controller, "C");

    let frame = controller.toggle(c).unwrap();

    assert_eq!(controller.node_state(c), Some(NodeState::Leaf));
    assert_eq!(frame.names(), initial.names());
    assert!(frame.entering.is_empty());
    assert!(frame.exiting.is_empty());
}

#[rstest]
fn given_hidden_node_when_toggled_then_state_changes_and_ancestor_is_anchor(
    mut controller: Controller,
) {
    controller.render_initial().unwrap();
    let root = controller.tree().root().unwrap();
    let a = key(&controller, "A");
    controller.toggle(root).unwrap();

    let frame = controller.toggle(a).unwrap();

    assert_eq!(controller.node_state(a), Some(NodeState::Collapsed));
    assert_eq!(frame.names(), vec!["root"]);
    assert_eq!(frame.source, controller.stable_id(root).unwrap());

    // Expanding the root now shows A collapsed
    let frame = controller.toggle(root).unwrap();
    assert_eq!(frame.names(), vec!["root", "A", "C"]);
    assert_eq!(frame.find("A").unwrap().state, NodeState::Collapsed);
}

#[rstest]
fn given_unknown_node_number_when_toggle_by_number_then_error(mut controller: Controller) {
    controller.render_initial().unwrap();

    let result = controller.toggle_by_number(999);

    assert!(result.is_err());
    assert_eq!(controller.surface().frames.len(), 1);
}

#[rstest]
fn given_key_from_other_tree_when_toggle_then_error(mut controller: Controller) {
    let other = TreeBuilder::new().build(&complete_records(4), 1).unwrap();
    let foreign = other.iter().last().map(|(k, _)| k).unwrap();
    controller.render_initial().unwrap();

    assert!(controller.toggle(foreign).is_err());
}

// ============================================================
// Stable identity
// ============================================================

#[rstest]
fn given_revealed_nodes_when_recompute_then_ids_are_fresh_and_persisting_ids_are_kept(
    mut controller: Controller,
) {
    // Arrange: only the root is visible
    let root = controller.tree().root().unwrap();
    let first = controller.collapse_all().unwrap();
    assert_eq!(first.stable_ids(), vec![1]);

    // Act
    let second = controller.toggle(root).unwrap();
    let a = key(&controller, "A");
    let third = controller.toggle(a).unwrap();

    // Assert
    assert_eq!(second.node(1).unwrap().name, "root");
    let mut used: HashSet<StableId> = first.stable_ids().into_iter().collect();
    for id in &second.entering {
        assert!(used.insert(*id), "id {} reused", id);
    }
    for id in &third.entering {
        assert!(used.insert(*id), "id {} reused", id);
    }
    for name in ["root", "A", "C"] {
        assert_eq!(
            second.find(name).unwrap().layout.stable_id,
            third.find(name).unwrap().layout.stable_id
        );
    }
    assert_eq!(used.len(), 5);
}

#[rstest]
fn given_node_hidden_and_shown_again_when_recompute_then_it_keeps_its_id(
    mut controller: Controller,
) {
    let initial = controller.render_initial().unwrap();
    let a = key(&controller, "A");
    let b_id = initial.find("B").unwrap().layout.stable_id;

    let hidden = controller.toggle(a).unwrap();
    let shown = controller.toggle(a).unwrap();

    assert!(hidden.exiting.iter().any(|e| e.stable_id == b_id));
    assert_eq!(shown.find("B").unwrap().layout.stable_id, b_id);
    assert!(shown.entering.contains(&b_id));
}

// ============================================================
// Transitions
// ============================================================

#[rstest]
fn given_collapse_when_recompute_then_exiting_nodes_target_source(mut controller: Controller) {
    let initial = controller.render_initial().unwrap();
    let a = key(&controller, "A");

    let frame = controller.toggle(a).unwrap();

    let a_now = frame.find("A").unwrap().layout.position();
    assert_eq!(frame.anchor, a_now);
    assert_eq!(frame.exiting.len(), 2);
    for exiting in &frame.exiting {
        assert_eq!(exiting.to, a_now);
        let last = initial.find(&exiting.name).unwrap().layout.position();
        assert_eq!(exiting.from, last);
    }
}

#[rstest]
fn given_expand_when_recompute_then_entering_nodes_start_at_source_previous_position(
    mut controller: Controller,
) {
    controller.render_initial().unwrap();
    let a = key(&controller, "A");
    let collapsed = controller.toggle(a).unwrap();
    let a_before = collapsed.find("A").unwrap().layout.position();

    let frame = controller.toggle(a).unwrap();

    assert_eq!(frame.origin, a_before);
    assert_eq!(frame.entering.len(), 2);
    for id in &frame.entering {
        let node = frame.node(*id).unwrap();
        assert_eq!(node.layout.previous(), a_before);
    }
    // Persisting nodes move from where they were
    let root = frame.find("root").unwrap();
    assert_eq!(
        root.layout.previous(),
        collapsed.find("root").unwrap().layout.position()
    );
}

#[rstest]
fn given_initial_render_when_recompute_then_every_node_enters_at_root(
    mut controller: Controller,
) {
    let frame = controller.render_initial().unwrap();

    assert_eq!(frame.entering.len(), 5);
    assert_eq!(frame.origin, Point::new(0.0, 0.0));
    assert!(frame.nodes.iter().all(|n| n.layout.previous() == frame.origin));
    assert!(frame.exiting.is_empty());
}

// ============================================================
// Geometry
// ============================================================

#[rstest]
fn given_layout_when_recompute_then_parent_is_centered_over_children(
    mut controller: Controller,
) {
    let frame = controller.render_initial().unwrap();

    let x = |name: &str| frame.find(name).unwrap().layout.x;
    assert_eq!(x("root"), 0.0);
    assert_eq!(x("A"), (x("B") + x("D")) / 2.0);
    assert!(x("B") < x("D"));
    assert!(x("A") < x("C"));
}

#[rstest]
fn given_same_level_nodes_when_recompute_then_they_do_not_overlap() {
    init_test_setup();
    let tree = TreeBuilder::new().build(&complete_records(4), 1).unwrap();
    let mut controller = LayoutController::new(tree, RecordingSurface::new());

    let frame = controller.render_initial().unwrap();

    let max_label = controller.tree().max_label_len() as f64;
    let spacing = max_label * 6.0;
    for depth in 0..=4 {
        let mut xs: Vec<f64> = frame
            .nodes
            .iter()
            .filter(|n| n.depth == depth)
            .map(|n| n.layout.x)
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= spacing, "overlap at depth {}", depth);
        }
    }
}

#[rstest]
fn given_toggle_when_refresh_then_viewport_centers_on_anchor(mut controller: Controller) {
    controller.render_initial().unwrap();
    let a = key(&controller, "A");

    let frame = controller.toggle(a).unwrap();

    let transform = *controller.surface().last_transform().unwrap();
    let config = ViewportConfig::default();
    assert_eq!(
        transform.translate,
        Point::new(
            -frame.anchor.x + config.width / 2.0,
            -frame.anchor.y + config.height / 2.0
        )
    );
    assert_near(controller.viewport().to_screen(frame.anchor), Point::new(640.0, 400.0));
}

#[rstest]
fn given_zoomed_viewport_when_toggle_then_scale_is_kept(mut controller: Controller) {
    controller.render_initial().unwrap();
    controller
        .viewport_mut()
        .zoom(10.0, Point::new(0.0, 0.0));
    let a = key(&controller, "A");

    let frame = controller.toggle(a).unwrap();

    let transform = controller.surface().last_transform().unwrap();
    assert_eq!(transform.scale, 3.0);
    assert_near(controller.viewport().to_screen(frame.anchor), Point::new(640.0, 400.0));
}

// ============================================================
// Bulk operations
// ============================================================

#[rstest]
fn given_collapse_all_when_expand_all_then_everything_is_visible(mut controller: Controller) {
    controller.render_initial().unwrap();

    let collapsed = controller.collapse_all().unwrap();
    assert_eq!(collapsed.names(), vec!["root"]);
    assert_eq!(collapsed.exiting.len(), 4);
    assert_eq!(controller.visible_keys().count(), 1);

    controller.expand_all().unwrap();
    assert_eq!(
        visible_names(&controller),
        ["root", "A", "B", "D", "C"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    );
}

#[test]
fn given_empty_tree_when_render_initial_then_error() {
    let mut controller = LayoutController::new(DisplayTree::new(), RecordingSurface::new());

    assert!(controller.render_initial().is_err());
    assert!(controller.surface().frames.is_empty());
}

// ============================================================
// End to end
// ============================================================

#[test]
fn given_three_node_json_when_build_and_collapse_root_then_only_root_remains() {
    init_test_setup();
    // Arrange
    let json = r#"[
        {"nodeNumber":1,"title":"root","leftChild":2,"rightChild":3,"passMark":0.5},
        {"nodeNumber":2,"title":"A","leftChild":null,"rightChild":null,"passed":4,"failed":1},
        {"nodeNumber":3,"title":"B","leftChild":null,"rightChild":null,"passed":2,"failed":2}
    ]"#;
    let records = parse_records(json, "inline").unwrap();

    // Act
    let tree = TreeBuilder::new().build(&records, 1).unwrap();
    let root = tree.root().unwrap();
    let [left, right] = tree.children(root).unwrap();
    let a = tree.get(left).unwrap();
    let b = tree.get(right).unwrap();
    let (a_ratio, b_ratio) = (a.pass_total_ratio(), b.pass_total_ratio());
    let (a_name, b_name) = (a.name.clone(), b.name.clone());

    let mut controller = LayoutController::new(tree, RecordingSurface::new());
    controller.render_initial().unwrap();
    let frame = controller.toggle(root).unwrap();

    // Assert
    assert_eq!((a_name.as_str(), b_name.as_str()), ("A", "B"));
    assert_eq!(a_ratio, Some(0.8));
    assert_eq!(b_ratio, Some(0.5));
    assert_eq!(frame.names(), vec!["root"]);
    assert!(frame.edges.is_empty());
    assert_eq!(controller.surface().frames.len(), 2);
}
