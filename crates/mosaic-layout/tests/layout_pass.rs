use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use mosaic_core::{
    Border, Component, LayoutError, LifecycleTypeId, Rect, Set, SizeSpec, StateHandle,
    StateUpdate,
};
use mosaic_layout::{
    calculate_layout, LayoutConfig, LayoutRequest, LayoutResult, OutputId, OutputKind,
    UpdateState,
};
use mosaic_testing::{
    lay_out, lay_out_after, outputs_of_kind, Counter, Feed, Leaf, Paint, Screen, SpyCounters,
    SpyLeaf, Stack, StackSolver,
};

fn list(values: &[u32]) -> Component {
    Stack::hosted(
        "list",
        values.iter().map(|value| Leaf::component(*value, 10.0)).collect(),
    )
}

fn nested_hosts(depth: usize) -> Component {
    let mut root = Leaf::component(0, 1.0);
    for _ in 0..depth {
        root = Stack::hosted("level", vec![root]);
    }
    root
}

fn ids(result: &LayoutResult) -> Vec<OutputId> {
    result.outputs().iter().map(|output| output.id).collect()
}

fn leaf_values(result: &LayoutResult) -> Vec<u32> {
    outputs_of_kind(result, OutputKind::Content)
        .into_iter()
        .filter_map(|output| output.component.as_ref()?.downcast::<Leaf>())
        .map(|leaf| leaf.value)
        .collect()
}

#[test]
fn hosted_list_flattens_into_host_then_leaves() {
    let result = lay_out(&list(&[1, 2])).expect("layout");
    let outputs = result.outputs();

    assert_eq!(outputs.len(), 4);
    assert_eq!(outputs[0].kind, OutputKind::Host);
    assert_eq!(outputs[0].host, None);
    assert_eq!(outputs[0].id.level(), 0);
    assert_eq!(outputs[1].kind, OutputKind::Host);
    assert_eq!(outputs[1].host, Some(outputs[0].id));
    assert_eq!(outputs[1].id.level(), 1);
    assert_eq!(outputs[2].host, Some(outputs[1].id));
    assert_eq!(outputs[3].host, Some(outputs[1].id));
    assert_eq!(outputs[2].id.level(), 2);
    assert_eq!(outputs[2].bounds, Rect::new(0.0, 0.0, 100.0, 10.0));
    assert_eq!(outputs[3].bounds, Rect::new(0.0, 10.0, 100.0, 10.0));
    assert_eq!(result.size().height, 20.0);
    assert_eq!(leaf_values(&result), vec![1, 2]);
}

#[test]
fn structurally_identical_passes_keep_every_id() {
    let first = lay_out(&list(&[1, 2, 3])).expect("first");
    let fresh = lay_out(&list(&[1, 2, 3])).expect("fresh");
    let matched = lay_out_after(&list(&[1, 2, 3]), Some(&first)).expect("matched");

    assert_eq!(ids(&first), ids(&fresh));
    assert_eq!(ids(&first), ids(&matched));
    assert!(matched
        .outputs()
        .iter()
        .all(|output| output.update_state == UpdateState::Updated));
}

#[test]
fn ids_are_unique_within_a_result() {
    let root = Screen::component(|| {
        mosaic_core::Element::column()
            .background(Paint::component(1))
            .children((0..40).map(|value| Leaf::component(value, 5.0)))
            .child(list(&[1, 2, 3]))
            .border(Border::new(1.0, 0xff00_00ff))
    });
    let result = lay_out(&root).expect("layout");

    let unique: Set<OutputId> = ids(&result).into_iter().collect();
    assert_eq!(unique.len(), result.output_count());
    for (index, output) in result.outputs().iter().enumerate() {
        assert_eq!(result.index_of(output.id), Some(index));
    }
}

#[test]
fn changed_leaf_is_dirty_while_the_rest_is_updated() {
    let first = lay_out(&list(&[1, 2])).expect("first");
    let second = lay_out_after(&list(&[1, 7]), Some(&first)).expect("second");

    assert_eq!(ids(&first), ids(&second));
    let states: Vec<UpdateState> = second
        .outputs()
        .iter()
        .map(|output| output.update_state)
        .collect();
    assert_eq!(
        states,
        vec![
            UpdateState::Updated,
            UpdateState::Updated,
            UpdateState::Updated,
            UpdateState::Dirty
        ]
    );
    assert!(!second.outputs()[2].should_update);
    assert!(second.outputs()[3].should_update);
}

#[test]
fn growing_list_keeps_old_ids_and_mints_new_ones() {
    let first = lay_out(&list(&[1, 2])).expect("first");
    let second = lay_out_after(&list(&[1, 2, 3]), Some(&first)).expect("second");

    assert_eq!(&ids(&second)[..4], &ids(&first)[..]);
    let added = &second.outputs()[4];
    assert_eq!(added.update_state, UpdateState::Unknown);
    assert_eq!(added.id.sequence(), 2);
}

#[test]
fn unchanged_subtree_skips_measure_and_bounds_recompute() {
    let counters = SpyCounters::new();
    let build = |value: u32| {
        Stack::component(vec![
            SpyLeaf::component(value, 12.0, &counters),
            SpyLeaf::component(9, 8.0, &counters),
        ])
    };

    let first = lay_out(&build(1)).expect("first");
    assert_eq!(counters.measure_calls(), 2);
    assert_eq!(counters.bounds_defined_calls(), 2);

    counters.reset();
    let second = lay_out_after(&build(1), Some(&first)).expect("second");
    assert_eq!(counters.measure_calls(), 0);
    assert_eq!(counters.bounds_defined_calls(), 0);
    assert_eq!(counters.transfer_calls(), 2);

    let contents = outputs_of_kind(&second, OutputKind::Content);
    let carried = contents[1]
        .interstage
        .as_ref()
        .and_then(|interstage| interstage.downcast_ref::<Rect>())
        .copied();
    assert_eq!(carried, Some(Rect::new(0.0, 12.0, 100.0, 8.0)));

    counters.reset();
    lay_out_after(&build(2), Some(&second)).expect("third");
    assert_eq!(counters.measure_calls(), 1);
    assert_eq!(counters.bounds_defined_calls(), 1);
}

#[test]
fn cached_measurements_can_be_turned_off() {
    let counters = SpyCounters::new();
    let build = || Stack::component(vec![SpyLeaf::component(1, 12.0, &counters)]);
    let first = lay_out(&build()).expect("first");
    counters.reset();

    let root = build();
    let request = LayoutRequest::new(&root, SizeSpec::exactly(100.0), SizeSpec::unspecified())
        .with_previous_diff(first.diff_tree())
        .with_config(LayoutConfig {
            use_cached_measurements: false,
            ..LayoutConfig::default()
        });
    calculate_layout(Arc::new(StackSolver::new()), request).expect("second");

    assert_eq!(counters.measure_calls(), 1);
    assert_eq!(counters.bounds_defined_calls(), 0);
}

#[test]
fn without_a_diff_tree_nothing_is_reused() {
    let root = list(&[1]);
    let request = LayoutRequest::new(&root, SizeSpec::exactly(100.0), SizeSpec::unspecified())
        .with_config(LayoutConfig {
            generate_diff_tree: false,
            ..LayoutConfig::default()
        });
    let first = calculate_layout(Arc::new(StackSolver::new()), request).expect("first");
    assert!(first.diff_tree().is_none());

    let second = lay_out_after(&list(&[1]), Some(&first)).expect("second");
    assert!(second
        .outputs()
        .iter()
        .all(|output| output.update_state == UpdateState::Unknown));
}

#[test]
fn decorations_wrap_content_and_children() {
    let root = Screen::component(|| {
        mosaic_core::Element::column()
            .background(Paint::component(1))
            .foreground(Paint::component(2))
            .border(Border::new(2.0, 0))
            .child(Leaf::component(1, 10.0))
    });
    let result = lay_out(&root).expect("layout");

    let kinds: Vec<OutputKind> = result.outputs().iter().map(|output| output.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OutputKind::Host,
            OutputKind::Background,
            OutputKind::Content,
            OutputKind::Foreground,
            OutputKind::Border
        ]
    );
    assert_eq!(
        result.outputs()[4].id.type_id(),
        LifecycleTypeId::of::<Border>().raw()
    );
}

#[test]
fn nested_holder_is_spliced_in_at_its_position() {
    let renders = Arc::new(AtomicUsize::new(0));
    let feed_renders = Arc::clone(&renders);
    let root = Screen::component(move || {
        mosaic_core::Element::column()
            .child(Leaf::component(100, 30.0))
            .child(Feed::component(3, &feed_renders))
    });
    let result = lay_out(&root).expect("layout");

    let bounds: Vec<Rect> = outputs_of_kind(&result, OutputKind::Content)
        .into_iter()
        .map(|output| output.bounds)
        .collect();
    assert_eq!(
        bounds,
        vec![
            Rect::new(0.0, 0.0, 100.0, 30.0),
            Rect::new(0.0, 30.0, 100.0, 40.0),
            Rect::new(0.0, 70.0, 100.0, 40.0),
            Rect::new(0.0, 110.0, 100.0, 40.0),
        ]
    );
    assert_eq!(result.size().height, 150.0);
    assert_eq!(renders.load(Ordering::SeqCst), 1);
}

#[test]
fn holder_below_the_root_is_resolved_again_every_pass() {
    let renders = Arc::new(AtomicUsize::new(0));
    let counters = SpyCounters::new();
    let build = || {
        Stack::component(vec![
            Leaf::component(100, 30.0),
            Feed::spied(2, &renders, &counters),
        ])
    };

    let first = lay_out(&build()).expect("first");
    assert_eq!(counters.bounds_defined_calls(), 2);

    counters.reset();
    let second = lay_out_after(&build(), Some(&first)).expect("second");

    assert_eq!(ids(&first), ids(&second));
    let states: Vec<UpdateState> = outputs_of_kind(&second, OutputKind::Content)
        .into_iter()
        .map(|output| output.update_state)
        .collect();
    assert_eq!(
        states,
        vec![UpdateState::Updated, UpdateState::Dirty, UpdateState::Dirty]
    );
    assert_eq!(counters.bounds_defined_calls(), 2);
    assert_eq!(counters.measure_calls(), 2);
    assert_eq!(counters.transfer_calls(), 0);
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

#[test]
fn sibling_keys_are_made_unique() {
    let root = Stack::component(vec![
        Leaf::component(1, 1.0),
        Leaf::component(2, 1.0),
        Leaf::component(3, 1.0).with_key("pinned"),
    ]);
    let result = lay_out(&root).expect("layout");

    let stack = LifecycleTypeId::of::<Stack>().raw();
    let leaf = LifecycleTypeId::of::<Leaf>().raw();
    let keys: Vec<String> = outputs_of_kind(&result, OutputKind::Content)
        .into_iter()
        .filter_map(|output| output.component.as_ref()?.global_key().map(str::to_owned))
        .collect();
    assert_eq!(
        keys,
        vec![
            format!("{stack},{leaf}"),
            format!("{stack},{leaf}!1"),
            format!("{stack},pinned"),
        ]
    );
}

#[test]
fn queued_state_updates_apply_during_the_pass() {
    let root = Counter::component(5);
    let key = LifecycleTypeId::of::<Counter>().raw().to_string();
    let mut handle = StateHandle::new();

    let first = calculate_layout(
        Arc::new(StackSolver::new()),
        LayoutRequest::new(&root, SizeSpec::exactly(100.0), SizeSpec::unspecified())
            .with_state(handle.snapshot()),
    )
    .expect("first");
    assert_eq!(leaf_values(&first), vec![5]);
    handle.commit(first.state());

    handle.enqueue(&key, StateUpdate::new(|count: &u32| count + 1));
    handle.enqueue(&key, StateUpdate::new(|count: &u32| count * 10));
    let second = calculate_layout(
        Arc::new(StackSolver::new()),
        LayoutRequest::new(&root, SizeSpec::exactly(100.0), SizeSpec::unspecified())
            .with_previous_diff(first.diff_tree())
            .with_state(handle.snapshot()),
    )
    .expect("second");

    assert_eq!(leaf_values(&second), vec![60]);
    assert!(second.state().was_updated(&key));
    assert_eq!(second.state().consumed_count(), 2);

    handle.commit(second.state());
    assert!(!handle.has_pending());
    let committed = handle
        .committed(&key)
        .and_then(|value| value.downcast_ref::<u32>())
        .copied();
    assert_eq!(committed, Some(60));
}

#[test]
fn too_deep_host_nesting_fails_the_pass() {
    let err = lay_out(&nested_hosts(300)).expect_err("level overflow");
    assert!(matches!(err, LayoutError::LevelOverflow { .. }));
}

#[test]
fn deep_nesting_within_the_level_cap_fits_a_default_thread_stack() {
    let laid_out = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| lay_out(&nested_hosts(250)).map(|result| result.output_count()))
        .expect("spawn")
        .join()
        .expect("layout thread");

    // Root host, one host per stack and the leaf.
    assert_eq!(laid_out.expect("layout"), 252);
}

#[test]
fn sorted_orders_put_hosts_first_on_equal_tops() {
    let result = lay_out(&list(&[1, 2])).expect("layout");

    assert_eq!(result.tops(), &[0, 1, 2, 3]);
    assert_eq!(result.bottoms(), &[2, 3, 1, 0]);
}

#[test]
fn compatibility_tracks_root_identity_and_specs() {
    let root = list(&[1]);
    let result = lay_out(&root).expect("layout");

    assert!(result.is_compatible(root.id(), SizeSpec::exactly(100.0), SizeSpec::unspecified()));
    assert!(result.is_compatible(root.id(), SizeSpec::exactly(100.2), SizeSpec::exactly(10.2)));
    assert!(!result.is_compatible(root.id(), SizeSpec::exactly(100.0), SizeSpec::exactly(20.0)));
    assert!(!result.is_compatible(root.id(), SizeSpec::exactly(80.0), SizeSpec::unspecified()));
    let copy = root.shallow_copy_with_new_id();
    assert!(!result.is_compatible(copy.id(), SizeSpec::exactly(100.0), SizeSpec::unspecified()));
}
