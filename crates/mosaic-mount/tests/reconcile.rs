use std::sync::{Arc, Mutex};

use mosaic_core::{Element, Event, EventHandler, MountError, Rect, Set};
use mosaic_layout::{LayoutResult, OutputId};
use mosaic_mount::{MountState, VisibilityStats};
use mosaic_testing::{
    lay_out, lay_out_after, Canvas, Leaf, Paint, RecordingProvider, Screen, Stack,
};

fn hosted_pair(second: u32) -> mosaic_core::Component {
    Stack::hosted(
        "pair",
        vec![Leaf::component(1, 10.0), Leaf::component(second, 10.0)],
    )
}

fn tall_list() -> Arc<LayoutResult> {
    let root = Stack::component((0..20).map(|value| Leaf::component(value, 10.0)).collect());
    lay_out(&root).expect("layout")
}

fn all_ids(result: &LayoutResult) -> Vec<OutputId> {
    let mut ids: Vec<OutputId> = result.outputs().iter().map(|output| output.id).collect();
    ids.sort_unstable();
    ids
}

fn visible_ids(result: &LayoutResult, visible: Rect) -> Vec<OutputId> {
    let mut ids: Vec<OutputId> = result
        .outputs()
        .iter()
        .filter(|output| output.host.is_none() || visible.intersects(&output.bounds))
        .map(|output| output.id)
        .collect();
    ids.sort_unstable();
    ids
}

#[test]
fn full_mount_converges_to_every_output() {
    let result = lay_out(&hosted_pair(2)).expect("layout");
    let mut state = MountState::new(RecordingProvider::new());

    let stats = state.mount(&result, None);

    assert_eq!(stats.mounted, 4);
    assert_eq!(state.mounted_ids(), all_ids(&result));
    let host = result.outputs()[1].id;
    assert_eq!(state.child_count(host), 2);
    let leaf = state.item(result.outputs()[3].id).expect("mounted leaf");
    assert_eq!(leaf.content().host, Some(host));
    assert_eq!(leaf.content().bounds, Rect::new(0.0, 10.0, 100.0, 10.0));
}

#[test]
fn only_the_changed_leaf_is_rebound() {
    let first = lay_out(&hosted_pair(2)).expect("first");
    let second = lay_out_after(&hosted_pair(7), Some(&first)).expect("second");
    let mut state = MountState::new(RecordingProvider::new());
    state.mount(&first, None);
    state.provider_mut().take_calls();

    let stats = state.mount(&second, None);

    let calls = state.provider().calls();
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.no_op_updates, 3);
    assert_eq!(calls.acquire_release(), 0);
    assert_eq!(calls.bound, 1);
    let rebound = state.item(second.outputs()[3].id).expect("leaf");
    assert_eq!(rebound.output().component.as_ref().and_then(|c| c.downcast::<Leaf>()).map(|l| l.value), Some(7));
}

#[test]
fn narrowing_the_window_unmounts_leaves_but_keeps_their_host() {
    let result = lay_out(&hosted_pair(2)).expect("layout");
    let mut state = MountState::new(RecordingProvider::new());
    state.mount(&result, None);
    state.provider_mut().take_calls();

    let first_leaf = result.outputs()[2].bounds;
    let stats = state.mount(&result, Some(first_leaf));

    assert_eq!(stats.unmounted, 1);
    assert!(!state.is_mounted(result.outputs()[3].id));
    assert!(state.is_mounted(result.outputs()[0].id));
    assert!(state.is_mounted(result.outputs()[1].id));
    assert!(state.is_mounted(result.outputs()[2].id));
    assert_eq!(state.provider().calls().released, 1);
    assert_eq!(state.provider().calls().acquired, 0);
}

#[test]
fn repeating_a_windowed_mount_does_nothing() {
    let result = tall_list();
    let mut state = MountState::new(RecordingProvider::new());
    let window = Rect::new(0.0, 25.0, 100.0, 40.0);
    state.mount(&result, Some(window));
    state.provider_mut().take_calls();

    let stats = state.mount(&result, Some(window));

    assert!(stats.is_quiet());
    assert_eq!(state.provider().calls().acquire_release(), 0);
    assert_eq!(state.mounted_ids(), visible_ids(&result, window));
}

#[test]
fn scrolling_touches_only_outputs_crossing_the_edges() {
    let result = tall_list();
    let mut state = MountState::new(RecordingProvider::new());
    let top = Rect::new(0.0, 0.0, 100.0, 50.0);
    let scrolled = Rect::new(0.0, 30.0, 100.0, 50.0);

    let initial = state.mount(&result, Some(top));
    assert_eq!(initial.mounted, 6);

    let down = state.mount(&result, Some(scrolled));
    assert_eq!((down.mounted, down.unmounted), (3, 3));
    assert_eq!(state.mounted_ids(), visible_ids(&result, scrolled));

    let up = state.mount(&result, Some(top));
    assert_eq!((up.mounted, up.unmounted), (3, 3));
    assert_eq!(state.mounted_ids(), visible_ids(&result, top));

    let far = Rect::new(0.0, 150.0, 100.0, 30.0);
    state.mount(&result, Some(far));
    assert_eq!(state.mounted_ids(), visible_ids(&result, far));
    assert!(state.is_mounted(result.outputs()[0].id));
}

#[test]
fn pooled_content_is_recycled_while_scrolling() {
    let result = tall_list();
    let mut state = MountState::new(RecordingProvider::new());
    state.mount(&result, Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    state.mount(&result, Some(Rect::new(0.0, 30.0, 100.0, 50.0)));

    let calls = state.provider().calls();
    // Root host plus five leaves, then three leaves back out of the pool.
    assert_eq!(calls.created, 6);
    assert_eq!(calls.acquired, 9);
}

#[test]
fn failed_acquisition_skips_only_that_output() {
    let result = lay_out(&hosted_pair(2)).expect("layout");
    let leaf_type = result.outputs()[2].content_type;
    let mut provider = RecordingProvider::new();
    provider.fail_acquire(leaf_type);
    let mut state = MountState::new(provider);

    let stats = state.mount(&result, None);

    assert_eq!(stats.failed, 2);
    assert_eq!(stats.mounted, 2);
    assert_eq!(state.errors().len(), 2);
    assert!(matches!(
        state.errors()[0],
        MountError::AcquireFailed { id, .. } if id == result.outputs()[2].id.raw()
    ));

    state.provider_mut().heal();
    let retry = state.mount(&result, None);
    assert_eq!(retry.mounted, 2);
    assert!(state.errors().is_empty());
    assert_eq!(state.mounted_ids(), all_ids(&result));
}

#[test]
fn shifted_outputs_are_moved_not_remounted() {
    let plain = Screen::component(|| {
        Element::column()
            .child(Leaf::component(1, 10.0))
            .child(Leaf::component(2, 10.0))
    });
    let painted = Screen::component(|| {
        Element::column()
            .background(Paint::component(3))
            .child(Leaf::component(1, 10.0))
            .child(Leaf::component(2, 10.0))
    });
    let first = lay_out(&plain).expect("first");
    let second = lay_out_after(&painted, Some(&first)).expect("second");
    assert_eq!(first.outputs()[1].id, second.outputs()[2].id);

    let mut state = MountState::new(RecordingProvider::new());
    state.mount(&first, None);
    let serial = state.item(first.outputs()[1].id).expect("leaf").content().serial;

    let stats = state.mount(&second, None);

    assert_eq!(stats.moved, 2);
    assert_eq!(stats.mounted, 1);
    assert_eq!(stats.unmounted, 0);
    let moved = state.item(second.outputs()[2].id).expect("leaf");
    assert_eq!(moved.content().serial, serial);
    assert_eq!(moved.index(), 2);
    assert_eq!(moved.content().index, 2);
}

#[test]
fn removed_outputs_are_unmounted_on_a_new_result() {
    let first = lay_out(&hosted_pair(2)).expect("first");
    let smaller = Stack::hosted("pair", vec![Leaf::component(1, 10.0)]);
    let second = lay_out_after(&smaller, Some(&first)).expect("second");

    let mut state = MountState::new(RecordingProvider::new());
    state.mount(&first, None);
    let stats = state.mount(&second, None);

    assert_eq!(stats.unmounted, 1);
    assert_eq!(state.mounted_ids(), all_ids(&second));
}

#[test]
fn without_incremental_mount_the_window_is_ignored() {
    let result = tall_list();
    let mut state = MountState::new(RecordingProvider::new()).with_incremental_mount(false);

    state.mount(&result, Some(Rect::new(0.0, 0.0, 100.0, 10.0)));

    assert_eq!(state.mounted_count(), result.output_count());
}

#[test]
fn incremental_content_receives_its_visible_part() {
    let root = Stack::component(vec![Canvas::component(100.0)]);
    let result = lay_out(&root).expect("layout");
    let mut state = MountState::new(RecordingProvider::new());

    state.mount(&result, Some(Rect::new(0.0, 20.0, 100.0, 50.0)));

    let canvas = state.item(result.outputs()[1].id).expect("canvas");
    assert_eq!(canvas.content().visible, Some(Rect::new(0.0, 20.0, 100.0, 50.0)));
}

#[test]
fn visibility_handlers_follow_the_window() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&events);
    let handler = EventHandler::new(move |event| recorded.lock().expect("events").push(*event));
    let root = Screen::component(move || {
        Element::column()
            .child(Leaf::component(0, 50.0))
            .child(
                Element::component(Leaf::component(1, 20.0))
                    .on_visible(handler.clone())
                    .on_invisible(handler.clone()),
            )
    });
    let result = lay_out(&root).expect("layout");
    let mut state = MountState::new(RecordingProvider::new());

    let stats = state.mount(&result, Some(Rect::new(0.0, 0.0, 100.0, 40.0)));
    assert!(events.lock().expect("events").is_empty());
    assert_eq!(stats.visibility, VisibilityStats::default());

    let stats = state.mount(&result, Some(Rect::new(0.0, 40.0, 100.0, 40.0)));
    assert_eq!(*events.lock().expect("events"), vec![Event::Visible]);
    assert_eq!(stats.visibility.visible, 1);

    let stats = state.unmount_all();
    assert_eq!(stats.visibility.invisible, 1);
    assert_eq!(
        *events.lock().expect("events"),
        vec![Event::Visible, Event::Invisible]
    );
}

#[test]
fn unmount_all_releases_everything() {
    let result = lay_out(&hosted_pair(2)).expect("layout");
    let mut state = MountState::new(RecordingProvider::new());
    state.mount(&result, None);

    let stats = state.unmount_all();

    assert_eq!(stats.unmounted, 4);
    assert_eq!(state.mounted_count(), 0);
    assert_eq!(state.provider().calls().released, 4);
    assert_eq!(state.last_mounted_result_id(), None);
    let pooled: Set<_> = result.outputs().iter().map(|output| output.content_type).collect();
    assert!(pooled
        .into_iter()
        .all(|content_type| state.provider().pooled(content_type) > 0));
}
