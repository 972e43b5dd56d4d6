use crate::output::{OutputKind, UpdateState};
use crate::output_id::{OutputId, OutputIdCalculator, MAX_LEVEL, MAX_SEQUENCE};
use mosaic_core::{LayoutError, LifecycleTypeId};

#[derive(Debug)]
struct Text;

fn text_type() -> LifecycleTypeId {
    LifecycleTypeId::of::<Text>()
}

#[test]
fn ids_decompose_into_their_fields() {
    let mut ids = OutputIdCalculator::new();
    let (id, state) = ids
        .calculate(text_type(), 3, OutputKind::Border, None, false)
        .unwrap();
    assert_eq!(state, UpdateState::Unknown);
    assert_eq!(id.level(), 3);
    assert_eq!(id.kind(), Some(OutputKind::Border));
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.type_id(), text_type().raw());
}

#[test]
fn same_signature_gets_increasing_sequences() {
    let mut ids = OutputIdCalculator::new();
    let (first, _) = ids
        .calculate(text_type(), 1, OutputKind::Content, None, false)
        .unwrap();
    let (second, _) = ids
        .calculate(text_type(), 1, OutputKind::Content, None, false)
        .unwrap();
    let (other_kind, _) = ids
        .calculate(text_type(), 1, OutputKind::Background, None, false)
        .unwrap();
    assert_eq!(first.sequence(), 0);
    assert_eq!(second.sequence(), 1);
    assert_eq!(other_kind.sequence(), 0);
    assert_ne!(first, other_kind);
}

#[test]
fn previous_sequence_is_reused_when_unclaimed() {
    let mut ids = OutputIdCalculator::new();
    let (previous, _) = {
        let mut earlier = OutputIdCalculator::new();
        earlier
            .calculate(text_type(), 1, OutputKind::Content, None, false)
            .unwrap();
        earlier
            .calculate(text_type(), 1, OutputKind::Content, None, false)
            .unwrap()
    };
    assert_eq!(previous.sequence(), 1);

    let (reused, state) = ids
        .calculate(text_type(), 1, OutputKind::Content, Some(previous), true)
        .unwrap();
    assert_eq!(reused, previous);
    assert_eq!(state, UpdateState::Updated);

    // Sequence 1 is now claimed; a second claimant falls back to a fresh one.
    let (fresh, state) = ids
        .calculate(text_type(), 1, OutputKind::Content, Some(previous), true)
        .unwrap();
    assert_eq!(fresh.sequence(), 2);
    assert_eq!(state, UpdateState::Unknown);
}

#[test]
fn reused_id_without_valid_cache_is_dirty() {
    let mut ids = OutputIdCalculator::new();
    let (previous, _) = OutputIdCalculator::new()
        .calculate(text_type(), 2, OutputKind::Content, None, false)
        .unwrap();
    let (id, state) = ids
        .calculate(text_type(), 2, OutputKind::Content, Some(previous), false)
        .unwrap();
    assert_eq!(id, previous);
    assert_eq!(state, UpdateState::Dirty);
}

#[test]
fn previous_id_from_another_level_is_ignored() {
    let mut ids = OutputIdCalculator::new();
    let (previous, _) = OutputIdCalculator::new()
        .calculate(text_type(), 4, OutputKind::Content, None, false)
        .unwrap();
    let (id, state) = ids
        .calculate(text_type(), 2, OutputKind::Content, Some(previous), true)
        .unwrap();
    assert_eq!(id.level(), 2);
    assert_eq!(state, UpdateState::Unknown);
}

#[test]
fn reset_clears_claimed_sequences() {
    let mut ids = OutputIdCalculator::new();
    let (first, _) = ids
        .calculate(text_type(), 1, OutputKind::Content, None, false)
        .unwrap();
    ids.reset();
    let (again, _) = ids
        .calculate(text_type(), 1, OutputKind::Content, None, false)
        .unwrap();
    assert_eq!(first, again);
}

#[test]
fn level_beyond_capacity_is_rejected() {
    let mut ids = OutputIdCalculator::new();
    let err = ids
        .calculate(text_type(), MAX_LEVEL + 1, OutputKind::Host, None, false)
        .unwrap_err();
    assert_eq!(err, LayoutError::LevelOverflow { level: MAX_LEVEL + 1 });
}

#[test]
fn sequence_beyond_capacity_is_rejected() {
    let mut ids = OutputIdCalculator::new();
    let last = OutputId::from_raw(u64::from(MAX_SEQUENCE));
    let (id, _) = ids
        .calculate(LifecycleTypeId::NONE, 0, OutputKind::Content, Some(last), false)
        .unwrap();
    assert_eq!(id.sequence(), MAX_SEQUENCE);
    let err = ids
        .calculate(LifecycleTypeId::NONE, 0, OutputKind::Content, None, false)
        .unwrap_err();
    assert_eq!(
        err,
        LayoutError::SequenceOverflow {
            sequence: MAX_SEQUENCE + 1
        }
    );
}
