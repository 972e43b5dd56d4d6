use std::sync::{Arc, Mutex};

use crate::visibility::{VisibilityStats, VisibilityTracker};
use mosaic_core::{Event, EventHandler, Rect, VisibilityHandlers};
use mosaic_layout::{OutputId, VisibilityOutput};

fn recording_handlers(log: &Arc<Mutex<Vec<Event>>>) -> VisibilityHandlers {
    let handler = |log: &Arc<Mutex<Vec<Event>>>| {
        let log = Arc::clone(log);
        Some(EventHandler::new(move |event| {
            log.lock().expect("log").push(*event)
        }))
    };
    VisibilityHandlers {
        visible: handler(log),
        focused: handler(log),
        full_impression: handler(log),
        invisible: handler(log),
    }
}

fn output(raw: u64, bounds: Rect, handlers: VisibilityHandlers) -> VisibilityOutput {
    VisibilityOutput {
        id: OutputId::from_raw(raw),
        bounds,
        handlers,
        global_key: None,
    }
}

#[test]
fn partial_entry_then_full_then_exit() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let outputs = vec![output(1, Rect::new(0.0, 80.0, 100.0, 40.0), recording_handlers(&log))];
    let mut tracker = VisibilityTracker::new();

    // Only 20 of 40 rows visible in a 100 high viewport.
    tracker.process(&outputs, Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    assert_eq!(*log.lock().expect("log"), vec![Event::Visible]);

    tracker.process(&outputs, Some(Rect::new(0.0, 50.0, 100.0, 100.0)));
    assert_eq!(
        *log.lock().expect("log"),
        vec![Event::Visible, Event::FullImpression, Event::Focused]
    );

    tracker.process(&outputs, Some(Rect::new(0.0, 200.0, 100.0, 100.0)));
    assert_eq!(log.lock().expect("log").last(), Some(&Event::Invisible));
    assert_eq!(tracker.tracked(), 0);
}

#[test]
fn repeated_processing_fires_nothing_new() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let outputs = vec![output(1, Rect::new(0.0, 0.0, 10.0, 10.0), recording_handlers(&log))];
    let mut tracker = VisibilityTracker::new();

    let first = tracker.process(&outputs, None);
    assert_eq!(first.visible, 1);
    let second = tracker.process(&outputs, None);
    assert_eq!(second, VisibilityStats::default());
}

#[test]
fn dropped_outputs_and_clear_fire_invisible() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let a = output(1, Rect::new(0.0, 0.0, 10.0, 10.0), recording_handlers(&log));
    let b = output(2, Rect::new(0.0, 10.0, 10.0, 10.0), recording_handlers(&log));
    let mut tracker = VisibilityTracker::new();

    tracker.process(&[a.clone(), b], None);
    let stats = tracker.process(&[a], None);
    assert_eq!(stats.invisible, 1);
    assert!(tracker.is_tracked(OutputId::from_raw(1)));

    assert_eq!(tracker.clear().invisible, 1);
    assert_eq!(tracker.tracked(), 0);
}
