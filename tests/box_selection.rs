//! Box selection against a realistic scope of notes and events

use egui::{Pos2, Rect, pos2};
use rhythm_chart_editor::chart::{EntityStore, SelectableEntity, TimedEvent};
use rhythm_chart_editor::selection::{BoxSelector, BoxTick, PointerFrame, SelectionSet};
use rhythm_chart_editor::{Note, NoteKind};

fn square(min: Pos2, size: f32) -> Rect {
    Rect::from_min_size(min, egui::vec2(size, size))
}

fn release_box(
    selector: &mut BoxSelector,
    store: &mut EntityStore,
    selection: &mut SelectionSet,
    from: Pos2,
    to: Pos2,
) -> BoxTick {
    selector.tick(PointerFrame::new(from, true), store, selection);
    selector.tick(PointerFrame::new(to, true), store, selection);
    selector.tick(PointerFrame::new(to, false), store, selection)
}

/// Corner at (5,5) is inside [(0,0),(10,10)], a far entity is not
#[test]
fn test_reference_rectangle() {
    let mut store = EntityStore::new();
    store.insert(Note::new(1, NoteKind::Tap, 0.0).with_bounds(square(pos2(5.0, 5.0), 30.0)));
    store.insert(Note::new(2, NoteKind::Tap, 0.0).with_bounds(square(pos2(50.0, 50.0), 5.0)));
    let mut selection = SelectionSet::new();
    let mut selector = BoxSelector::default();

    release_box(
        &mut selector,
        &mut store,
        &mut selection,
        pos2(0.0, 0.0),
        pos2(10.0, 10.0),
    );

    assert_eq!(selection.transmit(), vec![1]);
    assert!(store.get(1).unwrap().is_selected());
    assert!(!store.get(2).unwrap().is_selected());
}

/// Dragging up-left selects the same as dragging down-right
#[test]
fn test_drag_direction_does_not_matter() {
    let mut store = EntityStore::new();
    store.insert(Note::new(1, NoteKind::Drag, 0.0).with_bounds(square(pos2(5.0, 5.0), 2.0)));
    store.insert(TimedEvent::new(2, 0.0, 4.0).with_bounds(square(pos2(8.0, 1.0), 4.0)));
    let mut selection = SelectionSet::new();
    let mut selector = BoxSelector::default();

    release_box(
        &mut selector,
        &mut store,
        &mut selection,
        pos2(10.0, 10.0),
        pos2(0.0, 0.0),
    );

    assert_eq!(selection.transmit(), vec![1, 2]);
    assert_eq!(selection.describe(&store), "1 note, 1 event");
}

/// A zero-size box is a click: the selection is emptied
#[test]
fn test_degenerate_rectangle_selects_nothing() {
    let mut store = EntityStore::new();
    store.insert(Note::new(1, NoteKind::Tap, 0.0).with_bounds(square(pos2(0.0, 0.0), 10.0)));
    let mut selection = SelectionSet::new();
    selection.add(&mut store, 1);
    let mut selector = BoxSelector::default();

    let tick = release_box(
        &mut selector,
        &mut store,
        &mut selection,
        pos2(5.0, 5.0),
        pos2(5.0, 5.0),
    );

    assert_eq!(tick, BoxTick::Released { selected: 0 });
    assert!(selection.is_empty());
}

/// Entities without view bounds are never hit
#[test]
fn test_entities_without_bounds() {
    let mut store = EntityStore::new();
    store.insert(Note::new(1, NoteKind::Tap, 0.0));
    let mut selection = SelectionSet::new();
    let mut selector = BoxSelector::default();

    let tick = release_box(
        &mut selector,
        &mut store,
        &mut selection,
        pos2(-1000.0, -1000.0),
        pos2(1000.0, 1000.0),
    );

    assert_eq!(tick, BoxTick::Released { selected: 0 });
}

/// Empty scope is not an error
#[test]
fn test_empty_scope() {
    let mut store = EntityStore::new();
    let mut selection = SelectionSet::new();
    let mut selector = BoxSelector::default();

    let tick = release_box(
        &mut selector,
        &mut store,
        &mut selection,
        pos2(0.0, 0.0),
        pos2(100.0, 100.0),
    );

    assert_eq!(tick, BoxTick::Released { selected: 0 });
}

/// Two selectors sharing a scope never both own an entity
#[test]
fn test_selection_exclusivity() {
    let mut store = EntityStore::new();
    for id in 1..=4 {
        let x = id as f32 * 10.0;
        store.insert(Note::new(id, NoteKind::Tap, 0.0).with_bounds(square(pos2(x, 0.0), 4.0)));
    }
    let mut first = SelectionSet::new();
    let mut second = SelectionSet::new();
    let mut selector = BoxSelector::default();

    release_box(
        &mut selector,
        &mut store,
        &mut first,
        pos2(0.0, -1.0),
        pos2(33.0, 5.0),
    );
    assert_eq!(first.transmit(), vec![1, 2, 3]);

    release_box(
        &mut selector,
        &mut store,
        &mut second,
        pos2(25.0, -1.0),
        pos2(60.0, 5.0),
    );
    assert_eq!(second.transmit(), vec![3, 4]);

    first.prune(&store);
    assert_eq!(first.transmit(), vec![1, 2]);
    for entity in store.iter() {
        let owners = [first.contains(entity.id()), second.contains(entity.id())];
        assert!(owners.iter().filter(|o| **o).count() <= 1);
    }
}
