// Quick demonstration of box selection and batch editing
// Run with: cargo run --bin demo_batch_edit

use egui::{Rect, pos2};
use ringbuf::traits::{Consumer, Producer};
use rhythm_chart_editor::chart::field::FieldId;
use rhythm_chart_editor::{
    BeatClock, BpmSegment, EditorConfig, EditorEvent, EditorSession, FieldEdit, Note, NoteKind,
    PointerFrame, create_edit_channel, create_event_channel,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Rhythm Chart Editor - Batch Edit Demo");
    println!("=====================================");

    let config = EditorConfig::default();
    let (event_tx, mut event_rx) = create_event_channel(config.messaging.event_capacity);
    let (mut edit_tx, edit_rx) = create_edit_channel(config.messaging.edit_capacity);

    let clock = BeatClock::new(vec![BpmSegment::new(0.0, 120.0), BpmSegment::new(16.0, 180.0)])?;
    let mut session = EditorSession::new(clock, config, event_tx, edit_rx);

    // Four notes laid out left to right, each 20px wide
    let kinds = [NoteKind::Tap, NoteKind::Drag, NoteKind::Flick, NoteKind::Hold];
    for (i, kind) in kinds.into_iter().enumerate() {
        let x = i as f32 * 40.0;
        let note = Note::new(i as u64 + 1, kind, 14.0 + i as f64)
            .with_lane_position(i as f64 * 0.5)
            .with_bounds(Rect::from_min_max(pos2(x, 0.0), pos2(x + 20.0, 20.0)));
        session.insert_note(note);
    }
    println!("\nInserted {} notes", session.store().len());

    // Drag a box over the first three
    for frame in [
        PointerFrame::new(pos2(-10.0, -10.0), true),
        PointerFrame::new(pos2(100.0, 30.0), true),
        PointerFrame::new(pos2(100.0, 30.0), false),
    ] {
        session.tick(frame);
    }

    println!("\nSelection: {:?}", session.selection().transmit());
    for (field, value) in session.working().iter() {
        println!("   - {:<12} {}", field, value);
    }

    // Move every selected note to the same lane
    if edit_tx
        .try_push(FieldEdit::number(FieldId::LanePosition, 0.75))
        .is_err()
    {
        return Err("edit channel full".into());
    }
    let report = session.tick(PointerFrame::new(pos2(0.0, 0.0), false));
    println!(
        "\nPropagated {:?} to {} notes",
        report.sync.propagated, report.sync.entities
    );

    let chart = session.export()?;
    println!("\nRuntime chart:");
    for note in &chart.notes {
        println!(
            "   - {:?} at {:.3}s, x = {:.2}",
            note.kind, note.hit_time, note.position_x
        );
    }

    println!("\nEvents:");
    while let Some(event) = event_rx.try_pop() {
        match event {
            EditorEvent::Notice(notice) => println!("   - {:?}: {}", notice.level, notice.message),
            other => println!("   - {:?}", other),
        }
    }

    Ok(())
}
