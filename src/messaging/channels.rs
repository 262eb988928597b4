// Lock-free channels between the editor and the UI

use crate::messaging::edit::FieldEdit;
use crate::messaging::event::EditorEvent;
use ringbuf::{HeapRb, traits::Split};

/// Property panel -> editor
pub type EditProducer = ringbuf::HeapProd<FieldEdit>;
pub type EditConsumer = ringbuf::HeapCons<FieldEdit>;

pub fn create_edit_channel(capacity: usize) -> (EditProducer, EditConsumer) {
    let rb = HeapRb::<FieldEdit>::new(capacity);
    rb.split()
}

/// Editor -> UI
pub type EventProducer = ringbuf::HeapProd<EditorEvent>;
pub type EventConsumer = ringbuf::HeapCons<EditorEvent>;

pub fn create_event_channel(capacity: usize) -> (EventProducer, EventConsumer) {
    let rb = HeapRb::<EditorEvent>::new(capacity);
    rb.split()
}
