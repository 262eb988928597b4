// Messaging module - ring buffer channels between the editor core and the UI

pub mod channels;
pub mod edit;
pub mod event;
pub mod notification;

pub use channels::{
    EditConsumer, EditProducer, EventConsumer, EventProducer, create_edit_channel,
    create_event_channel,
};
pub use edit::FieldEdit;
pub use event::EditorEvent;
pub use notification::{Notification, NotificationCategory, NotificationLevel};
