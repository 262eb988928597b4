// Editor module - per-frame session driving selection and batch editing

pub mod session;

pub use session::{EditorSession, TickReport};
