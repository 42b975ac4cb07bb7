pub mod events;
pub mod selection;
pub mod viewport;

pub use events::{PointerEvent, collect_pointer_events};
pub use selection::{MIN_SELECTION_SIZE, SelectionChange, SelectionController, SelectionState};
pub use viewport::{ViewportMapping, letterbox_offset, scale_to_fit};
