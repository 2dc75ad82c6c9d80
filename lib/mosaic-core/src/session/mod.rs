pub use backend::*;
pub use drag_tracker::*;
pub use event_bridge::*;
pub use surface::*;

mod backend;
mod drag_tracker;
mod event_bridge;
mod surface;
