pub mod controller;
pub mod edit_session;
pub mod event;
pub mod input;
pub mod render;
pub mod terminal;
pub mod transient;
pub mod view;

pub use controller::{Controller, DragState};
pub use edit_session::EditSession;
pub use event::BoardEvent;
pub use transient::TransitionTimings;
pub use view::BoardView;
