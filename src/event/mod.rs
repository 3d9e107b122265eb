mod bus;
mod events;
mod handlers;

pub use bus::EventBus;
pub use events::EventType;
pub use handlers::{CleanupToken, Listener, ListenerId};
