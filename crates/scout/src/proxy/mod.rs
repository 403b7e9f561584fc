mod server;
mod streaming;

pub use server::{AppState, ChatServer, create_router};
pub use streaming::{SseResponse, StreamEvent, relay};
