// Messaging core: conversation directory, history loader, and the live
// stream bridge, reconciled into one in-memory timeline.

pub mod client;
pub mod error;
pub mod events;
pub mod state;

mod directory;
mod history;
mod messaging;
mod stream_bridge;

use tracing_subscriber::{fmt, EnvFilter};

pub use client::{ChatClient, NavTarget};
pub use error::ChatError;
pub use events::{ChatEvent, EventReceiver};
pub use state::{ChatState, StreamHandle};

/// Initialize tracing for the terminal binary (respects `RUST_LOG`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gigchat_client=debug,gigchat_net=debug,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
