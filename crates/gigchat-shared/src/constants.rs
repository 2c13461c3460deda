/// Application name
pub const APP_NAME: &str = "GigChat";

/// Maximum message content length in characters (enforced server-side on the
/// REST create path; mirrored here so sends fail before hitting the wire)
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Default base URL for the REST API
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default base URL for the chat WebSocket endpoint
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000";
