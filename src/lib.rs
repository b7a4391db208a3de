//! Prism - a live local mirror of remote scene-item state.
//!
//! Prism keeps a client-side replica of a named scene item inside a
//! compositing/streaming application, refreshed by polling over the
//! application's request/response control channel, and pushes partial
//! property updates back over the same channel.

// Scene item property model, partial updates and decoding
pub mod properties;

// Remote control channel: consumed trait and websocket implementation
pub mod channel;

// Mirrored scene items and the refresh engine
pub mod mirror;

// Configuration
pub mod config;

// Re-export public types
pub use channel::{ChannelError, ObsChannel, RemoteChannel};
pub use mirror::{CreateError, Mirror, MirroredSceneItem, RefreshStatus};
pub use properties::{SceneItemProperties, SceneItemUpdate};
