use crate::properties::{DecodeError, SceneItemProperties, SceneItemUpdate};
use async_trait::async_trait;
use std::fmt;

mod obs;

pub use obs::ObsChannel;

/// Request/response control channel to the remote compositing application.
///
/// This is the seam the synchronization engine depends on: one operation to
/// fetch the full property set of an item and one to apply a sparse update.
/// Both are asynchronous round trips that may fail, may be issued
/// concurrently, and carry no ordering guarantee between overlapping calls.
/// Callers that need an ordering must build it themselves.
///
/// # Example
/// ```no_run
/// use prism::channel::{ChannelError, RemoteChannel};
/// use prism::properties::{SceneItemProperties, SceneItemUpdate};
/// use async_trait::async_trait;
///
/// struct OfflineChannel;
///
/// #[async_trait]
/// impl RemoteChannel for OfflineChannel {
///     async fn fetch_properties(
///         &self,
///         item: &str,
///         scene: Option<&str>,
///     ) -> Result<SceneItemProperties, ChannelError> {
///         Err(ChannelError::Remote(format!("no such item: {}", item)))
///     }
///
///     async fn apply_properties(
///         &self,
///         item: &str,
///         update: &SceneItemUpdate,
///     ) -> Result<(), ChannelError> {
///         // Send only the set fields; the rest stay untouched remotely
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait RemoteChannel: Send + Sync {
    /// Fetches the full property set of the named item.
    ///
    /// `scene` selects the containing scene; `None` means whatever the
    /// remote considers current. A missing item is indistinguishable from
    /// any other remote failure ([`ChannelError::Remote`]).
    async fn fetch_properties(
        &self,
        item: &str,
        scene: Option<&str>,
    ) -> Result<SceneItemProperties, ChannelError>;

    /// Applies a sparse property update to the named item.
    ///
    /// Fields left `None` in the update must remain unaffected remotely.
    async fn apply_properties(
        &self,
        item: &str,
        update: &SceneItemUpdate,
    ) -> Result<(), ChannelError>;
}

/// Channel operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// Opening the session failed. Fatal: there is no channel to speak over.
    Connect(String),
    /// Sending or receiving failed, or the session closed mid-request.
    Transport(String),
    /// The remote side rejected the request.
    Remote(String),
    /// The response payload had an unexpected shape.
    Decode(DecodeError),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Connect(reason) => write!(f, "connection failed: {}", reason),
            ChannelError::Transport(reason) => write!(f, "transport failed: {}", reason),
            ChannelError::Remote(reason) => write!(f, "remote error: {}", reason),
            ChannelError::Decode(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<DecodeError> for ChannelError {
    fn from(e: DecodeError) -> Self {
        ChannelError::Decode(e)
    }
}
