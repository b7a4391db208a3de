use crate::channel::{ChannelError, RemoteChannel};
use crate::config::MirrorConfig;
use crate::mirror::MirroredSceneItem;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Session facade over a [`RemoteChannel`]: looks up remote scene items and
/// hands out live [`MirroredSceneItem`]s.
///
/// # Example
/// ```no_run
/// use prism::channel::ObsChannel;
/// use prism::mirror::Mirror;
/// use std::sync::Arc;
///
/// # async fn demo() -> anyhow::Result<()> {
/// let channel = Arc::new(ObsChannel::connect("ws://localhost:4444").await?);
/// let mirror = Mirror::new(channel);
///
/// let item = mirror.scene_item("overlay").await?;
/// println!("rotation: {}", item.rotation());
/// # Ok(())
/// # }
/// ```
pub struct Mirror {
    channel: Arc<dyn RemoteChannel>,
    config: MirrorConfig,
}

impl Mirror {
    /// Creates a mirror session with the default refresh interval.
    pub fn new(channel: Arc<dyn RemoteChannel>) -> Self {
        Self::with_config(channel, MirrorConfig::default())
    }

    /// Creates a mirror session with an explicit configuration.
    pub fn with_config(channel: Arc<dyn RemoteChannel>, config: MirrorConfig) -> Self {
        Self { channel, config }
    }

    /// Mirrors the named item from the remote's current scene.
    ///
    /// Performs one seeding fetch, then starts the item's refresh loop. A
    /// failed seeding fetch is a creation failure: nothing is spawned and
    /// the error propagates.
    pub async fn scene_item(&self, name: &str) -> Result<MirroredSceneItem, CreateError> {
        self.item(name, None).await
    }

    /// Mirrors the named item from an explicitly named scene.
    pub async fn scene_item_in(
        &self,
        name: &str,
        scene: &str,
    ) -> Result<MirroredSceneItem, CreateError> {
        self.item(name, Some(scene)).await
    }

    async fn item(
        &self,
        name: &str,
        scene: Option<&str>,
    ) -> Result<MirroredSceneItem, CreateError> {
        let seed = self
            .channel
            .fetch_properties(name, scene)
            .await
            .map_err(|source| CreateError::InitialFetch {
                item: name.to_string(),
                source,
            })?;

        info!(
            item = %seed.name,
            source_width = seed.source_width,
            source_height = seed.source_height,
            "Mirroring scene item"
        );

        Ok(MirroredSceneItem::spawn(
            Arc::clone(&self.channel),
            scene.map(String::from),
            seed,
            Duration::from_millis(self.config.refresh_interval_ms),
        ))
    }
}

/// Failure to create a mirrored item.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateError {
    /// The seeding fetch failed; no replica and no refresh loop exist.
    InitialFetch { item: String, source: ChannelError },
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::InitialFetch { item, source } => {
                write!(f, "initial fetch for scene item '{}' failed: {}", item, source)
            }
        }
    }
}

impl std::error::Error for CreateError {}
