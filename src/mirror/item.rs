use crate::channel::RemoteChannel;
use crate::properties::{SceneItemProperties, SceneItemUpdate};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

/// Refresh and update bookkeeping for one mirrored item.
#[derive(Clone, Debug)]
pub struct RefreshStatus {
    /// When the replica was last overwritten by a successful fetch
    pub last_refresh: Option<DateTime<Utc>>,
    /// Last fetch or apply error message (if any)
    pub last_error: Option<String>,
    /// Total number of successful refresh ticks
    pub refresh_count: u64,
    /// Total number of failed refresh fetches
    pub fetch_error_count: u64,
    /// Total number of failed property updates
    pub apply_error_count: u64,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            last_refresh: None,
            last_error: None,
            refresh_count: 0,
            fetch_error_count: 0,
            apply_error_count: 0,
        }
    }
}

/// State shared between the item handle and its refresh task.
struct Inner {
    channel: Arc<dyn RemoteChannel>,
    /// Scene the item was looked up in; `None` means the remote's current scene
    scene: Option<String>,
    /// Captured from the seeding fetch, never overwritten afterwards
    source_width: f64,
    source_height: f64,
    replica: RwLock<SceneItemProperties>,
    status: RwLock<RefreshStatus>,
}

/// Local mirror of one remote scene item.
///
/// The replica is seeded once at creation and from then on overwritten only
/// by the background refresh loop; it converges to remote truth within one
/// tick of any remote change. Reads are synchronous snapshots of the
/// last-known state.
///
/// [`update`](Self::update) is fire-and-forget: it pushes a sparse change to
/// the remote side and does not touch the replica. The change becomes
/// visible locally once a subsequent refresh tick fetches it back. An update
/// racing a refresh is resolved by whichever lands last; there is no
/// read-your-writes guarantee.
pub struct MirroredSceneItem {
    inner: Arc<Inner>,
    refresh_handle: JoinHandle<()>,
}

impl MirroredSceneItem {
    /// Seeds the replica and starts the refresh loop. Called by the factory.
    pub(crate) fn spawn(
        channel: Arc<dyn RemoteChannel>,
        scene: Option<String>,
        seed: SceneItemProperties,
        refresh_interval: Duration,
    ) -> Self {
        let inner = Arc::new(Inner {
            channel,
            scene,
            source_width: seed.source_width,
            source_height: seed.source_height,
            replica: RwLock::new(seed),
            status: RwLock::new(RefreshStatus::default()),
        });
        let refresh_handle = spawn_refresh_loop(Arc::clone(&inner), refresh_interval);

        Self {
            inner,
            refresh_handle,
        }
    }

    /// Snapshot of the last-known property set.
    ///
    /// Taken in one atomic clone, so it never mixes two refreshes.
    pub fn properties(&self) -> SceneItemProperties {
        self.inner.replica.read().unwrap().clone()
    }

    /// Current name of the item (the remote may rename it).
    pub fn name(&self) -> String {
        self.inner.replica.read().unwrap().name.clone()
    }

    /// Last-known clockwise rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.inner.replica.read().unwrap().rotation
    }

    /// Last-known visibility.
    pub fn visible(&self) -> bool {
        self.inner.replica.read().unwrap().visible
    }

    /// Base width of the source, captured at creation.
    pub fn source_width(&self) -> f64 {
        self.inner.source_width
    }

    /// Base height of the source, captured at creation.
    pub fn source_height(&self) -> f64 {
        self.inner.source_height
    }

    /// Refresh/update bookkeeping for this item.
    pub fn status(&self) -> RefreshStatus {
        self.inner.status.read().unwrap().clone()
    }

    /// Pushes a sparse property update to the remote item.
    ///
    /// Fire-and-forget: a failure is logged and counted in
    /// [`status`](Self::status), never retried and never returned. The local
    /// replica is not changed here; observe the effect through a later
    /// refresh tick. A supplied `rotation` is normalized with
    /// [`clamp_rotation`](crate::properties::clamp_rotation) before sending.
    pub async fn update(&self, update: SceneItemUpdate) {
        let update = update.normalized();
        let name = self.name();

        if let Err(e) = self.inner.channel.apply_properties(&name, &update).await {
            error!(item = %name, error = %e, "Failed to apply property update");
            let mut status = self.inner.status.write().unwrap();
            status.last_error = Some(e.to_string());
            status.apply_error_count += 1;
        }
    }

    /// Stops the refresh loop. Idempotent.
    ///
    /// The replica stays readable at its last state and [`update`](Self::update)
    /// keeps working; only the background synchronization ends.
    pub fn stop(&self) {
        self.refresh_handle.abort();
    }
}

impl Drop for MirroredSceneItem {
    fn drop(&mut self) {
        self.refresh_handle.abort();
    }
}

/// Runs the periodic fetch-and-overwrite cycle.
///
/// Ticks are serialized: the fetch is awaited inline and missed ticks are
/// skipped, so a fetch outliving the interval delays the next tick instead
/// of overlapping it. A failed fetch leaves the replica untouched and the
/// loop running; there is no backoff and no failure threshold.
fn spawn_refresh_loop(inner: Arc<Inner>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        {
            let replica = inner.replica.read().unwrap();
            debug!(
                item = %replica.name,
                interval_ms = period.as_millis() as u64,
                "Starting refresh loop"
            );
        }

        // First refresh lands one full interval after seeding
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;

            // Fetch by the current name: a rename observed on a previous
            // tick redirects all following ticks
            let name = inner.replica.read().unwrap().name.clone();

            match inner
                .channel
                .fetch_properties(&name, inner.scene.as_deref())
                .await
            {
                Ok(mut fetched) => {
                    // Source dimensions are fixed at creation
                    fetched.source_width = inner.source_width;
                    fetched.source_height = inner.source_height;
                    *inner.replica.write().unwrap() = fetched;

                    let mut status = inner.status.write().unwrap();
                    status.last_refresh = Some(Utc::now());
                    status.last_error = None;
                    status.refresh_count += 1;
                }
                Err(e) => {
                    warn!(item = %name, error = %e, "Refresh fetch failed, keeping last known state");
                    let mut status = inner.status.write().unwrap();
                    status.last_error = Some(e.to_string());
                    status.fetch_error_count += 1;
                }
            }
        }
    })
}
