use anyhow::{Context, Result};
use prism::channel::ObsChannel;
use prism::config::PrismConfig;
use prism::mirror::Mirror;
use prism::properties::SceneItemUpdate;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prism=info".into()),
        )
        .init();

    let config = PrismConfig::from_env();
    let item_name =
        std::env::var("PRISM_ITEM").context("PRISM_ITEM is required (scene item to mirror)")?;
    let scene = std::env::var("PRISM_SCENE").ok();

    info!(
        url = %config.channel.url,
        item = %item_name,
        refresh_interval_ms = config.mirror.refresh_interval_ms,
        "Prism starting..."
    );

    let channel = Arc::new(
        ObsChannel::connect(&config.channel.url)
            .await
            .context("Could not connect to the remote control channel")?,
    );

    let mirror = Mirror::with_config(channel.clone(), config.mirror.clone());
    let item = match scene.as_deref() {
        Some(scene) => mirror.scene_item_in(&item_name, scene).await?,
        None => mirror.scene_item(&item_name).await?,
    };
    let item = Arc::new(item);
    info!(item = %item.name(), rotation = item.rotation(), "Scene item mirrored");

    // Demo driver: nudge the rotation one degree per tick and watch the
    // replica converge through the refresh loop
    let driver = {
        let item = Arc::clone(&item);
        let period = Duration::from_millis(config.mirror.refresh_interval_ms);
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            loop {
                timer.tick().await;
                let rotation = item.rotation();
                item.update(SceneItemUpdate {
                    rotation: Some(rotation + 1.0),
                    ..Default::default()
                })
                .await;
                info!(rotation = rotation, "Mirrored rotation");
            }
        })
    };

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    driver.abort();
    item.stop();
    channel.close();
    info!("Prism stopped");

    Ok(())
}
