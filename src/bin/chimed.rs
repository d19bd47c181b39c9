use anyhow::Result;
use dotenvy::dotenv;
use log::info;
use std::sync::Arc;
use tokio::sync::broadcast;

use chime::core::{BackendKind, Config};
use chime::ipc::{PageGateway, EVENT_CHANNEL_CAPACITY};
use chime::notify::{DeferredBackend, DeliveryBackend, ImmediateBackend};
use chime::schedule::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    info!(
        "starting chimed (backend: {:?}, socket: {})",
        config.backend, config.socket_path
    );

    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    let backend: Arc<dyn DeliveryBackend> = match config.backend {
        BackendKind::Deferred => Arc::new(DeferredBackend::new(events.clone())),
        BackendKind::Immediate => Arc::new(ImmediateBackend::new(events.clone())),
    };

    let scheduler = Arc::new(
        Scheduler::new(Arc::clone(&backend), events.clone())
            .with_default_label(config.default_label.clone()),
    );

    let gateway = Arc::new(PageGateway::new(&config, scheduler, backend, events));
    gateway.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
