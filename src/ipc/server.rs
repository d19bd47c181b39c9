//! # Page Gateway
//!
//! Unix socket server pages connect to. Each connected page gets a writer
//! task fed from the shared event broadcast and a read loop that parses
//! framed [`PageMessage`]s and dispatches them.
//!
//! Restore is handled by direct calls into the scheduler rather than
//! re-posting synthetic messages through the socket; the replay path and the
//! live path are the same code.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Click acks close the notification and answer with a focus event
//! - 1.0.0: Initial accept loop with broadcast fan-out

use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};

use crate::core::Config;
use crate::ipc::protocol::{
    encode_message, DateSchedule, PageEvent, PageMessage, StoredSchedule, WeekdaySchedule,
    MAX_FRAME_LEN,
};
use crate::notify::backend::DeliveryBackend;
use crate::schedule::descriptor::ReminderDescriptor;
use crate::schedule::scheduler::Scheduler;

/// Maximum number of simultaneously connected pages
const MAX_PAGES: usize = 32;

/// Broadcast channel capacity for events
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Gateway between connected pages and the scheduler
pub struct PageGateway {
    socket_path: String,
    scheduler: Arc<Scheduler>,
    backend: Arc<dyn DeliveryBackend>,
    events: broadcast::Sender<PageEvent>,
    page_count: AtomicUsize,
}

impl PageGateway {
    pub fn new(
        config: &Config,
        scheduler: Arc<Scheduler>,
        backend: Arc<dyn DeliveryBackend>,
        events: broadcast::Sender<PageEvent>,
    ) -> Self {
        PageGateway {
            socket_path: config.socket_path.clone(),
            scheduler,
            backend,
            events,
            page_count: AtomicUsize::new(0),
        }
    }

    /// Start listening in a background task
    pub async fn start(self: Arc<Self>) -> Result<()> {
        // Remove a stale socket left by a previous run
        if std::path::Path::new(&self.socket_path).exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("gateway listening on {}", self.socket_path);

        let gateway = self.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _addr)) => {
                        let connected = gateway.page_count.load(Ordering::SeqCst);
                        if connected >= MAX_PAGES {
                            warn!("page limit reached ({MAX_PAGES}), rejecting connection");
                            continue;
                        }
                        gateway.page_count.fetch_add(1, Ordering::SeqCst);
                        info!("page connected (total: {})", connected + 1);

                        let gateway = gateway.clone();
                        tokio::spawn(async move {
                            if let Err(e) = gateway.clone().handle_page(stream).await {
                                debug!("page handler ended: {e}");
                            }
                            gateway.page_count.fetch_sub(1, Ordering::SeqCst);
                            info!("page disconnected");
                        });
                    }
                    Err(e) => {
                        error!("failed to accept page connection: {e}");
                    }
                }
            }
        });

        Ok(())
    }

    /// Handle one connected page
    async fn handle_page(self: Arc<Self>, stream: UnixStream) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();

        // Fan shared events out to this page, interleaved with replies
        // addressed to this page alone (click-routing focus)
        let mut event_rx = self.events.subscribe();
        let (reply_tx, mut reply_rx) = mpsc::channel::<PageEvent>(8);
        let write_handle = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    event = event_rx.recv() => match event {
                        Ok(event) => event,
                        Err(broadcast::error::RecvError::Closed) => break,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("page lagged behind by {n} events");
                            continue;
                        }
                    },
                    reply = reply_rx.recv() => match reply {
                        Some(event) => event,
                        None => break,
                    },
                };
                match encode_message(&event) {
                    Ok(data) => {
                        if writer.write_all(&data).await.is_err()
                            || writer.flush().await.is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => error!("failed to encode event: {e}"),
                }
            }
        });

        // Read framed messages from the page
        loop {
            let mut len_buf = [0u8; 4];
            if reader.read_exact(&mut len_buf).await.is_err() {
                break;
            }
            let len = u32::from_be_bytes(len_buf) as usize;
            if len > MAX_FRAME_LEN {
                error!("frame too large from page: {len} bytes");
                break;
            }

            let mut buf = vec![0u8; len];
            if reader.read_exact(&mut buf).await.is_err() {
                break;
            }

            match serde_json::from_slice::<PageMessage>(&buf) {
                Ok(msg) => self.dispatch_from(msg, Some(&reply_tx)).await,
                Err(e) => warn!("failed to parse message from page: {e}"),
            }
        }

        write_handle.abort();
        Ok(())
    }

    /// Route one inbound message
    pub async fn dispatch(&self, msg: PageMessage) {
        self.dispatch_from(msg, None).await;
    }

    /// Route one inbound message, answering click acks on the sending
    /// page's own connection when one is attached
    async fn dispatch_from(&self, msg: PageMessage, reply: Option<&mpsc::Sender<PageEvent>>) {
        match msg {
            PageMessage::ScheduleDate { schedule } => self.handle_date(schedule).await,
            PageMessage::ScheduleWeekday { schedule } => self.handle_weekday(schedule).await,
            PageMessage::Restore { schedules } => {
                debug!("restoring {} schedules", schedules.len());
                for entry in schedules {
                    match entry {
                        StoredSchedule::Date(schedule) => self.handle_date(schedule).await,
                        StoredSchedule::Weekday(schedule) => self.handle_weekday(schedule).await,
                    }
                }
            }
            PageMessage::Cancel { id } => {
                let closed = self.scheduler.cancel(&id).await;
                info!("cancel {id}: closed {closed} notification(s)");
            }
            PageMessage::Clicked { tag } => {
                if let Err(e) = self.backend.cancel_by_tag(&tag).await {
                    warn!("closing clicked notification {tag} failed: {e:#}");
                }
                // focus exactly the page that acknowledged the click; a
                // caller without a connection of its own gets the broadcast
                match reply {
                    Some(page) => {
                        let _ = page.send(PageEvent::Focus).await;
                    }
                    None => {
                        let _ = self.events.send(PageEvent::Focus);
                    }
                }
            }
            PageMessage::Unknown => {}
        }
    }

    async fn handle_date(&self, schedule: DateSchedule) {
        match ReminderDescriptor::date(
            &schedule.id,
            schedule.text.clone(),
            &schedule.date,
            &schedule.time,
        ) {
            Ok(desc) => {
                self.scheduler.schedule(&desc).await;
            }
            Err(e) => self.reject(&schedule.id, e),
        }
    }

    async fn handle_weekday(&self, schedule: WeekdaySchedule) {
        match ReminderDescriptor::weekly(
            &schedule.id,
            schedule.text.clone(),
            &schedule.days,
            &schedule.time,
        ) {
            Ok(desc) => {
                self.scheduler.schedule(&desc).await;
            }
            Err(e) => self.reject(&schedule.id, e),
        }
    }

    /// Fail fast on a malformed descriptor: log it, tell the pages, schedule
    /// nothing
    fn reject(&self, id: &str, error: anyhow::Error) {
        warn!("rejecting reminder {id}: {error:#}");
        let _ = self.events.send(PageEvent::Invalid {
            id: id.to_string(),
            reason: format!("{error:#}"),
        });
    }
}
