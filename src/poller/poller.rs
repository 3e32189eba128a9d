use chrono::Utc;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::PollerError;
use super::service::PositionService;
use super::types::{RequestParameters, TaskState, TaskStatus};
use crate::notify::NotificationChannel;
use crate::position::{select_latest, PositionRecord};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
pub const POSITIONS_TOPIC: &str = "eyetrack.positions";

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    pub topic: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            topic: POSITIONS_TOPIC.to_string(),
        }
    }
}

/// Handle to one poll task. Clones refer to the same task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: Uuid,
    cancel: CancellationToken,
    finished: CancellationToken,
    shared: Arc<StdMutex<TaskStatus>>,
}

impl TaskHandle {
    fn new(params: &RequestParameters) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            cancel: CancellationToken::new(),
            finished: CancellationToken::new(),
            shared: Arc::new(StdMutex::new(TaskStatus::new(id, &params.platform_id))),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> TaskState {
        self.lock().state
    }

    pub fn status(&self) -> TaskStatus {
        self.lock().clone()
    }

    /// Request the loop to stop. Does not wait; repeated calls are no-ops.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            log::info!("Stop requested for poll task {}", self.id);
            self.cancel.cancel();
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait until the loop has exited.
    pub async fn join(&self) {
        self.finished.cancelled().await;
    }

    fn lock(&self) -> MutexGuard<'_, TaskStatus> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the repeating fetch-and-publish task for one consumer.
///
/// At most one task is live per poller; a stopped task can be replaced by starting
/// a new one.
pub struct Poller<S: PositionService> {
    service: Arc<S>,
    channel: NotificationChannel,
    config: PollerConfig,
    current: Option<TaskHandle>,
}

impl<S: PositionService + 'static> Poller<S> {
    pub fn new(service: S, channel: NotificationChannel, config: PollerConfig) -> Self {
        Self {
            service: Arc::new(service),
            channel,
            config,
            current: None,
        }
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Most recently started task, running or not.
    pub fn current(&self) -> Option<&TaskHandle> {
        self.current.as_ref()
    }

    /// Spawn a new poll task. The first cycle runs immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, params: RequestParameters) -> Result<TaskHandle, PollerError> {
        if let Some(current) = &self.current {
            if !current.is_stop_requested() {
                return Err(PollerError::AlreadyRunning);
            }
        }
        params.validate()?;

        let handle = TaskHandle::new(&params);
        handle.lock().state = TaskState::Running;
        log::info!(
            "Starting poll task {} for platform {} every {:?}",
            handle.id,
            params.platform_id,
            self.config.interval
        );

        tokio::spawn(run_poll_loop(
            self.service.clone(),
            self.channel.clone(),
            self.config.clone(),
            params,
            handle.clone(),
        ));

        self.current = Some(handle.clone());
        Ok(handle)
    }

    /// Stop the current task, if any.
    pub fn stop(&self) {
        if let Some(current) = &self.current {
            current.stop();
        }
    }
}

/// One request/parse step: the last entry of the response as a record.
pub async fn poll_once<S>(
    service: &S,
    params: &RequestParameters,
) -> Result<PositionRecord, PollerError>
where
    S: PositionService + ?Sized,
{
    let entries = service.get_positions(params).await?;
    log::debug!("Service returned {} position entries", entries.len());
    select_latest(&entries)
}

async fn run_poll_loop<S: PositionService>(
    service: Arc<S>,
    channel: NotificationChannel,
    config: PollerConfig,
    params: RequestParameters,
    handle: TaskHandle,
) {
    // Fires on every exit path, panics included.
    let _finished = handle.finished.clone().drop_guard();

    loop {
        if handle.cancel.is_cancelled() {
            break;
        }

        let outcome = poll_once(service.as_ref(), &params).await;

        if handle.cancel.is_cancelled() {
            log::debug!("Poll task {} stopping, discarding in-flight result", handle.id);
            break;
        }

        match outcome {
            Ok(record) => {
                log::debug!(
                    "{} ({}) at lat {} lon {} alt {} km",
                    record.short_name,
                    record.id,
                    record.latitude,
                    record.longitude,
                    record.altitude
                );
                let receivers = channel.publish(&config.topic, record);
                log::trace!("Published position to {} subscribers", receivers);

                let mut status = handle.lock();
                status.cycles += 1;
                status.publications += 1;
                status.last_update = Some(Utc::now());
            }
            Err(e) => {
                log::warn!("Poll cycle for platform {} failed: {}", params.platform_id, e);

                let mut status = handle.lock();
                status.cycles += 1;
                status.failures += 1;
                status.last_error = Some(e.to_string());
            }
        }

        let stop = tokio::select! {
            _ = sleep(config.interval) => false,
            _ = handle.cancel.cancelled() => true,
        };
        if stop {
            break;
        }
    }

    {
        let mut status = handle.lock();
        status.state = TaskState::Stopped;
        status.stopped_at = Some(Utc::now());
    }
    log::info!("Poll task {} stopped", handle.id);
}
