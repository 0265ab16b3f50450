use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{
    Result,
    events::{EventBus, EventSource, Handler, PlayerEvent, SubscriptionId},
    models::MediaSource,
    player::{MediaPlayer, TransportCall},
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Paused,
    #[default]
    Stopped,
}

#[derive(Debug, Default)]
struct State {
    queue: Vec<MediaSource>,
    source: Option<MediaSource>,
    status: Status,
    transport_log: Vec<TransportCall<MediaSource>>,
}

/// A player that keeps everything in memory. It plays nothing; transport
/// commands are recorded and the matching lifecycle events are emitted on its
/// [`EventBus`].
#[derive(Debug, Default)]
pub struct MemoryPlayer {
    state: Mutex<State>,
    events: EventBus,
    load_delay: Option<Duration>,
}

impl MemoryPlayer {
    pub fn new(queue: Vec<MediaSource>) -> Self {
        let source = queue.first().cloned();

        Self {
            state: Mutex::new(State {
                queue,
                source,
                ..Default::default()
            }),
            events: EventBus::new(),
            load_delay: None,
        }
    }

    /// Makes `load` take `delay` before it completes.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn status(&self) -> Status {
        self.state().status
    }

    pub fn source(&self) -> Option<MediaSource> {
        self.state().source.clone()
    }

    pub fn transport_log(&self) -> Vec<TransportCall<MediaSource>> {
        self.state().transport_log.clone()
    }

    /// Signals that the current item played to its end.
    #[instrument(skip(self))]
    pub fn finish(&self) {
        self.state().status = Status::Stopped;
        self.events.emit(PlayerEvent::Ended);
        self.events.emit(PlayerEvent::Finished);
    }

    /// Signals that the user seeked within the current item.
    pub fn seek(&self) {
        self.events.emit(PlayerEvent::Seeked);
    }

    fn record(&self, call: TransportCall<MediaSource>) {
        debug!(command = %call.command(), "transport");
        self.state().transport_log.push(call);
    }
}

impl EventSource for MemoryPlayer {
    fn subscribe(&self, event: PlayerEvent, handler: Handler) -> Result<SubscriptionId> {
        self.events.subscribe(event, handler)
    }

    fn unsubscribe(&self, event: PlayerEvent, id: SubscriptionId) -> Result<()> {
        self.events.unsubscribe(event, id)
    }
}

#[async_trait]
impl MediaPlayer for MemoryPlayer {
    type Source = MediaSource;

    fn queue(&self) -> Vec<MediaSource> {
        self.state().queue.clone()
    }

    fn set_queue(&self, queue: Vec<MediaSource>) {
        self.state().queue = queue;
    }

    async fn pause(&self) -> Result<()> {
        self.record(TransportCall::Pause);
        self.state().status = Status::Paused;
        self.events.emit(PlayerEvent::Paused);
        Ok(())
    }

    async fn set_source(&self, source: &MediaSource) -> Result<()> {
        self.record(TransportCall::SetSource(source.clone()));
        self.state().source = Some(source.clone());
        Ok(())
    }

    async fn load(&self) -> Result<()> {
        self.record(TransportCall::Load);
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.record(TransportCall::Play);
        self.state().status = Status::Playing;
        self.events.emit(PlayerEvent::Playing);
        Ok(())
    }
}
