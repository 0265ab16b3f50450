use std::{
    collections::BTreeMap,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use snafu::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

use crate::{Result, error::BindingSnafu};

/// Lifecycle events a player emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlayerEvent {
    Finished,
    Playing,
    Paused,
    Ended,
    Seeked,
}

impl PlayerEvent {
    /// Events the control listens to for its whole lifetime.
    pub const VISUAL: [PlayerEvent; 4] = [
        PlayerEvent::Playing,
        PlayerEvent::Paused,
        PlayerEvent::Ended,
        PlayerEvent::Seeked,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlayerEvent::Finished => "finished",
            PlayerEvent::Playing => "playing",
            PlayerEvent::Paused => "paused",
            PlayerEvent::Ended => "ended",
            PlayerEvent::Seeked => "seeked",
        }
    }
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receiving end of a subscription.
pub type Handler = UnboundedSender<PlayerEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Event subscription API of a player.
pub trait EventSource {
    fn subscribe(&self, event: PlayerEvent, handler: Handler) -> Result<SubscriptionId>;
    fn unsubscribe(&self, event: PlayerEvent, id: SubscriptionId) -> Result<()>;
}

#[derive(Debug)]
struct Subscription {
    event: PlayerEvent,
    handler: Handler,
}

#[derive(Debug)]
struct Registry {
    next_id: u64,
    available: bool,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

/// In-process event dispatcher.
///
/// Every subscription is delivered independently, so registering the same
/// handler twice makes it fire twice per event. Callers that need a single
/// binding have to track it themselves.
#[derive(Debug)]
pub struct EventBus {
    registry: Mutex<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_id: 0,
                available: true,
                subscriptions: BTreeMap::new(),
            }),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the bus as (un)available. While unavailable every
    /// subscribe and unsubscribe fails with a binding error.
    pub fn set_available(&self, available: bool) {
        self.registry().available = available;
    }

    /// Delivers `event` to every matching subscription and returns how many
    /// handlers received it. Handlers whose receiver is gone are dropped.
    #[instrument(skip(self))]
    pub fn emit(&self, event: PlayerEvent) -> usize {
        let mut registry = self.registry();
        let mut delivered = 0;

        registry.subscriptions.retain(|id, subscription| {
            if subscription.event != event {
                return true;
            }

            match subscription.handler.send(event) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    debug!(?id, "dropping closed handler");
                    false
                }
            }
        });

        delivered
    }

    pub fn subscriber_count(&self, event: PlayerEvent) -> usize {
        self.registry()
            .subscriptions
            .values()
            .filter(|s| s.event == event)
            .count()
    }

    pub fn total_subscribers(&self) -> usize {
        self.registry().subscriptions.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, event: PlayerEvent, handler: Handler) -> Result<SubscriptionId> {
        let mut registry = self.registry();
        ensure!(
            registry.available,
            BindingSnafu {
                event,
                message: "event source unavailable",
            }
        );

        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry
            .subscriptions
            .insert(id, Subscription { event, handler });

        Ok(id)
    }

    fn unsubscribe(&self, event: PlayerEvent, id: SubscriptionId) -> Result<()> {
        let mut registry = self.registry();
        ensure!(
            registry.available,
            BindingSnafu {
                event,
                message: "event source unavailable",
            }
        );

        registry.subscriptions.remove(&id);
        Ok(())
    }
}
