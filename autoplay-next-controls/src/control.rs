use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use snafu::prelude::*;
use tokio::{
    select,
    sync::{
        broadcast,
        mpsc::{UnboundedReceiver, unbounded_channel},
    },
};
use tracing::{debug, instrument, warn};

use crate::{
    Result,
    controls::ControlCommand,
    error::EmptyQueueSnafu,
    events::PlayerEvent,
    lifecycle::EventLifecycle,
    notification::{Notification, NotificationBroadcast},
    options::ControlOptions,
    player::MediaPlayer,
    rotation::rotate_left_by_one,
    toggle::ToggleState,
    visual::VisualState,
};

/// Name the control registers under in a control bar.
pub const COMPONENT_NAME: &str = "autoPlayNext";

/// Outcome of a finished event.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance<S> {
    /// The queue was rotated and `S` is now loaded and playing.
    Advanced(S),
    Ignored(Ignored),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    Disabled,
    InFlight,
}

/// Held for the duration of one rotate-and-advance sequence.
#[derive(Debug)]
struct AdvanceGuard(Arc<AtomicBool>);

impl AdvanceGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for AdvanceGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
struct Inner {
    toggle: ToggleState,
    lifecycle: EventLifecycle,
    visual: VisualState,
}

/// The auto-advance toggle of a control bar.
///
/// While enabled, the end of the current item rotates the player's queue by
/// one and plays the new head. Toggle state, the `finished` binding and the
/// visual classes change together under one lock and are never observed out
/// of step.
pub struct Control<P: MediaPlayer> {
    player: Arc<P>,
    options: ControlOptions,
    inner: Mutex<Inner>,
    advancing: Arc<AtomicBool>,
    events: Mutex<Option<UnboundedReceiver<PlayerEvent>>>,
    notifications: NotificationBroadcast,
}

impl<P: MediaPlayer> Control<P> {
    /// Attaches a new control to `player`, enabled, with its visual and
    /// `finished` bindings in place.
    #[instrument(skip(player))]
    pub fn new(player: Arc<P>, options: ControlOptions) -> Result<Self> {
        let (tx, rx) = unbounded_channel();
        let mut lifecycle = EventLifecycle::new(tx);
        let toggle = ToggleState::default();

        let bound = lifecycle
            .bind_visual(&*player)
            .and_then(|()| lifecycle.on_enable(&*player));

        if let Err(err) = bound {
            if let Err(teardown) = lifecycle.teardown(&*player) {
                warn!(%teardown, "unable to release partial bindings");
            }
            return Err(err);
        }

        Ok(Self {
            player,
            options,
            inner: Mutex::new(Inner {
                toggle,
                lifecycle,
                visual: VisualState::new(toggle, options.replay),
            }),
            advancing: Default::default(),
            events: Mutex::new(Some(rx)),
            notifications: NotificationBroadcast::new(),
        })
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn player(&self) -> &Arc<P> {
        &self.player
    }

    pub fn options(&self) -> ControlOptions {
        self.options
    }

    pub fn state(&self) -> ToggleState {
        self.inner().toggle
    }

    pub fn visual(&self) -> VisualState {
        self.inner().visual
    }

    pub fn is_advancing(&self) -> bool {
        self.advancing.load(Ordering::Acquire)
    }

    pub fn notify_receiver(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.notifications.send(notification) {
            warn!(%err, "dropping notification");
        }
    }

    /// Flips the toggle.
    ///
    /// The binding is changed first; if the event source refuses, nothing
    /// else changes and the binding error is returned.
    #[instrument(skip(self))]
    pub fn on_click(&self) -> Result<ToggleState> {
        let result = {
            let mut inner = self.inner();
            let inner = &mut *inner;

            let bound = if inner.toggle.flipped().is_enabled() {
                inner.lifecycle.on_enable(&*self.player)
            } else {
                inner.lifecycle.on_disable(&*self.player)
            };

            bound.map(|()| {
                let state = inner.toggle.toggle();
                inner.visual.toggle = state;
                state
            })
        };

        match &result {
            Ok(state) => {
                debug!(%state, class = state.css_class(), "toggled");
                self.notify(Notification::Toggled { state: *state });
            }
            Err(err) => {
                warn!(%err, "toggle refused by event source");
                self.notify(Notification::Error(err.clone()));
            }
        }

        result
    }

    fn begin_advance(&self) -> std::result::Result<AdvanceGuard, Ignored> {
        if !self.state().is_enabled() {
            return Err(Ignored::Disabled);
        }

        AdvanceGuard::acquire(&self.advancing).ok_or(Ignored::InFlight)
    }

    /// Rotates the queue and plays its new head.
    ///
    /// Does nothing while disabled or while a previous sequence is still
    /// waiting on the player. An empty queue leaves playback stopped.
    #[instrument(skip(self))]
    pub async fn on_item_finished(&self) -> Result<Advance<P::Source>> {
        match self.begin_advance() {
            Ok(guard) => self.complete_advance(guard).await,
            Err(reason) => {
                debug!(?reason, "ignoring finished event");
                Ok(Advance::Ignored(reason))
            }
        }
    }

    async fn complete_advance(&self, guard: AdvanceGuard) -> Result<Advance<P::Source>> {
        let result = self.advance(guard).await;

        match &result {
            Ok(Advance::Advanced(source)) => self.notify(Notification::Advanced {
                source: source.to_string(),
            }),
            Ok(Advance::Ignored(_)) => {}
            Err(err) if err.is_fault() => {
                warn!(%err, "advance failed");
                self.notify(Notification::Error(err.clone()));
            }
            Err(err) => {
                debug!(%err, "advance skipped");
                self.notify(Notification::Warning(err.clone()));
            }
        }

        result
    }

    #[instrument(skip_all)]
    async fn advance(&self, _guard: AdvanceGuard) -> Result<Advance<P::Source>> {
        let rotated = rotate_left_by_one(&self.player.queue());
        let head = rotated.first().cloned().context(EmptyQueueSnafu)?;
        self.player.set_queue(rotated);

        debug!(%head, "advancing");

        self.player.pause().await?;
        self.player.set_source(&head).await?;
        self.player.load().await?;
        self.player.play().await?;

        Ok(Advance::Advanced(head))
    }

    fn apply_visual(&self, event: PlayerEvent) {
        let changed = {
            let mut inner = self.inner();
            inner.visual.apply(event).then_some(inner.visual)
        };

        if let Some(visual) = changed {
            self.notify(Notification::Visual { visual });
        }
    }

    pub fn on_playing(&self) {
        self.apply_visual(PlayerEvent::Playing);
    }

    pub fn on_paused(&self) {
        self.apply_visual(PlayerEvent::Paused);
    }

    pub fn on_ended(&self) {
        self.apply_visual(PlayerEvent::Ended);
    }

    /// Seeking has no effect on the control yet.
    #[instrument(skip(self))]
    pub fn on_seeked(&self) {
        debug!("seeked");
    }

    /// Releases every binding held against the player.
    #[instrument(skip(self))]
    pub fn dispose(&self) -> Result<()> {
        let mut inner = self.inner();
        inner.lifecycle.teardown(&*self.player)
    }
}

impl<P: MediaPlayer + 'static> Control<P> {
    /// Runs the control until [`ControlCommand::Quit`] arrives or every
    /// [`Controls`](crate::controls::Controls) handle is dropped, then
    /// disposes of it.
    ///
    /// Advance sequences are spawned so clicks keep being handled while the
    /// player works through its transport commands.
    pub async fn run(
        self: Arc<Self>,
        mut commands: UnboundedReceiver<ControlCommand>,
    ) -> Result<()> {
        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut events) = events else {
            warn!("control is already running");
            return Ok(());
        };

        loop {
            select! {
                command = commands.recv() => match command {
                    Some(ControlCommand::Click) => {
                        // Already reported to the owner.
                        _ = self.on_click();
                    }
                    Some(ControlCommand::Quit) | None => break,
                },

                // The control holds a handler itself, so this never sees `None`.
                Some(event) = events.recv() => {
                    self.handle_event(event);
                }
            }
        }

        self.dispose()
    }

    fn handle_event(self: &Arc<Self>, event: PlayerEvent) {
        match event {
            PlayerEvent::Finished => match self.begin_advance() {
                Ok(guard) => {
                    let control = self.clone();
                    tokio::spawn(async move {
                        _ = control.complete_advance(guard).await;
                    });
                }
                Err(reason) => debug!(?reason, "ignoring finished event"),
            },
            PlayerEvent::Playing => self.on_playing(),
            PlayerEvent::Paused => self.on_paused(),
            PlayerEvent::Ended => self.on_ended(),
            PlayerEvent::Seeked => self.on_seeked(),
        }
    }
}

impl<P: MediaPlayer> Drop for Control<P> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = inner.lifecycle.teardown(&*self.player) {
            warn!(%err, "unable to release bindings on drop");
        }
    }
}

impl<P: MediaPlayer> std::fmt::Debug for Control<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("options", &self.options)
            .field("inner", &self.inner)
            .field("advancing", &self.advancing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controls::Controls,
        error::Error,
        events::{EventBus, EventSource, Handler, SubscriptionId},
        memory::MemoryPlayer,
        models::MediaSource,
        player::{TransportCall, TransportCommand},
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn sources(names: &[&str]) -> Vec<MediaSource> {
        names.iter().copied().map(MediaSource::from).collect()
    }

    fn control(names: &[&str]) -> Control<MemoryPlayer> {
        let player = Arc::new(MemoryPlayer::new(sources(names)));
        Control::new(player, ControlOptions::default()).unwrap()
    }

    fn finished_bindings(control: &Control<MemoryPlayer>) -> usize {
        control
            .player()
            .events()
            .subscriber_count(PlayerEvent::Finished)
    }

    /// Player whose `load` can be held open and whose commands can fail.
    #[derive(Default)]
    struct ScriptedPlayer {
        queue: Mutex<Vec<&'static str>>,
        calls: Mutex<Vec<TransportCall<&'static str>>>,
        events: EventBus,
        fail_on: Option<TransportCommand>,
        load_gate: Option<Arc<Notify>>,
    }

    impl ScriptedPlayer {
        fn new(queue: &[&'static str]) -> Self {
            Self {
                queue: Mutex::new(queue.to_vec()),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<TransportCall<&'static str>> {
            self.calls.lock().unwrap().clone()
        }

        fn call(&self, call: TransportCall<&'static str>) -> Result<()> {
            let command = call.command();
            self.calls.lock().unwrap().push(call);

            if self.fail_on == Some(command) {
                return Err(Error::Transport {
                    command,
                    message: "rejected".to_string(),
                });
            }
            Ok(())
        }
    }

    impl EventSource for ScriptedPlayer {
        fn subscribe(&self, event: PlayerEvent, handler: Handler) -> Result<SubscriptionId> {
            self.events.subscribe(event, handler)
        }

        fn unsubscribe(&self, event: PlayerEvent, id: SubscriptionId) -> Result<()> {
            self.events.unsubscribe(event, id)
        }
    }

    #[async_trait]
    impl MediaPlayer for ScriptedPlayer {
        type Source = &'static str;

        fn queue(&self) -> Vec<&'static str> {
            self.queue.lock().unwrap().clone()
        }

        fn set_queue(&self, queue: Vec<&'static str>) {
            *self.queue.lock().unwrap() = queue;
        }

        async fn pause(&self) -> Result<()> {
            self.call(TransportCall::Pause)
        }

        async fn set_source(&self, source: &&'static str) -> Result<()> {
            self.call(TransportCall::SetSource(*source))
        }

        async fn load(&self) -> Result<()> {
            self.call(TransportCall::Load)?;
            if let Some(gate) = &self.load_gate {
                gate.notified().await;
            }
            Ok(())
        }

        async fn play(&self) -> Result<()> {
            self.call(TransportCall::Play)
        }
    }

    async fn wait_until_advancing<P: MediaPlayer>(control: &Control<P>) {
        while !control.is_advancing() {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_new_control_is_enabled_and_bound() {
        let control = control(&["a"]);

        assert_eq!(control.state(), ToggleState::Enabled);
        assert_eq!(control.visual().classes(), vec!["autoplay-on"]);
        assert_eq!(finished_bindings(&control), 1);
        assert_eq!(control.player().events().total_subscribers(), 5);
    }

    #[test]
    fn test_options_are_kept() {
        let player = Arc::new(MemoryPlayer::new(sources(&["a"])));
        let control = Control::new(player, ControlOptions { replay: false }).unwrap();

        assert!(!control.options().replay);
        control.on_ended();
        assert!(!control.visual().has_class("vjs-ended"));
    }

    #[test]
    fn test_clicks_keep_binding_in_step_with_state() {
        let control = control(&["a", "b"]);

        for clicks in 1..=7 {
            let state = control.on_click().unwrap();
            let expected = if clicks % 2 == 1 { 0 } else { 1 };

            assert_eq!(state, control.state());
            assert_eq!(finished_bindings(&control), expected);
            assert!(control.visual().has_class(state.css_class()));
        }
    }

    #[test]
    fn test_double_click_restores_bindings() {
        let control = control(&["a"]);
        let before = control.player().events().total_subscribers();

        control.on_click().unwrap();
        control.on_click().unwrap();

        assert_eq!(control.state(), ToggleState::Enabled);
        assert_eq!(control.player().events().total_subscribers(), before);
        assert_eq!(finished_bindings(&control), 1);
    }

    #[test]
    fn test_controls_do_not_share_state() {
        let player = Arc::new(MemoryPlayer::new(sources(&["a", "b"])));
        let first = Control::new(player.clone(), ControlOptions::default()).unwrap();
        let second = Control::new(player.clone(), ControlOptions::default()).unwrap();

        first.on_click().unwrap();

        assert_eq!(first.state(), ToggleState::Disabled);
        assert_eq!(second.state(), ToggleState::Enabled);
        assert_eq!(player.events().subscriber_count(PlayerEvent::Finished), 1);
    }

    #[test]
    fn test_refused_binding_leaves_state_unchanged() {
        let control = control(&["a"]);
        let mut notifications = control.notify_receiver();
        control.on_click().unwrap();
        _ = notifications.try_recv();

        control.player().events().set_available(false);
        let result = control.on_click();

        assert!(matches!(
            result,
            Err(Error::Binding {
                event: PlayerEvent::Finished,
                ..
            })
        ));
        assert_eq!(control.state(), ToggleState::Disabled);
        assert!(control.visual().has_class("autoplay-off"));
        assert_eq!(finished_bindings(&control), 0);
        assert!(matches!(
            notifications.try_recv(),
            Ok(Notification::Error(Error::Binding {
                event: PlayerEvent::Finished,
                ..
            }))
        ));
    }

    #[test]
    fn test_new_fails_when_events_unavailable() {
        let player = Arc::new(MemoryPlayer::new(sources(&["a"])));
        player.events().set_available(false);

        let result = Control::new(player, ControlOptions::default());
        assert!(matches!(result, Err(Error::Binding { .. })));
    }

    #[tokio::test]
    async fn test_finished_rotates_and_plays_next() {
        let control = control(&["a", "b", "c"]);

        let advance = control.on_item_finished().await.unwrap();

        assert_eq!(advance, Advance::Advanced(MediaSource::new("b")));
        assert_eq!(control.player().queue(), sources(&["b", "c", "a"]));
        assert_eq!(
            control.player().transport_log(),
            vec![
                TransportCall::Pause,
                TransportCall::SetSource(MediaSource::new("b")),
                TransportCall::Load,
                TransportCall::Play,
            ]
        );
        assert!(!control.is_advancing());
    }

    #[tokio::test]
    async fn test_single_item_replays() {
        let control = control(&["a"]);

        let advance = control.on_item_finished().await.unwrap();

        assert_eq!(advance, Advance::Advanced(MediaSource::new("a")));
        assert_eq!(control.player().queue(), sources(&["a"]));
        assert_eq!(
            control.player().transport_log(),
            vec![
                TransportCall::Pause,
                TransportCall::SetSource(MediaSource::new("a")),
                TransportCall::Load,
                TransportCall::Play,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_queue_issues_no_commands() {
        let control = control(&[]);
        let mut notifications = control.notify_receiver();

        let result = control.on_item_finished().await;

        assert_eq!(result, Err(Error::EmptyQueue));
        assert!(control.player().transport_log().is_empty());
        assert_eq!(
            notifications.try_recv(),
            Ok(Notification::Warning(Error::EmptyQueue))
        );
        assert!(!control.is_advancing());
    }

    #[tokio::test]
    async fn test_disabled_control_ignores_finished() {
        let control = control(&["a", "b"]);
        control.on_click().unwrap();

        let advance = control.on_item_finished().await.unwrap();

        assert_eq!(advance, Advance::Ignored(Ignored::Disabled));
        assert_eq!(control.player().queue(), sources(&["a", "b"]));
        assert!(control.player().transport_log().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_stops_sequence() {
        let player = Arc::new(ScriptedPlayer {
            fail_on: Some(TransportCommand::Load),
            ..ScriptedPlayer::new(&["a", "b"])
        });
        let control = Control::new(player.clone(), ControlOptions::default()).unwrap();
        let mut notifications = control.notify_receiver();

        let result = control.on_item_finished().await;

        assert!(matches!(
            result,
            Err(Error::Transport {
                command: TransportCommand::Load,
                ..
            })
        ));
        assert_eq!(
            notifications.try_recv(),
            Ok(Notification::Error(result.unwrap_err()))
        );
        assert_eq!(
            player.calls(),
            vec![
                TransportCall::Pause,
                TransportCall::SetSource("b"),
                TransportCall::Load
            ]
        );
        assert!(!control.is_advancing());
    }

    #[tokio::test]
    async fn test_duplicate_finished_while_in_flight_is_ignored() {
        let gate = Arc::new(Notify::new());
        let player = Arc::new(ScriptedPlayer {
            load_gate: Some(gate.clone()),
            ..ScriptedPlayer::new(&["a", "b", "c"])
        });
        let control = Control::new(player.clone(), ControlOptions::default()).unwrap();

        let (first, second) = tokio::join!(control.on_item_finished(), async {
            wait_until_advancing(&control).await;
            let second = control.on_item_finished().await;
            gate.notify_one();
            second
        });

        assert_eq!(first.unwrap(), Advance::Advanced("b"));
        assert_eq!(second.unwrap(), Advance::Ignored(Ignored::InFlight));
        assert_eq!(player.queue(), vec!["b", "c", "a"]);
        assert_eq!(
            player
                .calls()
                .iter()
                .filter(|c| **c == TransportCall::Play)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_click_mid_flight_stops_next_advance_only() {
        let gate = Arc::new(Notify::new());
        let player = Arc::new(ScriptedPlayer {
            load_gate: Some(gate.clone()),
            ..ScriptedPlayer::new(&["a", "b"])
        });
        let control = Control::new(player.clone(), ControlOptions::default()).unwrap();

        let (first, clicked) = tokio::join!(control.on_item_finished(), async {
            wait_until_advancing(&control).await;
            let clicked = control.on_click();
            gate.notify_one();
            clicked
        });

        assert_eq!(clicked.unwrap(), ToggleState::Disabled);
        assert_eq!(first.unwrap(), Advance::Advanced("b"));
        assert_eq!(player.calls().last(), Some(&TransportCall::Play));

        let next = control.on_item_finished().await.unwrap();
        assert_eq!(next, Advance::Ignored(Ignored::Disabled));
        assert_eq!(player.queue(), vec!["b", "a"]);
    }

    #[test]
    fn test_seeked_leaves_visual_state_alone() {
        let control = control(&["a"]);
        control.on_ended();
        let before = control.visual();

        control.on_seeked();

        assert_eq!(control.visual(), before);
        assert_eq!(before.control_text, "Replay");
    }

    #[test]
    fn test_dispose_releases_every_binding() {
        let control = control(&["a"]);
        let player = control.player().clone();

        control.dispose().unwrap();
        assert_eq!(player.events().total_subscribers(), 0);

        drop(control);
        assert_eq!(player.events().total_subscribers(), 0);
    }

    #[test]
    fn test_drop_releases_bindings() {
        let player = Arc::new(MemoryPlayer::new(sources(&["a"])));
        let control = Control::new(player.clone(), ControlOptions::default()).unwrap();
        control.on_click().unwrap();

        drop(control);

        assert_eq!(player.events().total_subscribers(), 0);
    }

    async fn wait_for_advance(
        notifications: &mut broadcast::Receiver<Notification>,
    ) -> Option<String> {
        let wait = async {
            loop {
                match notifications.recv().await {
                    Ok(Notification::Advanced { source }) => return Some(source),
                    Ok(_) => continue,
                    Err(_) => return None,
                }
            }
        };

        tokio::time::timeout(Duration::from_secs(2), wait)
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn test_run_loop_advances_and_disposes() {
        let player = Arc::new(MemoryPlayer::new(sources(&["a", "b", "c"])));
        let control = Arc::new(Control::new(player.clone(), ControlOptions::default()).unwrap());
        let mut notifications = control.notify_receiver();

        let (tx, rx) = unbounded_channel();
        let controls = Controls::new(tx);
        let handle = tokio::spawn(control.clone().run(rx));

        player.finish();
        assert_eq!(wait_for_advance(&mut notifications).await.as_deref(), Some("b"));
        assert_eq!(player.queue(), sources(&["b", "c", "a"]));

        controls.quit();
        handle.await.unwrap().unwrap();

        assert_eq!(player.events().total_subscribers(), 0);
    }

    #[tokio::test]
    async fn test_run_loop_coalesces_duplicate_finished() {
        let player = Arc::new(
            MemoryPlayer::new(sources(&["a", "b", "c"])).with_load_delay(Duration::from_millis(50)),
        );
        let control = Arc::new(Control::new(player.clone(), ControlOptions::default()).unwrap());
        let mut notifications = control.notify_receiver();

        let (tx, rx) = unbounded_channel();
        let controls = Controls::new(tx);
        let handle = tokio::spawn(control.clone().run(rx));

        player.events().emit(PlayerEvent::Finished);
        player.events().emit(PlayerEvent::Finished);

        assert_eq!(wait_for_advance(&mut notifications).await.as_deref(), Some("b"));
        assert_eq!(player.queue(), sources(&["b", "c", "a"]));
        assert_eq!(
            player
                .transport_log()
                .iter()
                .filter(|c| **c == TransportCall::Play)
                .count(),
            1
        );

        controls.quit();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_run_loop_handles_clicks_and_visual_events() {
        let player = Arc::new(MemoryPlayer::new(sources(&["a", "b"])));
        let control = Arc::new(Control::new(player.clone(), ControlOptions::default()).unwrap());
        let mut notifications = control.notify_receiver();

        let (tx, rx) = unbounded_channel();
        let controls = Controls::new(tx);
        let handle = tokio::spawn(control.clone().run(rx));

        controls.click();
        let toggled = tokio::time::timeout(Duration::from_secs(2), notifications.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            toggled,
            Notification::Toggled {
                state: ToggleState::Disabled
            }
        );

        player.play().await.unwrap();
        let visual = tokio::time::timeout(Duration::from_secs(2), notifications.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            visual,
            Notification::Visual { visual } if visual.control_text == "Pause"
        ));

        player.finish();
        controls.quit();
        handle.await.unwrap().unwrap();

        assert_eq!(player.queue(), sources(&["a", "b"]));
        assert_eq!(player.transport_log(), vec![TransportCall::Play]);
    }

    #[tokio::test]
    async fn test_run_loop_stops_when_controls_are_dropped() {
        let player = Arc::new(MemoryPlayer::new(sources(&["a", "b"])));
        let control = Arc::new(Control::new(player.clone(), ControlOptions::default()).unwrap());

        let (tx, rx) = unbounded_channel();
        let controls = Controls::new(tx);
        let handle = tokio::spawn(control.clone().run(rx));

        controls.click();
        drop(controls);

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("run loop kept going without any controls")
            .unwrap();

        assert_eq!(result, Ok(()));
        assert_eq!(control.state(), ToggleState::Disabled);
        assert_eq!(player.events().total_subscribers(), 0);
    }
}
