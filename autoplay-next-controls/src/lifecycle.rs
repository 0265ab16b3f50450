use tracing::{debug, instrument};

use crate::{
    Result,
    events::{EventSource, Handler, PlayerEvent, SubscriptionId},
};

/// Owns the control's bindings against a player's event source.
///
/// At most one `finished` binding exists at any time. The visual bindings
/// live from [`EventLifecycle::bind_visual`] until [`EventLifecycle::teardown`].
#[derive(Debug)]
pub struct EventLifecycle {
    handler: Handler,
    finished: Option<SubscriptionId>,
    visual: Vec<(PlayerEvent, SubscriptionId)>,
}

impl EventLifecycle {
    pub fn new(handler: Handler) -> Self {
        Self {
            handler,
            finished: None,
            visual: Vec::new(),
        }
    }

    pub fn is_finished_bound(&self) -> bool {
        self.finished.is_some()
    }

    pub fn visual_bindings(&self) -> usize {
        self.visual.len()
    }

    #[instrument(skip_all)]
    pub fn on_enable<S: EventSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        if self.finished.is_some() {
            debug!("finished handler already bound");
            return Ok(());
        }

        let id = source.subscribe(PlayerEvent::Finished, self.handler.clone())?;
        self.finished = Some(id);
        Ok(())
    }

    #[instrument(skip_all)]
    pub fn on_disable<S: EventSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        if let Some(id) = self.finished {
            source.unsubscribe(PlayerEvent::Finished, id)?;
            self.finished = None;
        }

        Ok(())
    }

    /// Binds the lifecycle events used for display. Calling it again is a no-op.
    #[instrument(skip_all)]
    pub fn bind_visual<S: EventSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        for event in PlayerEvent::VISUAL {
            if self.visual.iter().any(|(bound, _)| *bound == event) {
                continue;
            }

            let id = source.subscribe(event, self.handler.clone())?;
            self.visual.push((event, id));
        }

        Ok(())
    }

    /// Removes every binding. Bindings that fail to unbind are kept so a later
    /// call can retry them; the first error is returned.
    #[instrument(skip_all)]
    pub fn teardown<S: EventSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let mut first_error = self.on_disable(source).err();

        let mut remaining = Vec::new();
        for (event, id) in self.visual.drain(..) {
            if let Err(err) = source.unsubscribe(event, id) {
                remaining.push((event, id));
                first_error = first_error.or(Some(err));
            }
        }
        self.visual = remaining;

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
