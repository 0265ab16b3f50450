use crate::{Result, error::Error, toggle::ToggleState, visual::VisualState};
use tokio::sync::broadcast::{self, Receiver, Sender};

/// What the control reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Error(Error),
    Warning(Error),
    Toggled { state: ToggleState },
    Advanced { source: String },
    Visual { visual: VisualState },
}

#[derive(Debug)]
pub struct NotificationBroadcast {
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl NotificationBroadcast {
    pub fn new() -> Self {
        let (tx, rx) = broadcast::channel(20);
        Self { tx, rx }
    }

    pub fn send(&self, notification: Notification) -> Result<()> {
        self.tx.send(notification)?;
        Ok(())
    }

    pub fn subscribe(&self) -> Receiver<Notification> {
        self.rx.resubscribe()
    }
}

impl Default for NotificationBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
