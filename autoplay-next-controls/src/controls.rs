use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Click,
    Quit,
}

/// Cloneable handle used by the host to drive a running control.
#[derive(Debug, Clone)]
pub struct Controls {
    tx: UnboundedSender<ControlCommand>,
}

impl Controls {
    pub fn new(tx: UnboundedSender<ControlCommand>) -> Self {
        Self { tx }
    }

    pub fn click(&self) {
        self.send(ControlCommand::Click);
    }

    pub fn quit(&self) {
        self.send(ControlCommand::Quit);
    }

    fn send(&self, command: ControlCommand) {
        if self.tx.send(command).is_err() {
            debug!(?command, "control loop has stopped");
        }
    }
}
