use crate::{events::PlayerEvent, notification::Notification, player::TransportCommand};
use snafu::prelude::*;

#[derive(Snafu, Debug, Clone, PartialEq)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unable to bind {event} handler: {message}"))]
    Binding { event: PlayerEvent, message: String },
    #[snafu(display("Queue is empty, nothing to advance to"))]
    EmptyQueue,
    #[snafu(display("Transport command {command} failed: {message}"))]
    Transport {
        command: TransportCommand,
        message: String,
    },
    #[snafu(display("Unable to broadcast notification"))]
    Notification,
}

impl Error {
    /// Errors the control handles locally instead of reporting as a fault.
    pub fn is_fault(&self) -> bool {
        !matches!(self, Error::EmptyQueue)
    }
}

impl From<tokio::sync::broadcast::error::SendError<Notification>> for Error {
    fn from(_value: tokio::sync::broadcast::error::SendError<Notification>) -> Self {
        Self::Notification
    }
}
