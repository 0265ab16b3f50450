use std::fmt;

use async_trait::async_trait;

use crate::{Result, events::EventSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    Pause,
    SetSource,
    Load,
    Play,
}

impl fmt::Display for TransportCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportCommand::Pause => "pause",
            TransportCommand::SetSource => "set_source",
            TransportCommand::Load => "load",
            TransportCommand::Play => "play",
        };
        f.write_str(name)
    }
}

/// A transport command as received by a player, with its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall<S> {
    Pause,
    SetSource(S),
    Load,
    Play,
}

impl<S> TransportCall<S> {
    pub fn command(&self) -> TransportCommand {
        match self {
            TransportCall::Pause => TransportCommand::Pause,
            TransportCall::SetSource(_) => TransportCommand::SetSource,
            TransportCall::Load => TransportCommand::Load,
            TransportCall::Play => TransportCommand::Play,
        }
    }
}

/// The player a control is attached to.
///
/// The queue belongs to the player; the control only reads it, rotates it and
/// writes it back. Transport commands may complete asynchronously and report
/// failures as [`crate::error::Error::Transport`].
#[async_trait]
pub trait MediaPlayer: EventSource + Send + Sync {
    type Source: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn queue(&self) -> Vec<Self::Source>;
    fn set_queue(&self, queue: Vec<Self::Source>);

    async fn pause(&self) -> Result<()>;
    async fn set_source(&self, source: &Self::Source) -> Result<()>;
    async fn load(&self) -> Result<()>;
    async fn play(&self) -> Result<()>;
}
