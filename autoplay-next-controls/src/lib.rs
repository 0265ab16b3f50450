//! An auto-advance toggle for a media player's control bar.
//!
//! While the toggle is on, the end of the current item rotates the player's
//! queue by one and plays the new head. The player itself is external and is
//! reached through [`player::MediaPlayer`] and [`events::EventSource`].

use error::Error;

pub mod control;
pub mod controls;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod memory;
pub mod models;
pub mod notification;
pub mod options;
pub mod player;
pub mod rotation;
pub mod toggle;
pub mod visual;

pub use control::{Advance, COMPONENT_NAME, Control, Ignored};

pub type Result<T, E = Error> = std::result::Result<T, E>;
