use crate::{events::PlayerEvent, toggle::ToggleState};

pub const DEFAULT_CONTROL_TEXT: &str = "autoPlayNext";

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
}

impl Playback {
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Playback::Idle => None,
            Playback::Playing => Some("vjs-playing"),
            Playback::Paused => Some("vjs-paused"),
            Playback::Ended => Some("vjs-ended"),
        }
    }
}

/// What the control looks like. Derived from the toggle state and the most
/// recent lifecycle event; nothing here feeds back into behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualState {
    pub toggle: ToggleState,
    pub playback: Playback,
    pub control_text: &'static str,
    replay: bool,
}

impl VisualState {
    pub fn new(toggle: ToggleState, replay: bool) -> Self {
        Self {
            toggle,
            playback: Playback::Idle,
            control_text: DEFAULT_CONTROL_TEXT,
            replay,
        }
    }

    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec![self.toggle.css_class()];
        classes.extend(self.playback.css_class());
        classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| *c == class)
    }

    /// Applies a lifecycle event. Returns whether anything changed.
    pub fn apply(&mut self, event: PlayerEvent) -> bool {
        let before = *self;

        match event {
            PlayerEvent::Playing => {
                self.playback = Playback::Playing;
                self.control_text = "Pause";
            }
            PlayerEvent::Paused => {
                self.playback = Playback::Paused;
                self.control_text = "Play";
            }
            PlayerEvent::Ended if self.replay => {
                self.playback = Playback::Ended;
                self.control_text = "Replay";
            }
            PlayerEvent::Ended => {
                self.playback = Playback::Paused;
                self.control_text = "Play";
            }
            PlayerEvent::Seeked | PlayerEvent::Finished => {}
        }

        before != *self
    }
}
