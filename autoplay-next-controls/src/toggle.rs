use std::fmt;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum ToggleState {
    #[default]
    Enabled,
    Disabled,
}

impl ToggleState {
    /// Flips the state. Never fails.
    pub fn toggle(&mut self) -> ToggleState {
        *self = self.flipped();
        *self
    }

    pub fn flipped(self) -> ToggleState {
        match self {
            ToggleState::Enabled => ToggleState::Disabled,
            ToggleState::Disabled => ToggleState::Enabled,
        }
    }

    pub fn is_enabled(self) -> bool {
        self == ToggleState::Enabled
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ToggleState::Enabled => "autoplay-on",
            ToggleState::Disabled => "autoplay-off",
        }
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleState::Enabled => write!(f, "enabled"),
            ToggleState::Disabled => write!(f, "disabled"),
        }
    }
}
