/// How much of the player is on screen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Nothing is loaded; no player chrome.
    #[default]
    Hidden,
    /// Compact bar under the main view.
    Mini,
    /// The full now-playing view replaces the main view.
    Full,
}

impl Visibility {
    /// A track was successfully loaded.
    pub fn on_track_started(self) -> Self {
        match self {
            Self::Hidden => Self::Mini,
            other => other,
        }
    }

    pub fn show_full(self) -> Self {
        match self {
            Self::Hidden => Self::Hidden,
            Self::Mini | Self::Full => Self::Full,
        }
    }

    pub fn dismiss_full(self) -> Self {
        match self {
            Self::Full => Self::Mini,
            other => other,
        }
    }

    /// Playback stopped, failed or ran out.
    pub fn on_stopped(self) -> Self {
        Self::Hidden
    }

    pub fn shows_mini_player(self) -> bool {
        self == Self::Mini
    }

    pub fn shows_full_player(self) -> bool {
        self == Self::Full
    }
}
