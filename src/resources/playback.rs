//! Playback state consulted before the avatar may move.
use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    /// The game finished loading.
    pub ready: bool,
    /// A dialogue box is on screen.
    pub dialogue_active: bool,
    /// The game has ended.
    pub ended: bool,
    /// A script is waiting for input.
    pub input_wait: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            ready: true,
            dialogue_active: false,
            ended: false,
            input_wait: false,
        }
    }
}

impl PlaybackState {
    /// Whether player input may move the avatar right now.
    ///
    /// An avatar already mid-step is checked separately by the move command.
    pub fn can_move(&self) -> bool {
        self.ready && !self.dialogue_active && !self.ended && !self.input_wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_move_guards() {
        let mut state = PlaybackState::default();
        assert!(state.can_move());
        state.dialogue_active = true;
        assert!(!state.can_move());
        state.dialogue_active = false;
        state.ended = true;
        assert!(!state.can_move());
        state.ended = false;
        state.ready = false;
        assert!(!state.can_move());
    }
}
