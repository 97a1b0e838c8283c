//! Playback arrangement.
//!
//! [`PlayMode`] decides the order harvested frames are previewed and
//! exported in. Arranging never edits the input: [`arrange`] clones into a
//! new vector and [`PlayMode::apply`] consumes its input.
//!
//! # Example
//!
//! ```
//! use vidgif::{PlayMode, arrange};
//!
//! let frames = ["a", "b", "c", "d", "e"];
//! assert_eq!(arrange(&frames, PlayMode::Backward), ["e", "d", "c", "b", "a"]);
//! assert_eq!(arrange(&frames, PlayMode::PingPong), ["a", "c", "e", "d", "b"]);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::VidgifError;

/// Traversal order applied to a frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayMode {
    /// Original order.
    #[default]
    Forward,
    /// Reversed order.
    Backward,
    /// Even-indexed frames in order, then odd-indexed frames in reverse.
    ///
    /// Five frames play as `0, 2, 4, 3, 1`.
    PingPong,
}

impl PlayMode {
    /// All modes, in toggle order.
    pub const ALL: [PlayMode; 3] = [PlayMode::Forward, PlayMode::Backward, PlayMode::PingPong];

    /// The mode a toggle switches to: Forward → Backward → PingPong → Forward.
    pub fn next(self) -> Self {
        match self {
            PlayMode::Forward => PlayMode::Backward,
            PlayMode::Backward => PlayMode::PingPong,
            PlayMode::PingPong => PlayMode::Forward,
        }
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            PlayMode::Forward => "forward",
            PlayMode::Backward => "backward",
            PlayMode::PingPong => "pingpong",
        }
    }

    /// Reorder `frames`, taking ownership.
    pub fn apply<T>(self, frames: Vec<T>) -> Vec<T> {
        match self {
            PlayMode::Forward => frames,
            PlayMode::Backward => {
                let mut frames = frames;
                frames.reverse();
                frames
            }
            PlayMode::PingPong => {
                let mut slots: Vec<Option<T>> = frames.into_iter().map(Some).collect();
                arrangement_order(slots.len(), self)
                    .into_iter()
                    .filter_map(|index| slots[index].take())
                    .collect()
            }
        }
    }
}

impl Display for PlayMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for PlayMode {
    type Err = VidgifError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "forward" | "fwd" => Ok(PlayMode::Forward),
            "backward" | "reverse" | "bwd" => Ok(PlayMode::Backward),
            "pingpong" | "ping-pong" | "boomerang" => Ok(PlayMode::PingPong),
            other => Err(VidgifError::InvalidInput(format!(
                "unknown play mode: {other}"
            ))),
        }
    }
}

/// Source indices, in playback order, for a sequence of `len` frames.
pub fn arrangement_order(len: usize, mode: PlayMode) -> Vec<usize> {
    match mode {
        PlayMode::Forward => (0..len).collect(),
        PlayMode::Backward => (0..len).rev().collect(),
        PlayMode::PingPong => {
            let evens = (0..len).step_by(2);
            let odds = (1..len).step_by(2).rev();
            evens.chain(odds).collect()
        }
    }
}

/// Return a reordered copy of `frames`.
pub fn arrange<T: Clone>(frames: &[T], mode: PlayMode) -> Vec<T> {
    arrangement_order(frames.len(), mode)
        .into_iter()
        .map(|index| frames[index].clone())
        .collect()
}
