//! Joystick actions and the per-environment action set.

use crate::spaces::Discrete;
use crate::{AleError, Result};
use std::collections::HashMap;
use std::fmt;

/// One of the 18 joystick/button combinations an arcade cabinet accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Action {
    Noop = 0,
    Fire = 1,
    Up = 2,
    Right = 3,
    Left = 4,
    Down = 5,
    UpRight = 6,
    UpLeft = 7,
    DownRight = 8,
    DownLeft = 9,
    UpFire = 10,
    RightFire = 11,
    LeftFire = 12,
    DownFire = 13,
    UpRightFire = 14,
    UpLeftFire = 15,
    DownRightFire = 16,
    DownLeftFire = 17,
}

impl Action {
    pub const COUNT: usize = 18;

    /// Every action in identifier order. This is the full legal action set.
    pub const ALL: [Action; Self::COUNT] = [
        Action::Noop,
        Action::Fire,
        Action::Up,
        Action::Right,
        Action::Left,
        Action::Down,
        Action::UpRight,
        Action::UpLeft,
        Action::DownRight,
        Action::DownLeft,
        Action::UpFire,
        Action::RightFire,
        Action::LeftFire,
        Action::DownFire,
        Action::UpRightFire,
        Action::UpLeftFire,
        Action::DownRightFire,
        Action::DownLeftFire,
    ];

    /// Look up an action by its numeric identifier.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Whether the fire button is held.
    pub fn fire(self) -> bool {
        matches!(
            self,
            Action::Fire
                | Action::UpFire
                | Action::RightFire
                | Action::LeftFire
                | Action::DownFire
                | Action::UpRightFire
                | Action::UpLeftFire
                | Action::DownRightFire
                | Action::DownLeftFire
        )
    }

    /// Horizontal joystick direction: -1 left, 0 centered, 1 right.
    pub fn dx(self) -> i32 {
        match self {
            Action::Right
            | Action::UpRight
            | Action::DownRight
            | Action::RightFire
            | Action::UpRightFire
            | Action::DownRightFire => 1,
            Action::Left
            | Action::UpLeft
            | Action::DownLeft
            | Action::LeftFire
            | Action::UpLeftFire
            | Action::DownLeftFire => -1,
            _ => 0,
        }
    }

    /// Vertical joystick direction: -1 up, 0 centered, 1 down.
    pub fn dy(self) -> i32 {
        match self {
            Action::Up
            | Action::UpRight
            | Action::UpLeft
            | Action::UpFire
            | Action::UpRightFire
            | Action::UpLeftFire => -1,
            Action::Down
            | Action::DownRight
            | Action::DownLeft
            | Action::DownFire
            | Action::DownRightFire
            | Action::DownLeftFire => 1,
            _ => 0,
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = AleError;

    fn try_from(id: u8) -> Result<Self> {
        Self::from_id(id).ok_or(AleError::InvalidActionIndex {
            index: id as usize,
            len: Self::COUNT,
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Noop => "NOOP",
            Action::Fire => "FIRE",
            Action::Up => "UP",
            Action::Right => "RIGHT",
            Action::Left => "LEFT",
            Action::Down => "DOWN",
            Action::UpRight => "UPRIGHT",
            Action::UpLeft => "UPLEFT",
            Action::DownRight => "DOWNRIGHT",
            Action::DownLeft => "DOWNLEFT",
            Action::UpFire => "UPFIRE",
            Action::RightFire => "RIGHTFIRE",
            Action::LeftFire => "LEFTFIRE",
            Action::DownFire => "DOWNFIRE",
            Action::UpRightFire => "UPRIGHTFIRE",
            Action::UpLeftFire => "UPLEFTFIRE",
            Action::DownRightFire => "DOWNRIGHTFIRE",
            Action::DownLeftFire => "DOWNLEFTFIRE",
        };
        f.write_str(name)
    }
}

/// Keyboard bindings for human play.
pub fn keys_to_action() -> HashMap<char, Action> {
    HashMap::from([
        ('w', Action::Up),
        ('s', Action::Down),
        ('a', Action::Left),
        ('d', Action::Right),
        (' ', Action::Fire),
    ])
}

/// Ordered actions an environment instance accepts.
///
/// Built once at construction; step indices refer to positions in this set
/// and stay valid for the lifetime of the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(AleError::Config(
                "emulator reported an empty action set".to_string(),
            ));
        }
        Ok(Self { actions })
    }

    /// Pick the full legal set or the game's minimal set.
    pub fn from_emulator<E: crate::emulator::Emulator + ?Sized>(
        emulator: &E,
        full_action_space: bool,
    ) -> Result<Self> {
        let actions = if full_action_space {
            emulator.legal_action_set()
        } else {
            emulator.minimal_action_set()
        };
        Self::new(actions)
    }

    /// Resolve a step index.
    pub fn get(&self, index: usize) -> Result<Action> {
        self.actions
            .get(index)
            .copied()
            .ok_or(AleError::InvalidActionIndex {
                index,
                len: self.actions.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Index of `action` within this set, if present.
    pub fn position(&self, action: Action) -> Option<usize> {
        self.actions.iter().position(|&a| a == action)
    }

    pub fn space(&self) -> Discrete {
        Discrete::new(self.actions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_ids_match_table() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.id() as usize, i);
            assert_eq!(Action::from_id(i as u8), Some(*action));
        }
        assert_eq!(Action::from_id(18), None);
        assert!(Action::try_from(42u8).is_err());
    }

    #[test]
    fn test_action_directions() {
        assert_eq!(Action::UpRightFire.dx(), 1);
        assert_eq!(Action::UpRightFire.dy(), -1);
        assert!(Action::UpRightFire.fire());
        assert_eq!(Action::Noop.dx(), 0);
        assert!(!Action::DownLeft.fire());
        assert_eq!(Action::DownLeft.dy(), 1);
    }

    #[test]
    fn test_action_set_bounds() {
        let set = ActionSet::new(vec![Action::Noop, Action::Fire, Action::Left]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(2).unwrap(), Action::Left);
        match set.get(3) {
            Err(AleError::InvalidActionIndex { index, len }) => {
                assert_eq!(index, 3);
                assert_eq!(len, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(set.space().n, 3);
        assert_eq!(set.position(Action::Fire), Some(1));
    }

    #[test]
    fn test_empty_action_set_rejected() {
        assert!(ActionSet::new(Vec::new()).is_err());
    }

    #[test]
    fn test_keys_to_action() {
        let keys = keys_to_action();
        assert_eq!(keys[&'w'], Action::Up);
        assert_eq!(keys[&' '], Action::Fire);
        assert_eq!(keys.len(), 5);
    }
}
