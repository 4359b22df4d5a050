//! Piece catalogue: straights, handed turns, and bridges.
//!
//! Names follow the interchange form: `L<n>` is a straight of length `n`,
//! `T<n>` / `t<n>` is a right / left turn of angle π/n, `B1` is a bridge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Turn handedness. Right turns decrease the heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hand {
    Right,
    Left,
}

impl Hand {
    #[inline]
    pub fn mirror(self) -> Self {
        match self {
            Hand::Right => Hand::Left,
            Hand::Left => Hand::Right,
        }
    }
}

/// Turn sign carried by a topology edge: `+1` right, `-1` left, `0` none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Turn {
    Left,
    Straight,
    Right,
}

impl Turn {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Turn::Left => -1.0,
            Turn::Straight => 0.0,
            Turn::Right => 1.0,
        }
    }

    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Turn::Left => Turn::Right,
            Turn::Straight => Turn::Straight,
            Turn::Right => Turn::Left,
        }
    }
}

impl From<Turn> for i8 {
    fn from(t: Turn) -> i8 {
        match t {
            Turn::Left => -1,
            Turn::Straight => 0,
            Turn::Right => 1,
        }
    }
}

impl TryFrom<i8> for Turn {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Turn::Left),
            0 => Ok(Turn::Straight),
            1 => Ok(Turn::Right),
            other => Err(format!("turn sign must be -1, 0 or 1, got {other}")),
        }
    }
}

/// One track piece type.
///
/// Invariants:
/// - `Straight(n)` has `n >= 1`.
/// - `Turn { class, .. }` has `class >= 1`; the turn angle is π/class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Piece {
    Straight(u8),
    Turn { class: u8, hand: Hand },
    Bridge,
}

impl Piece {
    pub const L1: Piece = Piece::Straight(1);

    #[inline]
    pub fn right(class: u8) -> Self {
        Piece::Turn {
            class,
            hand: Hand::Right,
        }
    }

    #[inline]
    pub fn left(class: u8) -> Self {
        Piece::Turn {
            class,
            hand: Hand::Left,
        }
    }

    /// Turn sign this piece contributes when laid in its natural direction.
    #[inline]
    pub fn turn(self) -> Turn {
        match self {
            Piece::Turn {
                hand: Hand::Right, ..
            } => Turn::Right,
            Piece::Turn {
                hand: Hand::Left, ..
            } => Turn::Left,
            _ => Turn::Straight,
        }
    }

    #[inline]
    pub fn is_bridge(self) -> bool {
        matches!(self, Piece::Bridge)
    }

    /// Turn angle in radians (0 for straights and bridges).
    #[inline]
    pub fn arc(self) -> f64 {
        match self {
            Piece::Turn { class, .. } => std::f64::consts::PI / f64::from(class),
            _ => 0.0,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Straight(n) => write!(f, "L{n}"),
            Piece::Turn {
                class,
                hand: Hand::Right,
            } => write!(f, "T{class}"),
            Piece::Turn {
                class,
                hand: Hand::Left,
            } => write!(f, "t{class}"),
            Piece::Bridge => write!(f, "B1"),
        }
    }
}

/// Unknown or malformed piece name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceParseError {
    pub name: String,
}

impl fmt::Display for PieceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown piece name: {:?}", self.name)
    }
}

impl std::error::Error for PieceParseError {}

impl FromStr for Piece {
    type Err = PieceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PieceParseError { name: s.to_string() };
        let mut chars = s.chars();
        let kind = chars.next().ok_or_else(err)?;
        let n: u8 = chars.as_str().parse().map_err(|_| err())?;
        if n == 0 {
            return Err(err());
        }
        match kind {
            'L' => Ok(Piece::Straight(n)),
            'T' => Ok(Piece::right(n)),
            't' => Ok(Piece::left(n)),
            'B' if n == 1 => Ok(Piece::Bridge),
            _ => Err(err()),
        }
    }
}

impl From<Piece> for String {
    fn from(p: Piece) -> String {
        p.to_string()
    }
}

impl TryFrom<String> for Piece {
    type Error = PieceParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
