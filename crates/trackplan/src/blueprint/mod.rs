//! Blueprint Factory: compile a piece-pattern string against an inventory.
//!
//! Grammar
//! - Concatenated ASCII tokens `L<n>` (straight run of total length n),
//!   `T<n>` / `t<n>` (right / left turn group of angle π/n), `B1` (bridge).
//!
//! Decomposition
//! - Straight runs pack greedily from `L4` down to `L1`.
//! - Turn groups are counted in eighth-turn units (π/8). Class-4 stock (two
//!   units each) is used before class-8 stock (one unit). Handedness never
//!   substitutes: `t` only draws left-hand stock.
//! - Each token either commits all its pieces or none, but earlier tokens stay
//!   consumed when a later one fails. Callers needing a clean inventory after
//!   failure work on a clone.
//!
//! The built template is a flat chain with default symmetry installed
//! (`Track::install_default_symmetry`).

use std::fmt;
use std::str::FromStr;

use crate::layout::{Hand, Inventory, Piece};
use crate::template::{NodeId, Track};

mod library;

pub use library::{circle, parse_all, CIRCLE, LIBRARY, SEEDS};

/// Eighth-turn units per half turn.
const EIGHTHS: u32 = 8;

/// One parsed pattern token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Straight(u32),
    Turn { class: u32, hand: Hand },
    Bridge(u32),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Straight(n) => write!(f, "L{n}"),
            Token::Turn {
                class,
                hand: Hand::Right,
            } => write!(f, "T{class}"),
            Token::Turn {
                class,
                hand: Hand::Left,
            } => write!(f, "t{class}"),
            Token::Bridge(n) => write!(f, "B{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlueprintError {
    /// Unexpected character or missing/zero count at byte offset `at`.
    Syntax { at: usize, text: String },
    /// Turn class that is not a divisor of 8.
    UnsupportedTurn { class: u32 },
    /// Bridges only come in unit length.
    BadBridge { length: u32 },
    /// `missing` units of `token` could not be drawn from stock.
    Shortfall { token: String, missing: u32 },
}

impl fmt::Display for BlueprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { at, text } => write!(f, "blueprint syntax error at {at} in {text:?}"),
            Self::UnsupportedTurn { class } => write!(f, "unsupported turn class {class}"),
            Self::BadBridge { length } => write!(f, "bridge length must be 1, got {length}"),
            Self::Shortfall { token, missing } => {
                write!(f, "inventory shortfall for {token}: {missing} units missing")
            }
        }
    }
}

impl std::error::Error for BlueprintError {}

/// A parsed pattern string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blueprint {
    text: String,
    tokens: Vec<Token>,
}

impl FromStr for Blueprint {
    type Err = BlueprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = |at: usize| BlueprintError::Syntax {
            at,
            text: s.to_string(),
        };
        let bytes = s.as_bytes();
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let kind = bytes[i];
            if !matches!(kind, b'L' | b'T' | b't' | b'B') {
                return Err(syntax(i));
            }
            let digits_from = i + 1;
            let mut j = digits_from;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            let n: u32 = s[digits_from..j].parse().map_err(|_| syntax(i))?;
            if n == 0 {
                return Err(syntax(i));
            }
            tokens.push(match kind {
                b'L' => Token::Straight(n),
                b'T' => Token::Turn {
                    class: n,
                    hand: Hand::Right,
                },
                b't' => Token::Turn {
                    class: n,
                    hand: Hand::Left,
                },
                _ => Token::Bridge(n),
            });
            i = j;
        }
        if tokens.is_empty() {
            return Err(syntax(0));
        }
        Ok(Self {
            text: s.to_string(),
            tokens,
        })
    }
}

impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Blueprint {
    pub fn parse(s: &str) -> Result<Self, BlueprintError> {
        s.parse()
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Compile into a detached chain inside `track`, consuming stock from `inv`.
    pub fn build(&self, track: &mut Track, inv: &mut Inventory) -> Result<NodeId, BlueprintError> {
        let mut pieces = Vec::new();
        for tok in &self.tokens {
            let part = plan(*tok, inv)?;
            if !inv.take_all(&part) {
                return Err(BlueprintError::Shortfall {
                    token: tok.to_string(),
                    missing: part.len() as u32,
                });
            }
            pieces.extend(part);
        }
        let chain = track.chain_of(&pieces);
        track.install_default_symmetry(chain);
        Ok(chain)
    }
}

/// Pieces one token decomposes into given current stock; takes nothing.
fn plan(tok: Token, inv: &Inventory) -> Result<Vec<Piece>, BlueprintError> {
    let shortfall = |missing: u32| BlueprintError::Shortfall {
        token: tok.to_string(),
        missing,
    };
    match tok {
        Token::Straight(total) => {
            let mut left = total;
            let mut out = Vec::new();
            for len in (1..=4u8).rev() {
                let piece = Piece::Straight(len);
                let n = (left / u32::from(len)).min(inv.count(piece));
                out.extend(std::iter::repeat(piece).take(n as usize));
                left -= n * u32::from(len);
            }
            if left > 0 {
                return Err(shortfall(left));
            }
            Ok(out)
        }
        Token::Turn { class, hand } => {
            if class == 0 || EIGHTHS % class != 0 {
                return Err(BlueprintError::UnsupportedTurn { class });
            }
            let (quarter, eighth) = match hand {
                Hand::Right => (Piece::right(4), Piece::right(8)),
                Hand::Left => (Piece::left(4), Piece::left(8)),
            };
            let units = EIGHTHS / class;
            let big = (units / 2).min(inv.count(quarter));
            let small = units - 2 * big;
            if inv.count(eighth) < small {
                return Err(shortfall(small - inv.count(eighth)));
            }
            let mut out = vec![quarter; big as usize];
            out.extend(std::iter::repeat(eighth).take(small as usize));
            Ok(out)
        }
        Token::Bridge(length) => {
            if length != 1 {
                return Err(BlueprintError::BadBridge { length });
            }
            if inv.count(Piece::Bridge) < 1 {
                return Err(shortfall(1));
            }
            Ok(vec![Piece::Bridge])
        }
    }
}

#[cfg(test)]
mod tests;
