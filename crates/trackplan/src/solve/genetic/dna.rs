//! Byte-coded instruction tape.
//!
//! Every byte decodes to an instruction, so any tape is runnable and random
//! genes are just random bytes.

use rand::Rng;

use crate::geom::Cardinal;

const JUMPS: [i8; 4] = [-8, -3, 3, 8];
const SCALE_BASE: u8 = 10;
const SCALE_LENGTHS: u8 = 5;
const CODES: u8 = SCALE_BASE + 4 * SCALE_LENGTHS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Idle,
    Prev,
    Next,
    /// Remember the current chain and descend to its first child.
    Enter,
    /// Return to the most recently entered chain.
    Exit,
    /// Insert a straight (of the given length, `L1` by default) heading `dir`
    /// and its mirror on the symmetric side.
    Scale(Cardinal, Option<u8>),
    /// Substitute a random library blueprint.
    Mutate,
    /// Move the cursor by this many genes.
    Jump(i8),
}

impl Instruction {
    pub fn decode(byte: u8) -> Self {
        let code = byte % 32;
        match code {
            0 => Instruction::Idle,
            1 => Instruction::Prev,
            2 => Instruction::Next,
            3 => Instruction::Enter,
            4 => Instruction::Exit,
            5 => Instruction::Mutate,
            6..=9 => Instruction::Jump(JUMPS[usize::from(code - 6)]),
            c if c < CODES => {
                let k = c - SCALE_BASE;
                let dir = Cardinal::ALL[usize::from(k / SCALE_LENGTHS)];
                let len = k % SCALE_LENGTHS;
                Instruction::Scale(dir, (len > 0).then_some(len))
            }
            _ => Instruction::Idle,
        }
    }

    /// Canonical byte; `decode(encode(i)) == i` for every valid instruction.
    pub fn encode(self) -> u8 {
        match self {
            Instruction::Idle => 0,
            Instruction::Prev => 1,
            Instruction::Next => 2,
            Instruction::Enter => 3,
            Instruction::Exit => 4,
            Instruction::Mutate => 5,
            Instruction::Jump(d) => {
                let k = JUMPS.iter().position(|&j| j == d).unwrap_or(0);
                6 + k as u8
            }
            Instruction::Scale(dir, len) => {
                let l = len.map_or(0, |n| n.clamp(1, SCALE_LENGTHS - 1));
                SCALE_BASE + dir.index() as u8 * SCALE_LENGTHS + l
            }
        }
    }

    /// Cursor offset after the instruction ran.
    #[inline]
    pub fn advance(self) -> isize {
        match self {
            Instruction::Jump(d) => isize::from(d),
            _ => 1,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::decode(rng.gen())
    }
}

/// Fresh random tape of `len` genes.
pub fn random_dna<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<Instruction> {
    (0..len).map(|_| Instruction::random(rng)).collect()
}

/// `cursor + delta` wrapped into `0..len` in both directions.
#[inline]
pub fn wrap(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (cursor as isize + delta).rem_euclid(len as isize) as usize
}
