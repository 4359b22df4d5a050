//! Piece inventory: named piece -> remaining count and unit price.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::piece::Piece;

/// Remaining count and unit price of one piece type.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Stock {
    pub count: u32,
    pub price: f64,
}

/// Interchange row `(name, count, price)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockRow {
    pub name: Piece,
    pub count: u32,
    pub price: f64,
}

/// Ordered piece inventory.
///
/// Invariants:
/// - Counts never go negative: `take` refuses instead of underflowing.
/// - Iteration order is the `Piece` order (deterministic across runs).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<StockRow>", from = "Vec<StockRow>")]
pub struct Inventory {
    stock: BTreeMap<Piece, Stock>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert (replaces an existing entry).
    pub fn with(mut self, piece: Piece, count: u32, price: f64) -> Self {
        self.insert(piece, count, price);
        self
    }

    pub fn insert(&mut self, piece: Piece, count: u32, price: f64) {
        self.stock.insert(piece, Stock { count, price });
    }

    #[inline]
    pub fn count(&self, piece: Piece) -> u32 {
        self.stock.get(&piece).map_or(0, |s| s.count)
    }

    /// Unit price; pieces not listed cost nothing.
    #[inline]
    pub fn price(&self, piece: Piece) -> f64 {
        self.stock.get(&piece).map_or(0.0, |s| s.price)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Piece, Stock)> + '_ {
        self.stock.iter().map(|(p, s)| (*p, *s))
    }

    pub fn total_count(&self) -> u64 {
        self.stock.values().map(|s| u64::from(s.count)).sum()
    }

    /// Consume `n` pieces; returns false (and leaves the count untouched) on shortfall.
    pub fn take(&mut self, piece: Piece, n: u32) -> bool {
        match self.stock.get_mut(&piece) {
            Some(s) if s.count >= n => {
                s.count -= n;
                true
            }
            _ => n == 0,
        }
    }

    /// Consume every piece in `pieces` or none of them.
    pub fn take_all(&mut self, pieces: &[Piece]) -> bool {
        let need = tally(pieces);
        if need.iter().any(|(p, n)| self.count(*p) < *n) {
            return false;
        }
        for (p, n) in need {
            self.take(p, n);
        }
        true
    }

    /// Return pieces to stock. Unknown pieces are added at price 0.
    pub fn put_back(&mut self, piece: Piece, n: u32) {
        self.stock.entry(piece).or_default().count += n;
    }

    pub fn put_back_all(&mut self, pieces: &[Piece]) {
        for p in pieces {
            self.put_back(*p, 1);
        }
    }

    /// Stock left after laying `pieces` (saturating at zero).
    pub fn without(&self, pieces: &[Piece]) -> Inventory {
        let mut out = self.clone();
        for (p, n) in tally(pieces) {
            if let Some(s) = out.stock.get_mut(&p) {
                s.count = s.count.saturating_sub(n);
            }
        }
        out
    }
}

fn tally(pieces: &[Piece]) -> BTreeMap<Piece, u32> {
    let mut need: BTreeMap<Piece, u32> = BTreeMap::new();
    for p in pieces {
        *need.entry(*p).or_default() += 1;
    }
    need
}

impl From<Vec<StockRow>> for Inventory {
    fn from(rows: Vec<StockRow>) -> Self {
        let mut inv = Inventory::new();
        for r in rows {
            inv.insert(r.name, r.count, r.price);
        }
        inv
    }
}

impl From<Inventory> for Vec<StockRow> {
    fn from(inv: Inventory) -> Self {
        inv.stock
            .into_iter()
            .map(|(name, s)| StockRow {
                name,
                count: s.count,
                price: s.price,
            })
            .collect()
    }
}
