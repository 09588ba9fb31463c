//! Levenshtein alignment with operation counts.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Operation counts of one minimum-edit alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCounts {
    pub hits: usize,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

impl EditCounts {
    /// S + D + I.
    pub fn errors(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }

    /// Tokens in the reference (H + S + D).
    pub fn reference_len(&self) -> usize {
        self.hits + self.substitutions + self.deletions
    }

    /// Tokens in the hypothesis (H + S + I).
    pub fn hypothesis_len(&self) -> usize {
        self.hits + self.substitutions + self.insertions
    }
}

impl AddAssign for EditCounts {
    fn add_assign(&mut self, other: Self) {
        self.hits += other.hits;
        self.substitutions += other.substitutions;
        self.deletions += other.deletions;
        self.insertions += other.insertions;
    }
}

/// Narrowest band tried before widening.
const MIN_BAND: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    cost: usize,
    hits: usize,
    substitutions: usize,
    deletions: usize,
    insertions: usize,
}

impl Cell {
    fn substitute(self, same: bool) -> Self {
        if same {
            Self {
                hits: self.hits + 1,
                ..self
            }
        } else {
            Self {
                cost: self.cost + 1,
                substitutions: self.substitutions + 1,
                ..self
            }
        }
    }

    fn delete(self) -> Self {
        Self {
            cost: self.cost + 1,
            deletions: self.deletions + 1,
            ..self
        }
    }

    fn insert(self) -> Self {
        Self {
            cost: self.cost + 1,
            insertions: self.insertions + 1,
            ..self
        }
    }

    /// Lower cost wins; on equal cost, more hits.
    fn beats(&self, other: &Cell) -> bool {
        self.cost < other.cost || (self.cost == other.cost && self.hits > other.hits)
    }

    fn counts(self) -> EditCounts {
        EditCounts {
            hits: self.hits,
            substitutions: self.substitutions,
            deletions: self.deletions,
            insertions: self.insertions,
        }
    }
}

/// Align `hypothesis` against `reference` and count the edit operations.
///
/// Among minimum-cost alignments the one with the most hits is kept; on a
/// full tie a diagonal step wins over a deletion, and a deletion over an
/// insertion.
///
/// Only cells within `band` diagonals of the main diagonal are computed. A
/// path of cost `c` never leaves the band `|i - j| <= c`, so once the banded
/// result costs no more than the band it is the exact optimum; otherwise the
/// band doubles. Time is O(d * len) for an edit distance `d`.
pub fn align<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> EditCounts {
    let full = reference.len().max(hypothesis.len());
    let mut band = reference
        .len()
        .abs_diff(hypothesis.len())
        .max(MIN_BAND)
        .min(full);

    loop {
        let cell = align_banded(reference, hypothesis, band);
        if cell.cost <= band || band >= full {
            return cell.counts();
        }
        band = (band * 2).min(full);
    }
}

/// Banded DP. Column `j` of row `i` is stored at slot `j + band - i`.
///
/// `band` must be at least `|reference.len() - hypothesis.len()|`.
fn align_banded<T: PartialEq>(reference: &[T], hypothesis: &[T], band: usize) -> Cell {
    let m = reference.len();
    let n = hypothesis.len();
    let width = 2 * band + 1;

    let mut prev: Vec<Option<Cell>> = vec![None; width];
    for j in 0..=n.min(band) {
        prev[j + band] = Some(Cell {
            cost: j,
            insertions: j,
            ..Cell::default()
        });
    }
    let mut curr: Vec<Option<Cell>> = vec![None; width];

    for (row, r) in reference.iter().enumerate() {
        let i = row + 1;
        curr.fill(None);

        for j in i.saturating_sub(band)..=(i + band).min(n) {
            let slot = j + band - i;

            // (i-1, j-1) sits at the same slot in the previous row, (i-1, j) one to the right.
            let diagonal = if j > 0 {
                prev[slot].map(|c| c.substitute(*r == hypothesis[j - 1]))
            } else {
                None
            };
            let deletion = prev.get(slot + 1).copied().flatten().map(Cell::delete);
            let insertion = if j > 0 && slot > 0 {
                curr[slot - 1].map(Cell::insert)
            } else {
                None
            };

            let mut best: Option<Cell> = None;
            for candidate in [diagonal, deletion, insertion].into_iter().flatten() {
                if best.is_none_or(|b| candidate.beats(&b)) {
                    best = Some(candidate);
                }
            }
            curr[slot] = best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    // |m - n| <= band keeps the end cell inside the band.
    prev[n + band - m].unwrap_or(Cell {
        cost: usize::MAX,
        ..Cell::default()
    })
}
