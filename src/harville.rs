//! Place probabilities by recursive Harville renormalisation.
//!
//! Starting from the win probabilities alone, the calculator walks every ordered prefix of the
//! finishing order up to the relevant number of places. Along each path, the win probabilities of
//! the runners still in contention are renormalised by the mass that remains once the runners
//! already placed are taken out. The weight of each path is accumulated into the rank it resolves.
//!
//! The walk visits `n! / (n - places)!` prefixes, which is fine for racing fields and a handful of
//! places but grows quickly beyond that.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, trace};

use crate::linear::Matrix;
use crate::probs::SliceExt;
use crate::runner::{Rank, Runner};
use crate::table::PlaceTable;

pub const DEFAULT_RELEVANT_PLACES: usize = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaceError {
    #[error("no win probabilities specified")]
    NoWinProbs,

    #[error("remaining probability mass exhausted by {runner} at rank {rank}")]
    ExhaustedMass { runner: Runner, rank: Rank },
}

/// Builder-style configuration of a place probability calculation.
#[derive(Debug, Clone)]
pub struct HarvilleConfig<'a> {
    win_probs: Option<&'a [f64]>,
    relevant_places: usize,
}
impl<'a> HarvilleConfig<'a> {
    #[must_use]
    pub fn with_win_probs(mut self, win_probs: &'a [f64]) -> Self {
        self.win_probs = Some(win_probs);
        self
    }

    #[must_use]
    pub fn with_relevant_places(mut self, relevant_places: usize) -> Self {
        self.relevant_places = relevant_places;
        self
    }

    pub fn relevant_places(&self) -> usize {
        self.relevant_places
    }

    /// Computes the place table. The number of relevant places is capped at the field size, so that
    /// the default of [DEFAULT_RELEVANT_PLACES] can be used with smaller fields. Zero relevant places
    /// yields a table with no ranks.
    ///
    /// # Errors
    /// [PlaceError::NoWinProbs] if the win probabilities are absent or empty.
    ///
    /// [PlaceError::ExhaustedMass] as per [place_probs]. When the cap resolves every rank in the
    /// field, a scratched (zero-probability) runner can leave exactly zero mass ahead of the last,
    /// forced rank on some orderings; e.g., `[0.6, 0.3, 0.1, 0.0]` over four places fails this way.
    /// Limit the relevant places to the runners in contention to avoid it.
    pub fn compute(&self) -> Result<PlaceTable, PlaceError> {
        let win_probs = self
            .win_probs
            .filter(|win_probs| !win_probs.is_empty())
            .ok_or(PlaceError::NoWinProbs)?;
        let relevant_places = usize::min(self.relevant_places, win_probs.len());
        place_probs(win_probs, relevant_places)
    }
}

impl Default for HarvilleConfig<'_> {
    fn default() -> Self {
        Self {
            win_probs: None,
            relevant_places: DEFAULT_RELEVANT_PLACES,
        }
    }
}

/// Computes a fresh `relevant_places × n` table of the probability of each runner finishing in each
/// rank.
///
/// The win probabilities are assumed to be non-negative and to sum to 1, and `relevant_places`
/// must not exceed the number of runners; neither is checked outside of debug builds. With zero
/// relevant places there are no ranks to resolve, and the returned table is empty.
///
/// # Errors
/// [PlaceError::ExhaustedMass] if a runner's win probability consumes the entire remaining mass
/// before the last relevant rank, which would otherwise divide by zero.
pub fn place_probs(win_probs: &[f64], relevant_places: usize) -> Result<PlaceTable, PlaceError> {
    let mut table = Matrix::allocate(relevant_places, win_probs.len());
    place_probs_no_alloc(win_probs, relevant_places, &mut table)?;
    Ok(PlaceTable::new(table))
}

/// As per [place_probs], but writes into a caller-supplied `table`. Row 0 is overwritten with
/// `win_probs` and the remaining rows are cleared before accumulating, so the table may be reused
/// across calls. On error, the contents of the table are unspecified.
pub fn place_probs_no_alloc(
    win_probs: &[f64],
    relevant_places: usize,
    table: &mut Matrix<f64>,
) -> Result<(), PlaceError> {
    debug_assert!(
        relevant_places <= win_probs.len(),
        "number of relevant places {relevant_places} exceeds the number of runners {}",
        win_probs.len()
    );
    debug_assert_eq!(
        table.rows(),
        relevant_places,
        "number of rows in the table must equal to the number of relevant places"
    );
    debug_assert_eq!(
        table.cols(),
        win_probs.len(),
        "number of columns in the table must equal to the number of runners"
    );
    debug_assert!(win_probs.all_within_unit(), "invalid win probabilities {win_probs:?}");

    if relevant_places == 0 {
        return Ok(());
    }

    let start_time = Instant::now();
    table.clone_row(0, win_probs);
    table.reset_rows(1..relevant_places);

    let mut descent = Descent {
        win_probs,
        relevant_places,
        table,
        paths: 0,
    };
    descent.descend(1.0, 1.0, Prefix::default(), 1)?;

    debug!(
        "computed {relevant_places}x{} place table over {} paths in {:?}",
        win_probs.len(),
        descent.paths,
        start_time.elapsed()
    );
    Ok(())
}

/// The Harville probability of the runners in `podium` finishing in exactly that order, occupying
/// the top `podium.len()` ranks.
///
/// # Errors
/// [PlaceError::ExhaustedMass] if the runners placed ahead of some rank account for the entire
/// probability mass.
pub fn podium_prob(win_probs: &[f64], podium: &[usize]) -> Result<f64, PlaceError> {
    debug_assert!(
        podium
            .iter()
            .enumerate()
            .all(|(index, runner)| !podium[index + 1..].contains(runner)),
        "runners in podium {podium:?} must be unique"
    );
    let mut remaining_mass = 1.0;
    let mut combined_prob = 1.0;
    for (rank, &runner) in podium.iter().enumerate() {
        if remaining_mass == 0.0 {
            return Err(PlaceError::ExhaustedMass {
                runner: Runner::index(podium[rank - 1]),
                rank: Rank::index(rank - 1),
            });
        }
        let prob = win_probs[runner];
        combined_prob *= prob / remaining_mass;
        remaining_mass -= prob;
    }
    Ok(combined_prob)
}

/// An immutable prefix of the finishing order. Extending a prefix links a new node on the stack
/// to its parent; the parent is left untouched, so siblings never observe each other.
#[derive(Clone, Copy, Default)]
struct Prefix<'a> {
    head: Option<&'a Link<'a>>,
}

struct Link<'a> {
    runner: usize,
    tail: Prefix<'a>,
}

impl Prefix<'_> {
    fn contains(self, runner: usize) -> bool {
        let mut next = self.head;
        while let Some(link) = next {
            if link.runner == runner {
                return true;
            }
            next = link.tail.head;
        }
        false
    }
}

struct Descent<'a> {
    win_probs: &'a [f64],
    relevant_places: usize,
    table: &'a mut Matrix<f64>,
    paths: u64,
}
impl Descent<'_> {
    /// Resolves rank `depth` (one-based) for every runner not yet in `placed`.
    fn descend(
        &mut self,
        remaining_mass: f64,
        adjustment: f64,
        placed: Prefix,
        depth: usize,
    ) -> Result<(), PlaceError> {
        let win_probs = self.win_probs;
        for (runner, &prob) in win_probs.iter().enumerate() {
            if placed.contains(runner) {
                continue;
            }
            if depth > 1 {
                self.table[(depth - 1, runner)] += prob * adjustment;
            }
            if depth < self.relevant_places {
                let remaining_mass = remaining_mass - prob;
                if remaining_mass == 0.0 {
                    trace!("runner {runner} exhausted the remaining mass at depth {depth}");
                    return Err(PlaceError::ExhaustedMass {
                        runner: Runner::index(runner),
                        rank: Rank::index(depth - 1),
                    });
                }
                self.paths += 1;
                let link = Link {
                    runner,
                    tail: placed,
                };
                self.descend(
                    remaining_mass,
                    adjustment * prob / remaining_mass,
                    Prefix { head: Some(&link) },
                    depth + 1,
                )?;
            }
        }
        Ok(())
    }
}
