//! Testing helpers.

use assert_float_eq::*;
use tinyrand::Rand;

use crate::linear::Matrix;
use crate::probs::SliceExt;

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

/// Routes `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// A field of `runners` strictly positive win probabilities summing to 1.
pub fn random_win_probs(runners: usize, rand: &mut impl Rand) -> Vec<f64> {
    let mut probs: Vec<_> = (0..runners).map(|_| 0.05 + random_f64(rand)).collect();
    let sum = probs.sum();
    for prob in &mut probs {
        *prob /= sum;
    }
    probs
}

/// Samples `trials` races in which each rank is drawn from the runners still in contention, in
/// proportion to their win probabilities, and returns the observed frequency of each runner in
/// each of the top `places` ranks.
pub fn simulate_places(
    win_probs: &[f64],
    places: usize,
    trials: u64,
    rand: &mut impl Rand,
) -> Matrix<f64> {
    let runners = win_probs.len();
    let mut counts = Matrix::<u64>::allocate(places, runners);
    let mut podium = vec![0; places];
    let mut bitmap = vec![true; runners];
    for _ in 0..trials {
        run_once(win_probs, &mut podium, &mut bitmap, rand);
        for (rank, &runner) in podium.iter().enumerate() {
            counts[(rank, runner)] += 1;
        }
    }

    let mut frequencies = Matrix::allocate(places, runners);
    for (frequency, &count) in frequencies.flatten_mut().iter_mut().zip(counts.flatten()) {
        *frequency = count as f64 / trials as f64;
    }
    frequencies
}

fn run_once(probs: &[f64], podium: &mut [usize], bitmap: &mut [bool], rand: &mut impl Rand) {
    debug_assert_eq!(probs.len(), bitmap.len());
    debug_assert!(podium.len() <= probs.len());

    bitmap.fill(true);
    let mut prob_sum = 1.0;
    for rank in 0..podium.len() {
        let random = random_f64(rand) * prob_sum;
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (runner, &prob) in probs.iter().enumerate() {
            if bitmap[runner] {
                cumulative += prob;
                chosen = Some(runner);
                if cumulative >= random {
                    break;
                }
            }
        }
        // rounding may leave the last runner in contention unmatched
        let runner = chosen.expect("no runners left in contention");
        podium[rank] = runner;
        bitmap[runner] = false;
        prob_sum -= probs[runner];
    }
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use tinyrand::StdRand;

    use super::*;

    #[test]
    fn random_win_probs_normalised() {
        let probs = random_win_probs(8, &mut StdRand::default());
        assert_eq!(8, probs.len());
        assert_float_relative_eq!(1.0, probs.sum(), 1e-12);
        assert!(probs.iter().all(|&prob| prob > 0.0));
    }

    #[test]
    fn simulate_places_certain_winner() {
        let frequencies = simulate_places(&[1.0, 0.0, 0.0], 1, 1_000, &mut StdRand::default());
        assert_slice_f64_near(&[1.0, 0.0, 0.0], frequencies.row_slice(0), 1);
    }

    #[test]
    fn simulate_places_fills_every_rank() {
        let frequencies = simulate_places(&[0.5, 0.3, 0.2], 3, 1_000, &mut StdRand::default());
        for rank in 0..frequencies.rows() {
            assert_slice_f64_relative(&[1.0], &[frequencies.row_slice(rank).sum()], 1e-9);
        }
    }
}
