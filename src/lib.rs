//! Derives the probability of each runner finishing in each of the top-_N_ places given only win
//! probabilities, by recursively renormalising the win probabilities of the runners still in
//! contention (the Harville method).

pub mod harville;
pub mod linear;
pub mod probs;
pub mod runner;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
