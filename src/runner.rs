//! Zero-based [Runner] and [Rank] identifiers. Both are displayed one-based, the way they appear on a
//! race card.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Runner(usize);

impl Runner {
    pub fn index(index: usize) -> Self {
        Self(index)
    }

    pub fn as_number(&self) -> usize {
        self.0 + 1
    }
}

impl Display for Runner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.as_number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rank(usize);

impl Rank {
    pub fn index(index: usize) -> Self {
        Self(index)
    }

    pub fn as_number(&self) -> usize {
        self.0 + 1
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_number())
    }
}
