use std::fmt;

use bitvec::prelude::*;

use crate::model::FluentId;

/// A set of fluents that currently hold.
pub trait State {
    fn contains(&self, f: FluentId) -> bool;
    fn fluents(&self) -> impl Iterator<Item = FluentId> + '_;
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FluentSet {
    bits: BitVec,
}

impl FluentSet {
    pub fn new(num_fluents: usize) -> Self {
        Self { bits: bitvec![0; num_fluents] }
    }

    pub fn from_fluents(num_fluents: usize, fluents: impl IntoIterator<Item = FluentId>) -> Self {
        let mut s = Self::new(num_fluents);
        for f in fluents {
            s.insert(f);
        }
        s
    }

    pub fn insert(&mut self, f: FluentId) {
        self.bits.set(f, true);
    }

    pub fn remove(&mut self, f: FluentId) {
        self.bits.set(f, false);
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }
}

impl State for FluentSet {
    #[inline(always)]
    fn contains(&self, f: FluentId) -> bool {
        self.bits.get(f).map(|b| *b).unwrap_or(false)
    }

    fn fluents(&self) -> impl Iterator<Item = FluentId> + '_ {
        self.bits.iter_ones()
    }
}

/// A materialized list of true fluents. Membership is a linear scan.
impl State for [FluentId] {
    fn contains(&self, f: FluentId) -> bool {
        self.iter().any(|&x| x == f)
    }

    fn fluents(&self) -> impl Iterator<Item = FluentId> + '_ {
        self.iter().copied()
    }
}

impl fmt::Debug for FluentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.bits.iter_ones()).finish()
    }
}
