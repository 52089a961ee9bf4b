//! Precomputed relaxed-task graph shared by every evaluation.
//!
//! Each action yields a trigger for its unconditional adds and one trigger
//! per conditional effect. A trigger fires once all its preconditions are
//! reached. Triggers without preconditions hang off a synthetic root fluent
//! that is always reached at cost zero.

use std::ops::Range;

use itertools::Itertools;

use crate::model::{ActionId, FluentId, StripsProblem};

pub type TriggerId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub action: ActionId,
    /// `None` for the unconditional effects, else the conditional effect index.
    pub effect: Option<usize>,
    pub preconditions: Vec<FluentId>,
    pub adds: Vec<FluentId>,
}

/// Compressed adjacency lists, one row per source node.
#[derive(Clone, Debug)]
pub struct Adjacency {
    offsets: Vec<usize>,
    targets: Vec<usize>,
}

impl Adjacency {
    pub fn build(nodes: usize, edges: &[(usize, usize)]) -> Self {
        let mut counts = vec![0usize; nodes];
        for &(s, _) in edges { counts[s] += 1; }
        let mut offsets = vec![0usize; nodes + 1];
        for i in 0..nodes { offsets[i + 1] = offsets[i] + counts[i]; }
        let mut cur = offsets[..nodes].to_vec();
        let mut targets = vec![0usize; edges.len()];
        for &(s, t) in edges {
            targets[cur[s]] = t;
            cur[s] += 1;
        }
        Adjacency { offsets, targets }
    }

    #[inline(always)]
    pub fn neighbors(&self, u: usize) -> &[usize] {
        &self.targets[self.offsets[u]..self.offsets[u + 1]]
    }
}

#[derive(Clone, Debug)]
pub struct RelaxedTask {
    root: FluentId,
    triggers: Vec<Trigger>,
    by_action: Vec<Range<TriggerId>>,
    relevant: Adjacency,
    achievers: Adjacency,
}

impl RelaxedTask {
    pub fn build(problem: &StripsProblem) -> Self {
        let root = problem.num_fluents();
        let mut triggers = Vec::new();
        let mut by_action = Vec::with_capacity(problem.num_actions());
        for (i, a) in problem.actions().iter().enumerate() {
            let start = triggers.len();
            triggers.push(Trigger { action: i, effect: None, preconditions: a.precondition.clone(), adds: a.add.clone() });
            for (j, e) in a.conditional_effects.iter().enumerate() {
                let mut preconditions: Vec<FluentId> =
                    a.precondition.iter().chain(&e.condition).copied().sorted_unstable().dedup().collect();
                if preconditions.is_empty() {
                    preconditions.push(root);
                }
                triggers.push(Trigger { action: i, effect: Some(j), preconditions, adds: e.add.clone() });
            }
            by_action.push(start..triggers.len());
        }
        for &a in problem.empty_precondition_actions() {
            triggers[by_action[a].start].preconditions.push(root);
        }

        let relevant_edges: Vec<(usize, usize)> = triggers
            .iter()
            .enumerate()
            .flat_map(|(ti, t)| t.preconditions.iter().map(move |&p| (p, ti)))
            .collect();
        let relevant = Adjacency::build(root + 1, &relevant_edges);

        let mut achiever_edges = Vec::new();
        for f in 0..root {
            for &a in problem.actions_adding(f) {
                for ti in by_action[a].clone() {
                    if triggers[ti].adds.binary_search(&f).is_ok() {
                        achiever_edges.push((f, ti));
                    }
                }
            }
        }
        let achievers = Adjacency::build(root + 1, &achiever_edges);

        RelaxedTask { root, triggers, by_action, relevant, achievers }
    }

    /// The synthetic always-true fluent.
    pub fn root(&self) -> FluentId {
        self.root
    }

    /// Real fluents plus the root.
    pub fn num_nodes(&self) -> usize {
        self.root + 1
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn trigger(&self, t: TriggerId) -> &Trigger {
        &self.triggers[t]
    }

    pub fn triggers_of(&self, a: ActionId) -> Range<TriggerId> {
        self.by_action[a].clone()
    }

    /// Triggers having `f` among their preconditions.
    #[inline(always)]
    pub fn relevant(&self, f: FluentId) -> &[TriggerId] {
        self.relevant.neighbors(f)
    }

    /// Actions mentioning `f` in their precondition or in some effect condition.
    pub fn relevant_actions(&self, f: FluentId) -> impl Iterator<Item = ActionId> + '_ {
        self.relevant(f).iter().map(|&t| self.triggers[t].action).dedup()
    }

    /// Triggers adding `f`.
    #[inline(always)]
    pub fn achievers(&self, f: FluentId) -> &[TriggerId] {
        self.achievers.neighbors(f)
    }
}
