//! LM-Cut: repeated h_max propagation, goal-zone marking and cut extraction.
//!
//! One instance owns all per-fluent and per-trigger tables and reuses them
//! across calls to [`LmCutHeuristic::eval`]. The problem is only read.

use std::io::{self, Write};

use bitvec::prelude::*;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::cost::{display_cost, Cost, CostPolicy, INFINITY};
use crate::model::{ActionId, FluentId, StripsProblem};
use crate::options::HeuristicOptions;
use crate::state::State;

use super::bucket_queue::BucketQueue;
use super::relevance::{RelaxedTask, TriggerId};

/// The trigger that last lowered a fluent's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BestSupporter {
    pub action: ActionId,
    /// `None` when the fluent is an unconditional add.
    pub effect: Option<usize>,
}

/// Summary of the most recent evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalStats {
    pub value: Cost,
    pub cuts: usize,
    pub dead_end: bool,
}

/// Relaxed values, their supporters and the queue that propagates them.
#[derive(Clone, Debug)]
struct ValueTable {
    values: Vec<Cost>,
    supporters: Vec<Option<BestSupporter>>,
    queue: BucketQueue<FluentId>,
}

impl ValueTable {
    fn new(nodes: usize, buckets: usize) -> Self {
        Self { values: vec![INFINITY; nodes], supporters: vec![None; nodes], queue: BucketQueue::with_buckets(buckets) }
    }

    fn reset(&mut self) {
        self.values.fill(INFINITY);
        self.supporters.fill(None);
        self.queue.clear();
    }

    /// Mark `f` as holding at no cost.
    fn seed(&mut self, f: FluentId) {
        if self.values[f] != 0 {
            self.values[f] = 0;
            self.supporters[f] = None;
            self.queue.push(0, f);
        }
    }

    #[inline(always)]
    fn update(&mut self, f: FluentId, v: Cost, supporter: BestSupporter) {
        if v < self.values[f] {
            self.values[f] = v;
            self.supporters[f] = Some(supporter);
            self.queue.push(v as usize, f);
        }
    }

    /// h_max of `fluents` and the first fluent attaining it.
    fn max_over(&self, fluents: &[FluentId]) -> (Cost, Option<FluentId>) {
        let mut best: Option<FluentId> = None;
        let mut cost = 0;
        for &f in fluents {
            if best.is_none() || self.values[f] > cost {
                cost = self.values[f];
                best = Some(f);
            }
        }
        (cost, best)
    }
}

/// LIFO work list of fluents with O(1) membership.
#[derive(Clone, Debug)]
struct FluentStack {
    items: Vec<FluentId>,
    queued: BitVec,
}

impl FluentStack {
    fn new(nodes: usize) -> Self {
        Self { items: Vec::with_capacity(nodes), queued: bitvec![0; nodes] }
    }

    fn push(&mut self, f: FluentId) {
        if !self.queued[f] {
            self.queued.set(f, true);
            self.items.push(f);
        }
    }

    fn pop(&mut self) -> Option<FluentId> {
        let f = self.items.pop()?;
        self.queued.set(f, false);
        Some(f)
    }

    fn clear(&mut self) {
        for f in self.items.drain(..) {
            self.queued.set(f, false);
        }
    }
}

pub struct LmCutHeuristic<'p> {
    problem: &'p StripsProblem,
    task: RelaxedTask,
    policy: CostPolicy,
    table: ValueTable,
    // per trigger
    support: Vec<Cost>,
    max_precondition: Vec<Option<FluentId>>,
    unsatisfied: Vec<usize>,
    // per action, decremented by every cut of the current evaluation
    action_cost: Vec<Cost>,
    goal_zone: BitVec,
    before_goal_zone: BitVec,
    frontier: FluentStack,
    zone_stack: Vec<FluentId>,
    cut: Vec<TriggerId>,
    cut_actions: Vec<ActionId>,
    in_cut: BitVec,
    stats: EvalStats,
}

impl<'p> LmCutHeuristic<'p> {
    /// Relaxed costs are queue keys, so action costs are expected to be small.
    /// Problems from [`ProblemBuilder`](crate::model::ProblemBuilder) cap them
    /// at [`MAX_ACTION_COST`](crate::cost::MAX_ACTION_COST).
    pub fn new(problem: &'p StripsProblem, options: &HeuristicOptions) -> Self {
        let task = RelaxedTask::build(problem);
        let nodes = task.num_nodes();
        let triggers = task.triggers().len();
        let actions = problem.num_actions();
        Self {
            problem,
            policy: options.cost_policy,
            table: ValueTable::new(nodes, options.initial_buckets),
            support: vec![INFINITY; triggers],
            max_precondition: vec![None; triggers],
            unsatisfied: vec![0; triggers],
            action_cost: problem.actions().iter().map(|a| options.cost_policy.apply(a.cost)).collect(),
            goal_zone: bitvec![0; nodes],
            before_goal_zone: bitvec![0; nodes],
            frontier: FluentStack::new(nodes),
            zone_stack: Vec::new(),
            cut: Vec::new(),
            cut_actions: Vec::new(),
            in_cut: bitvec![0; actions],
            stats: EvalStats::default(),
            task,
        }
    }

    pub fn with_policy(problem: &'p StripsProblem, policy: CostPolicy) -> Self {
        Self::new(problem, &HeuristicOptions::with_policy(policy))
    }

    pub fn problem(&self) -> &'p StripsProblem {
        self.problem
    }

    pub fn relaxed_task(&self) -> &RelaxedTask {
        &self.task
    }

    pub fn cost_policy(&self) -> CostPolicy {
        self.policy
    }

    /// LM-Cut value of `state`, or [`INFINITY`] when the goal is unreachable
    /// even with deletes ignored.
    pub fn eval<S: State + ?Sized>(&mut self, state: &S) -> Cost {
        self.initialize(state);
        self.compute_h1();

        let problem = self.problem;
        let goal = problem.goal();
        let (mut goal_cost, mut max_goal) = self.table.max_over(goal);
        if goal_cost == INFINITY {
            debug!("goal unreachable under delete relaxation");
            self.stats = EvalStats { value: INFINITY, cuts: 0, dead_end: true };
            return INFINITY;
        }

        let mut h: Cost = 0;
        let mut cuts = 0;
        while goal_cost != 0 {
            let Some(g) = max_goal else { break };
            self.mark_goal_zone(g);
            self.seed_cut_exploration(state);
            self.compute_cut();

            let cut_cost = self.cut_cost();
            self.charge_cut(cut_cost);
            h = h.saturating_add(cut_cost);
            cuts += 1;
            trace!(round = cuts, size = self.cut.len(), cost = cut_cost, goal_cost, "extracted cut");

            self.compute_incremental_h1();
            self.goal_zone.fill(false);
            self.before_goal_zone.fill(false);
            (goal_cost, max_goal) = self.table.max_over(goal);
        }

        debug!(h, cuts, "lm-cut evaluation");
        self.stats = EvalStats { value: h, cuts, dead_end: false };
        h
    }

    /// Evaluate a materialized list of true fluents.
    pub fn eval_fluents(&mut self, fluents: &[FluentId]) -> Cost {
        self.eval(fluents)
    }

    fn initialize<S: State + ?Sized>(&mut self, state: &S) {
        self.table.reset();
        for (t, trigger) in self.task.triggers().iter().enumerate() {
            self.unsatisfied[t] = trigger.preconditions.len();
            self.max_precondition[t] = None;
            self.support[t] = INFINITY;
        }
        for (a, action) in self.problem.actions().iter().enumerate() {
            self.action_cost[a] = self.policy.apply(action.cost);
        }
        self.goal_zone.fill(false);
        self.before_goal_zone.fill(false);
        self.frontier.clear();

        self.table.seed(self.task.root());
        for f in state.fluents() {
            self.table.seed(f);
        }
    }

    /// Label-correcting h_max from the seeded fluents.
    fn compute_h1(&mut self) {
        while let Some((key, p)) = self.table.queue.pop() {
            let cost = key as Cost;
            if self.table.values[p] < cost {
                continue;
            }
            for &t in self.task.relevant(p) {
                let left = &mut self.unsatisfied[t];
                assert!(*left > 0, "precondition counter underflow on trigger {t}");
                *left -= 1;
                if *left != 0 {
                    continue;
                }
                // p was popped last, so it is the costliest precondition
                self.support[t] = cost;
                self.max_precondition[t] = Some(p);
                let trigger = self.task.trigger(t);
                let v = cost.saturating_add(self.action_cost[trigger.action]);
                let supporter = BestSupporter { action: trigger.action, effect: trigger.effect };
                for &f in &trigger.adds {
                    self.table.update(f, v, supporter);
                }
            }
        }
    }

    /// Backward closure from `g` over zero-cost triggers, following bottlenecks.
    fn mark_goal_zone(&mut self, g: FluentId) {
        self.zone_stack.push(g);
        while let Some(f) = self.zone_stack.pop() {
            if self.goal_zone[f] {
                continue;
            }
            self.goal_zone.set(f, true);
            for &t in self.task.achievers(f) {
                if self.action_cost[self.task.trigger(t).action] != 0 {
                    continue;
                }
                if let Some(p) = self.max_precondition[t] {
                    if !self.goal_zone[p] {
                        self.zone_stack.push(p);
                    }
                }
            }
        }
    }

    fn mark_before_goal_zone(&mut self, f: FluentId) {
        if !self.before_goal_zone[f] {
            self.before_goal_zone.set(f, true);
            self.frontier.push(f);
        }
    }

    fn seed_cut_exploration<S: State + ?Sized>(&mut self, state: &S) {
        self.frontier.clear();
        self.mark_before_goal_zone(self.task.root());
        for f in state.fluents() {
            self.mark_before_goal_zone(f);
        }
    }

    /// Forward search from the state along bottleneck edges, collecting the
    /// triggers that cross into the goal zone.
    fn compute_cut(&mut self) {
        while let Some(p) = self.frontier.pop() {
            for &t in self.task.relevant(p) {
                if self.max_precondition[t] != Some(p) {
                    continue;
                }
                let trigger = self.task.trigger(t);
                if trigger.adds.iter().any(|&f| self.goal_zone[f]) {
                    assert!(
                        self.action_cost[trigger.action] > 0,
                        "zero-cost action {:?} crosses into the goal zone",
                        self.problem.action(trigger.action).name
                    );
                    self.cut.push(t);
                    continue;
                }
                for &f in &trigger.adds {
                    if !self.before_goal_zone[f] {
                        self.before_goal_zone.set(f, true);
                        self.frontier.push(f);
                    }
                }
            }
        }
        assert!(!self.cut.is_empty(), "no cut separates the state from the goal zone");
    }

    fn cut_cost(&self) -> Cost {
        self.cut
            .iter()
            .map(|&t| self.action_cost[self.task.trigger(t).action])
            .min()
            .unwrap_or(INFINITY)
    }

    /// Subtract `cost` once from every action owning a cut trigger.
    fn charge_cut(&mut self, cost: Cost) {
        for &t in &self.cut {
            let a = self.task.trigger(t).action;
            if !self.in_cut[a] {
                self.in_cut.set(a, true);
                self.cut_actions.push(a);
                self.action_cost[a] -= cost;
            }
        }
    }

    /// Re-propagate the cheaper cut actions, touching only fluents whose
    /// value drops.
    fn compute_incremental_h1(&mut self) {
        for &a in &self.cut_actions {
            for t in self.task.triggers_of(a) {
                if self.max_precondition[t].is_none() {
                    continue;
                }
                let trigger = self.task.trigger(t);
                let v = self.support[t].saturating_add(self.action_cost[a]);
                let supporter = BestSupporter { action: a, effect: trigger.effect };
                for &f in &trigger.adds {
                    self.table.update(f, v, supporter);
                }
            }
        }

        while let Some((key, p)) = self.table.queue.pop() {
            let cost = key as Cost;
            if self.table.values[p] < cost {
                continue;
            }
            for &t in self.task.relevant(p) {
                if self.max_precondition[t] != Some(p) {
                    continue;
                }
                let old_support = self.support[t];
                if old_support <= cost {
                    continue;
                }
                let trigger = self.task.trigger(t);
                let (new_support, bottleneck) = self.table.max_over(&trigger.preconditions);
                self.support[t] = new_support;
                self.max_precondition[t] = bottleneck;
                if new_support != old_support {
                    let v = new_support.saturating_add(self.action_cost[trigger.action]);
                    let supporter = BestSupporter { action: trigger.action, effect: trigger.effect };
                    for &f in &trigger.adds {
                        self.table.update(f, v, supporter);
                    }
                }
            }
        }

        for &a in &self.cut_actions {
            self.in_cut.set(a, false);
        }
        self.cut_actions.clear();
        self.cut.clear();
    }

    /// Relaxed value of `f` from the last evaluation.
    pub fn value(&self, f: FluentId) -> Cost {
        self.table.values[f]
    }

    pub fn values(&self) -> &[Cost] {
        &self.table.values[..self.problem.num_fluents()]
    }

    /// h_max of a fluent set under the current value table.
    pub fn max_value(&self, fluents: &[FluentId]) -> Cost {
        self.table.max_over(fluents).0
    }

    /// The costliest member of `fluents` and its value; `None` for an empty set.
    pub fn most_expensive(&self, fluents: &[FluentId]) -> Option<(Cost, FluentId)> {
        let (cost, f) = self.table.max_over(fluents);
        f.map(|f| (cost, f))
    }

    /// Current cost of `a`, after the cuts charged by the last evaluation.
    pub fn action_cost(&self, a: ActionId) -> Cost {
        self.action_cost[a]
    }

    /// Bottleneck precondition of `a`'s unconditional effects, if it fired.
    pub fn max_precondition(&self, a: ActionId) -> Option<FluentId> {
        let t = self.task.triggers_of(a).start;
        self.max_precondition[t].filter(|&p| p != self.task.root())
    }

    pub fn last_stats(&self) -> EvalStats {
        self.stats
    }

    pub fn get_best_supporter(&self, f: FluentId) -> Option<BestSupporter> {
        self.table.supporters.get(f).copied().flatten()
    }

    /// Every action whose trigger reaches `f` at the minimum cost under the
    /// current table. Empty when `f` holds in the state or is unreachable.
    pub fn get_best_supporters(&self, f: FluentId) -> Vec<ActionId> {
        if self.get_best_supporter(f).is_none() {
            return Vec::new();
        }
        let proposals: Vec<(ActionId, Cost)> = self
            .task
            .achievers(f)
            .iter()
            .map(|&t| {
                let trigger = self.task.trigger(t);
                let (support, _) = self.table.max_over(&trigger.preconditions);
                let v = if support == INFINITY {
                    INFINITY
                } else {
                    support.saturating_add(self.action_cost[trigger.action])
                };
                (trigger.action, v)
            })
            .collect();
        let Some(best) = proposals.iter().map(|&(_, v)| v).min() else {
            return Vec::new();
        };
        if best == INFINITY {
            return Vec::new();
        }
        proposals.into_iter().filter(|&(_, v)| v == best).map(|(a, _)| a).unique().collect()
    }

    /// Debug dump, one `h1(<fluent>) = <value>` line per fluent.
    pub fn write_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (f, &v) in self.values().iter().enumerate() {
            let name = self.problem.fluent_name(f).unwrap_or("?");
            writeln!(out, "h1({}) = {}", name, display_cost(v))?;
        }
        Ok(())
    }
}
