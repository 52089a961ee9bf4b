#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::ops::RangeInclusive;

use proptest::prelude::*;

use lmcut_core::{Action, ConditionalEffect, CostPolicy, FluentId, FluentSet, ProblemBuilder, State, StripsProblem};

/// Cheapest real (delete-aware) plan cost from `start`, or `None` if the goal is unreachable.
pub fn optimal_cost(problem: &StripsProblem, start: &FluentSet, policy: CostPolicy) -> Option<u64> {
    let mut dist: HashMap<FluentSet, u64> = HashMap::new();
    let mut open = BinaryHeap::new();
    let mut ids: Vec<FluentSet> = Vec::new();
    dist.insert(start.clone(), 0);
    ids.push(start.clone());
    open.push(Reverse((0u64, 0usize)));
    while let Some(Reverse((g, id))) = open.pop() {
        let s = ids[id].clone();
        if dist.get(&s).is_some_and(|&d| d < g) {
            continue;
        }
        if problem.is_goal(&s) {
            return Some(g);
        }
        for a in 0..problem.num_actions() {
            if !problem.is_applicable(a, &s) {
                continue;
            }
            let next = problem.successor(a, &s);
            let ng = g + policy.apply(problem.action(a).cost) as u64;
            if dist.get(&next).map(|&d| ng < d).unwrap_or(true) {
                dist.insert(next.clone(), ng);
                ids.push(next);
                open.push(Reverse((ng, ids.len() - 1)));
            }
        }
    }
    None
}

/// Every state reachable from `start`, in breadth-first order.
pub fn reachable_states(problem: &StripsProblem, start: &FluentSet) -> Vec<FluentSet> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start.clone()]);
    seen.insert(start.clone());
    while let Some(s) = queue.pop_front() {
        for a in 0..problem.num_actions() {
            if problem.is_applicable(a, &s) {
                let next = problem.successor(a, &s);
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        order.push(s);
    }
    order
}

const FLUENTS: usize = 6;

fn fluents(len: RangeInclusive<usize>) -> impl Strategy<Value = Vec<FluentId>> {
    prop::collection::vec(0..FLUENTS, len)
}

fn action(index: usize) -> impl Strategy<Value = Action> {
    let effect = prop::option::weighted(0.3, (fluents(1..=2), fluents(1..=1)));
    (fluents(0..=2), fluents(1..=2), fluents(0..=1), 0u32..4, effect).prop_map(
        move |(pre, add, del, cost, effect)| {
            let mut action =
                Action::new(format!("a{index}")).with_precondition(pre).with_add(add).with_delete(del).with_cost(cost);
            if let Some((condition, add)) = effect {
                action = action.with_conditional_effect(ConditionalEffect::new(condition, add));
            }
            action
        },
    )
}

/// Small STRIPS problems with deletes, zero-cost actions and conditional effects.
pub fn small_problem() -> impl Strategy<Value = StripsProblem> {
    let actions: Vec<_> = (0..8).map(action).collect();
    (actions, fluents(0..=2), fluents(1..=2)).prop_map(|(actions, init, goal)| {
        let mut b = ProblemBuilder::new();
        for i in 0..FLUENTS {
            b.fluent(format!("f{i}"));
        }
        for a in actions {
            b.action(a);
        }
        b.init(init).goal(goal);
        b.build().expect("generated problem is well formed")
    })
}

pub fn true_fluents(state: &FluentSet) -> Vec<FluentId> {
    state.fluents().collect()
}
