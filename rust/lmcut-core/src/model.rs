//! STRIPS problem description consumed read-only by the heuristic engine.
//!
//! Fluents and actions are dense indices. Fluent lists are kept sorted and
//! free of duplicates once a problem has been built.

use std::fmt;

use indexmap::IndexSet;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cost::{Cost, MAX_ACTION_COST};
use crate::errors::ModelError;
use crate::state::{FluentSet, State};

pub type FluentId = usize;
pub type ActionId = usize;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionalEffect {
    pub condition: Vec<FluentId>,
    pub add: Vec<FluentId>,
    pub delete: Vec<FluentId>,
}

impl ConditionalEffect {
    pub fn new(condition: impl IntoIterator<Item = FluentId>, add: impl IntoIterator<Item = FluentId>) -> Self {
        Self { condition: condition.into_iter().collect(), add: add.into_iter().collect(), delete: Vec::new() }
    }

    pub fn with_delete(mut self, delete: impl IntoIterator<Item = FluentId>) -> Self {
        self.delete.extend(delete);
        self
    }

    pub fn asserts(&self, f: FluentId) -> bool {
        self.add.binary_search(&f).is_ok()
    }

    fn normalize(&mut self) {
        sort_dedup(&mut self.condition);
        sort_dedup(&mut self.add);
        sort_dedup(&mut self.delete);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub precondition: Vec<FluentId>,
    pub add: Vec<FluentId>,
    pub delete: Vec<FluentId>,
    pub conditional_effects: Vec<ConditionalEffect>,
    /// Declared cost, before any cost policy is applied.
    pub cost: Cost,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precondition: Vec::new(),
            add: Vec::new(),
            delete: Vec::new(),
            conditional_effects: Vec::new(),
            cost: 1,
        }
    }

    pub fn with_precondition(mut self, fluents: impl IntoIterator<Item = FluentId>) -> Self {
        self.precondition.extend(fluents);
        self
    }

    pub fn with_add(mut self, fluents: impl IntoIterator<Item = FluentId>) -> Self {
        self.add.extend(fluents);
        self
    }

    pub fn with_delete(mut self, fluents: impl IntoIterator<Item = FluentId>) -> Self {
        self.delete.extend(fluents);
        self
    }

    pub fn with_conditional_effect(mut self, effect: ConditionalEffect) -> Self {
        self.conditional_effects.push(effect);
        self
    }

    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = cost;
        self
    }

    /// True when `f` is an unconditional add effect.
    pub fn asserts(&self, f: FluentId) -> bool {
        self.add.binary_search(&f).is_ok()
    }

    /// True when `f` is added unconditionally or by some conditional effect.
    pub fn achieves(&self, f: FluentId) -> bool {
        self.asserts(f) || self.conditional_effects.iter().any(|e| e.asserts(f))
    }

    fn normalize(&mut self) {
        sort_dedup(&mut self.precondition);
        sort_dedup(&mut self.add);
        sort_dedup(&mut self.delete);
        for e in &mut self.conditional_effects {
            e.normalize();
        }
    }

    fn referenced_fluents(&self) -> impl Iterator<Item = FluentId> + '_ {
        self.precondition
            .iter()
            .chain(&self.add)
            .chain(&self.delete)
            .chain(self.conditional_effects.iter().flat_map(|e| e.condition.iter().chain(&e.add).chain(&e.delete)))
            .copied()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pre=[{}] add=[{}] del=[{}] cost={}",
            self.name,
            self.precondition.iter().join(","),
            self.add.iter().join(","),
            self.delete.iter().join(","),
            self.cost
        )?;
        for e in &self.conditional_effects {
            write!(f, " when [{}] add=[{}]", e.condition.iter().join(","), e.add.iter().join(","))?;
        }
        Ok(())
    }
}

fn sort_dedup(v: &mut Vec<FluentId>) {
    v.sort_unstable();
    v.dedup();
}

#[derive(Clone, Debug)]
pub struct StripsProblem {
    fluents: IndexSet<String>,
    actions: Vec<Action>,
    init: Vec<FluentId>,
    goal: Vec<FluentId>,
    empty_precondition: Vec<ActionId>,
    achievers: Vec<Vec<ActionId>>,
    action_index: FxHashMap<String, ActionId>,
}

impl StripsProblem {
    pub fn num_fluents(&self) -> usize {
        self.fluents.len()
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn fluent_name(&self, f: FluentId) -> Option<&str> {
        self.fluents.get_index(f).map(String::as_str)
    }

    pub fn fluent_index(&self, name: &str) -> Option<FluentId> {
        self.fluents.get_index_of(name)
    }

    pub fn action_index(&self, name: &str) -> Option<ActionId> {
        self.action_index.get(name).copied()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, a: ActionId) -> &Action {
        &self.actions[a]
    }

    pub fn init(&self) -> &[FluentId] {
        &self.init
    }

    pub fn goal(&self) -> &[FluentId] {
        &self.goal
    }

    pub fn empty_precondition_actions(&self) -> &[ActionId] {
        &self.empty_precondition
    }

    /// Actions adding `f`, unconditionally or through a conditional effect.
    pub fn actions_adding(&self, f: FluentId) -> &[ActionId] {
        &self.achievers[f]
    }

    pub fn initial_state(&self) -> FluentSet {
        FluentSet::from_fluents(self.num_fluents(), self.init.iter().copied())
    }

    pub fn is_goal<S: State + ?Sized>(&self, state: &S) -> bool {
        self.goal.iter().all(|&g| state.contains(g))
    }

    pub fn is_applicable<S: State + ?Sized>(&self, a: ActionId, state: &S) -> bool {
        self.actions[a].precondition.iter().all(|&p| state.contains(p))
    }

    /// Applies `a` to `state`. Conditions are evaluated on `state`, deletes
    /// are applied before adds.
    pub fn successor(&self, a: ActionId, state: &FluentSet) -> FluentSet {
        let action = &self.actions[a];
        let fired: Vec<&ConditionalEffect> = action
            .conditional_effects
            .iter()
            .filter(|e| e.condition.iter().all(|&c| state.contains(c)))
            .collect();
        let mut next = state.clone();
        for &d in action.delete.iter().chain(fired.iter().flat_map(|e| e.delete.iter())) {
            next.remove(d);
        }
        for &p in action.add.iter().chain(fired.iter().flat_map(|e| e.add.iter())) {
            next.insert(p);
        }
        next
    }
}

#[derive(Debug, Default)]
pub struct ProblemBuilder {
    fluents: IndexSet<String>,
    actions: Vec<Action>,
    init: Vec<FluentId>,
    goal: Vec<FluentId>,
}

impl ProblemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name`, returning the index it already had if any.
    pub fn fluent(&mut self, name: impl Into<String>) -> FluentId {
        self.fluents.insert_full(name.into()).0
    }

    pub fn fluents<I, S>(&mut self, names: I) -> Vec<FluentId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(|n| self.fluent(n)).collect()
    }

    pub fn action(&mut self, action: Action) -> ActionId {
        self.actions.push(action);
        self.actions.len() - 1
    }

    pub fn init(&mut self, fluents: impl IntoIterator<Item = FluentId>) -> &mut Self {
        self.init.extend(fluents);
        self
    }

    pub fn goal(&mut self, fluents: impl IntoIterator<Item = FluentId>) -> &mut Self {
        self.goal.extend(fluents);
        self
    }

    pub fn build(self) -> Result<StripsProblem, ModelError> {
        let ProblemBuilder { fluents, mut actions, mut init, mut goal } = self;
        let n = fluents.len();
        let check = |context: &dyn Fn() -> String, f: FluentId| {
            if f < n {
                Ok(())
            } else {
                Err(ModelError::UnknownFluent { context: context(), fluent: f, num_fluents: n })
            }
        };
        for &f in &init {
            check(&|| "initial state".to_string(), f)?;
        }
        for &f in &goal {
            check(&|| "goal".to_string(), f)?;
        }
        let mut action_index = FxHashMap::default();
        for (i, a) in actions.iter_mut().enumerate() {
            for f in a.referenced_fluents() {
                check(&|| format!("action {:?}", a.name), f)?;
            }
            if a.cost > MAX_ACTION_COST {
                return Err(ModelError::CostTooLarge { action: a.name.clone(), cost: a.cost, max: MAX_ACTION_COST });
            }
            if action_index.insert(a.name.clone(), i).is_some() {
                return Err(ModelError::DuplicateAction(a.name.clone()));
            }
            a.normalize();
        }
        sort_dedup(&mut init);
        sort_dedup(&mut goal);

        let mut achievers = vec![Vec::new(); n];
        let mut empty_precondition = Vec::new();
        for (i, a) in actions.iter().enumerate() {
            if a.precondition.is_empty() {
                empty_precondition.push(i);
            }
            let added = a.add.iter().chain(a.conditional_effects.iter().flat_map(|e| e.add.iter()));
            for &f in added.unique() {
                achievers[f].push(i);
            }
        }
        debug!(fluents = n, actions = actions.len(), goal = goal.len(), "built STRIPS problem");
        Ok(StripsProblem { fluents, actions, init, goal, empty_precondition, achievers, action_index })
    }
}
