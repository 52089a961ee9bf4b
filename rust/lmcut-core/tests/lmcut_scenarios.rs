mod common;

use proptest::prelude::*;

use lmcut_core::{
    Action, BestSupporter, ConditionalEffect, CostPolicy, EvalStats, FluentId, HeuristicOptions, LmCutHeuristic,
    ProblemBuilder, StripsProblem, INFINITY,
};

fn single_action(cost: u32) -> StripsProblem {
    let mut b = ProblemBuilder::new();
    let g = b.fluent("g");
    b.action(Action::new("achieve").with_add([g]).with_cost(cost));
    b.goal([g]);
    b.build().unwrap()
}

#[test]
fn single_action_without_precondition() {
    let problem = single_action(3);
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    let s0 = problem.initial_state();
    assert_eq!(h.eval(&s0), 3);
    assert_eq!(h.last_stats(), EvalStats { value: 3, cuts: 1, dead_end: false });
    let s1 = problem.successor(0, &s0);
    assert_eq!(h.eval(&s1), 0);
    assert_eq!(h.last_stats().cuts, 0);
}

#[test]
fn independent_goals_add_up() {
    let mut b = ProblemBuilder::new();
    let [p, g1, g2] = [b.fluent("p"), b.fluent("g1"), b.fluent("g2")];
    b.action(Action::new("first").with_precondition([p]).with_add([g1]).with_cost(2));
    b.action(Action::new("second").with_precondition([p]).with_add([g2]).with_cost(5));
    b.init([p]).goal([g1, g2]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 7);
    assert_eq!(h.last_stats().cuts, 2);
}

#[test]
fn alternative_achievers_take_the_cheaper() {
    let mut b = ProblemBuilder::new();
    let [p, g] = [b.fluent("p"), b.fluent("g")];
    b.action(Action::new("cheap").with_precondition([p]).with_add([g]).with_cost(4));
    b.action(Action::new("dear").with_precondition([p]).with_add([g]).with_cost(6));
    b.init([p]).goal([g]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 4);
    // one cut {cheap, dear} priced at 4
    assert_eq!(h.action_cost(0), 0);
    assert_eq!(h.action_cost(1), 2);
}

#[test]
fn goal_states_evaluate_to_zero() {
    let problem = single_action(9);
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    let g: [FluentId; 1] = [0];
    assert_eq!(h.eval_fluents(&g), 0);
    assert_eq!(h.value(0), 0);
    assert_eq!(h.get_best_supporter(0), None);
}

#[test]
fn empty_goal_is_always_satisfied() {
    let mut b = ProblemBuilder::new();
    let p = b.fluent("p");
    b.action(Action::new("noop").with_precondition([p]).with_add([p]));
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 0);
}

#[test]
fn unreachable_goal_is_a_dead_end() {
    let mut b = ProblemBuilder::new();
    let [p, q, g] = [b.fluent("p"), b.fluent("q"), b.fluent("g")];
    b.action(Action::new("needs_q").with_precondition([q]).with_add([g]));
    b.action(Action::new("loop").with_precondition([p]).with_add([p]));
    b.init([p]).goal([g]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), INFINITY);
    assert!(h.last_stats().dead_end);
    assert_eq!(h.value(g), INFINITY);
    assert!(h.get_best_supporters(g).is_empty());
    // recovers on the next state
    let with_q: [FluentId; 2] = [p, q];
    assert_eq!(h.eval_fluents(&with_q), 1);
    assert!(!h.last_stats().dead_end);
}

#[test]
fn zero_cost_achiever_extends_the_goal_zone() {
    // pay 3 to reach q, then a free step reaches the goal
    let mut b = ProblemBuilder::new();
    let [p, q, g] = [b.fluent("p"), b.fluent("q"), b.fluent("g")];
    b.action(Action::new("pay").with_precondition([p]).with_add([q]).with_cost(3));
    b.action(Action::new("free").with_precondition([q]).with_add([g]).with_cost(0));
    b.init([p]).goal([g]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 3);
    assert_eq!(h.last_stats().cuts, 1);
}

#[test]
fn zero_cost_cycles_do_not_enter_the_cut() {
    let mut b = ProblemBuilder::new();
    let [p, x, y] = [b.fluent("p"), b.fluent("x"), b.fluent("y")];
    b.action(Action::new("x_to_y").with_precondition([x]).with_add([y]).with_cost(0));
    b.action(Action::new("y_to_x").with_precondition([y]).with_add([x]).with_cost(0));
    b.action(Action::new("enter").with_precondition([p]).with_add([x]).with_cost(2));
    b.init([p]).goal([y]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 2);
}

#[test]
fn all_free_actions_give_zero() {
    let mut b = ProblemBuilder::new();
    let [p, q, g] = [b.fluent("p"), b.fluent("q"), b.fluent("g")];
    b.action(Action::new("a").with_precondition([p]).with_add([q]).with_cost(0));
    b.action(Action::new("b").with_precondition([q]).with_add([g]).with_cost(0));
    b.init([p]).goal([g]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 0);
    assert_eq!(LmCutHeuristic::with_policy(&problem, CostPolicy::CostPlusOne).eval(&problem.initial_state()), 2);
}

#[test]
fn shared_action_is_charged_once_per_cut() {
    // `both` adds both goals; one cut of cost 4 covers it
    let mut b = ProblemBuilder::new();
    let [g1, g2] = [b.fluent("g1"), b.fluent("g2")];
    b.action(Action::new("both").with_add([g1, g2]).with_cost(4));
    b.goal([g1, g2]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 4);
}

#[test]
fn conditional_effects_need_their_condition() {
    let mut b = ProblemBuilder::new();
    let [p, c, g] = [b.fluent("p"), b.fluent("c"), b.fluent("g")];
    b.action(
        Action::new("fire")
            .with_precondition([p])
            .with_conditional_effect(ConditionalEffect::new([c], [g]))
            .with_cost(2),
    );
    b.init([p]).goal([g]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), INFINITY);
    let with_c: [FluentId; 2] = [p, c];
    assert_eq!(h.eval_fluents(&with_c), 2);
    assert_eq!(h.get_best_supporter(g), Some(BestSupporter { action: 0, effect: Some(0) }));
}

#[test]
fn conditional_and_unconditional_triggers_share_one_cost() {
    // both triggers of `fire` sit in the same cut, so it pays once
    let mut b = ProblemBuilder::new();
    let [g1, g2, c] = [b.fluent("g1"), b.fluent("g2"), b.fluent("c")];
    b.action(Action::new("fire").with_add([g1]).with_conditional_effect(ConditionalEffect::new([c], [g2])).with_cost(3));
    b.init([c]).goal([g1, g2]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
    assert_eq!(h.eval(&problem.initial_state()), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn fresh_instances_agree(problem in common::small_problem()) {
        let states = common::reachable_states(&problem, &problem.initial_state());
        let mut first = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
        let mut second = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
        for s in states.iter().rev() {
            prop_assert_eq!(first.eval(s), second.eval(s));
            prop_assert_eq!(first.values(), second.values());
            for f in 0..problem.num_fluents() {
                prop_assert_eq!(first.get_best_supporter(f), second.get_best_supporter(f));
                prop_assert_eq!(first.get_best_supporters(f), second.get_best_supporters(f));
            }
        }
    }

    #[test]
    fn reevaluation_is_independent_of_history(problem in common::small_problem()) {
        let states = common::reachable_states(&problem, &problem.initial_state());
        let mut warm = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
        for s in &states {
            warm.eval(s);
        }
        for s in &states {
            let mut cold = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
            prop_assert_eq!(warm.eval(s), cold.eval(s), "state {:?}", s);
        }
    }

    #[test]
    fn slices_and_sets_evaluate_alike(problem in common::small_problem()) {
        let mut h = LmCutHeuristic::new(&problem, &HeuristicOptions::default());
        for s in common::reachable_states(&problem, &problem.initial_state()) {
            let fluents = common::true_fluents(&s);
            prop_assert_eq!(h.eval(&s), h.eval_fluents(&fluents));
        }
    }
}

#[test]
fn small_initial_bucket_count_grows() {
    let problem = single_action(250);
    let options = HeuristicOptions { initial_buckets: 1, ..HeuristicOptions::default() };
    let mut h = LmCutHeuristic::new(&problem, &options);
    assert_eq!(h.eval(&problem.initial_state()), 250);
}

#[test]
fn value_queries_follow_the_last_evaluation() {
    let mut b = ProblemBuilder::new();
    let [p, g1, g2] = [b.fluent("p"), b.fluent("g1"), b.fluent("g2")];
    b.action(Action::new("first").with_precondition([p]).with_add([g1]).with_cost(2));
    b.action(Action::new("second").with_precondition([p]).with_add([g2]).with_cost(5));
    b.init([p]).goal([g1, g2]);
    let problem = b.build().unwrap();
    let mut h = LmCutHeuristic::with_policy(&problem, CostPolicy::Ignore);
    assert_eq!(h.cost_policy(), CostPolicy::Ignore);
    assert_eq!(h.problem().num_actions(), 2);
    assert_eq!(h.relaxed_task().triggers().len(), 2);
    assert_eq!(h.max_precondition(0), None);

    let only_p: [FluentId; 1] = [p];
    // unit costs: each goal is one cut of cost 1
    assert_eq!(h.eval_fluents(&only_p), 2);
    assert_eq!(h.values(), &[0, 0, 0]);
    assert_eq!(h.max_precondition(0), Some(p));
    assert_eq!(h.most_expensive(&[]), None);
    assert_eq!(h.max_value(&[]), 0);

    let with_g1: [FluentId; 2] = [p, g1];
    assert_eq!(h.eval_fluents(&with_g1), 1);
    assert_eq!(h.max_value(&[g1, g2]), 0);
    assert_eq!(h.most_expensive(&[g2, g1]), Some((0, g2)));
}
