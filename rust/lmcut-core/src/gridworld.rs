//! Grid navigation instances: an agent moves between 4-connected cells and
//! must visit a set of goal cells. Every move costs 1.
//!
//! Fluents are `at_x_y`, `visited_x_y` and the static `connected_x0_y0_x1_y1`.

use rustc_hash::FxHashSet;

use crate::errors::ModelError;
use crate::model::{Action, FluentId, ProblemBuilder, StripsProblem};
use crate::state::FluentSet;

pub type Cell = (usize, usize);

#[derive(Clone, Debug, Default)]
pub struct GridWorld {
    pub width: usize,
    pub height: usize,
    walls: FxHashSet<Cell>,
}

impl GridWorld {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, walls: FxHashSet::default() }
    }

    pub fn with_wall(mut self, cell: Cell) -> Self {
        self.walls.insert(cell);
        self
    }

    pub fn with_walls(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.walls.extend(cells);
        self
    }

    pub fn is_open(&self, (x, y): Cell) -> bool {
        x < self.width && y < self.height && !self.walls.contains(&(x, y))
    }

    fn neighbors(&self, (x, y): Cell) -> impl Iterator<Item = Cell> + '_ {
        let left = x.checked_sub(1).map(|x0| (x0, y));
        let down = y.checked_sub(1).map(|y0| (x, y0));
        [left, Some((x + 1, y)), down, Some((x, y + 1))].into_iter().flatten().filter(|&c| self.is_open(c))
    }

    fn check(&self, what: &str, cell: Cell) -> Result<(), ModelError> {
        if self.is_open(cell) {
            Ok(())
        } else {
            Err(ModelError::InvalidInstance(format!(
                "{what} cell {cell:?} is outside the {}x{} grid or on a wall",
                self.width, self.height
            )))
        }
    }

    pub fn problem(&self, start: Cell, goals: &[Cell]) -> Result<StripsProblem, ModelError> {
        self.check("start", start)?;
        for &g in goals {
            self.check("goal", g)?;
        }
        let mut b = ProblemBuilder::new();
        let cells: Vec<Cell> =
            (0..self.width).flat_map(|x| (0..self.height).map(move |y| (x, y))).filter(|&c| self.is_open(c)).collect();
        for &(x, y) in &cells {
            b.fluent(at(x, y));
            b.fluent(visited(x, y));
        }
        let mut statics = Vec::new();
        for &from in &cells {
            for to in self.neighbors(from) {
                let link = b.fluent(connected(from, to));
                statics.push(link);
                let at_from = b.fluent(at(from.0, from.1));
                let at_to = b.fluent(at(to.0, to.1));
                let visited_to = b.fluent(visited(to.0, to.1));
                b.action(
                    Action::new(format!("move_{}_{}_{}_{}", from.0, from.1, to.0, to.1))
                        .with_precondition([at_from, link])
                        .with_add([at_to, visited_to])
                        .with_delete([at_from])
                        .with_cost(1),
                );
            }
        }
        let at_start = b.fluent(at(start.0, start.1));
        let visited_start = b.fluent(visited(start.0, start.1));
        b.init(statics).init([at_start, visited_start]);
        let goal: Vec<FluentId> = goals.iter().map(|&(x, y)| b.fluent(visited(x, y))).collect();
        b.goal(goal);
        b.build()
    }

    /// State with the agent at `cell`, `visited` cells marked and all links in place.
    pub fn state_at(&self, problem: &StripsProblem, cell: Cell, visited_cells: &[Cell]) -> Result<FluentSet, ModelError> {
        let lookup = |name: String| {
            problem.fluent_index(&name).ok_or_else(|| ModelError::InvalidInstance(format!("no fluent {name}")))
        };
        let mut state = FluentSet::new(problem.num_fluents());
        for f in 0..problem.num_fluents() {
            if problem.fluent_name(f).is_some_and(|n| n.starts_with("connected_")) {
                state.insert(f);
            }
        }
        state.insert(lookup(at(cell.0, cell.1))?);
        state.insert(lookup(visited(cell.0, cell.1))?);
        for &(x, y) in visited_cells {
            state.insert(lookup(visited(x, y))?);
        }
        Ok(state)
    }
}

pub fn at(x: usize, y: usize) -> String {
    format!("at_{x}_{y}")
}

pub fn visited(x: usize, y: usize) -> String {
    format!("visited_{x}_{y}")
}

pub fn connected(from: Cell, to: Cell) -> String {
    format!("connected_{}_{}_{}_{}", from.0, from.1, to.0, to.1)
}

/// Parses `x,y`.
pub fn parse_cell(s: &str) -> Option<Cell> {
    let (x, y) = s.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
