//! Exact tour solver based on Little's branch-and-bound.
//!
//! A fleet of `k` vehicles leaving the same origin is handled by adding
//! `k - 1` copies of the origin to the matrix and solving a single closed
//! tour, which is then cut at every origin copy.
//!
//! The search walks the tree depth first from an explicit worklist, so deep
//! trees never touch the call stack. With [`SolveOptions::parallel`] the top
//! of the tree is expanded into a frontier whose subtrees are searched on the
//! rayon thread pool, all sharing one incumbent record.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Axis, SolveError, SolveResult};
use crate::matrix::{DistanceMatrix, FORBIDDEN};
use crate::reduction::CostMatrix;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Number of vehicles leaving the origin. Every vehicle gets at least
    /// one vertex.
    pub fleet_count: usize,
    /// Vertex every tour starts and ends at.
    pub origin: usize,
    /// Stop after exploring this many search nodes.
    pub max_nodes: Option<usize>,
    /// Stop once this much wall time has passed.
    pub time_limit: Option<Duration>,
    /// Search independent subtrees on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            fleet_count: 1,
            origin: 0,
            max_nodes: None,
            time_limit: None,
            parallel: false,
        }
    }
}

/// One closed tour, as vertex indices of the input matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tour {
    /// Starts and ends at the origin.
    pub vertices: Vec<usize>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub tours: Vec<Tour>,
    /// Total cost of all tours.
    pub record: f64,
    /// `false` when a budget ran out and the tours may not be optimal.
    pub complete: bool,
    pub nodes_explored: usize,
}

/// Finds the cheapest set of `fleet_count` closed tours from `origin` that
/// together visit every vertex exactly once.
pub fn solve(matrix: &DistanceMatrix, options: SolveOptions) -> SolveResult<Solution> {
    validate(matrix, &options)?;

    let n = matrix.size();
    let origin = options.origin;
    if n == 1 {
        return Ok(Solution {
            tours: vec![Tour {
                vertices: vec![origin, origin],
                cost: 0.0,
            }],
            record: 0.0,
            complete: true,
            nodes_explored: 0,
        });
    }

    let augmented = augment(matrix, origin, options.fleet_count);
    let root = CostMatrix::from_distances(&augmented);
    check_reachable(&root, n, origin)?;

    info!(
        vertices = n,
        fleet = options.fleet_count,
        parallel = options.parallel,
        "starting branch-and-bound search"
    );

    let search = Search::new(&augmented, &options);
    let root = Node::root(root);
    if options.parallel {
        search.run_parallel(root);
    } else {
        search.run(root, &[]);
    }

    let nodes_explored = search.nodes_explored();
    let complete = !search.exhausted.load(Ordering::Acquire);
    if !complete {
        warn!(nodes = nodes_explored, "search budget exhausted");
    }

    let Some(best) = search.into_best() else {
        return Err(if complete {
            SolveError::NoFeasibleTour
        } else {
            SolveError::BudgetExhausted { nodes: nodes_explored }
        });
    };

    let tours: Vec<Tour> = split_tours(&best.successors, n, origin)
        .into_iter()
        .map(|vertices| Tour {
            cost: matrix.path_cost(&vertices),
            vertices,
        })
        .collect();
    let record: f64 = tours.iter().map(|tour| tour.cost).sum();

    info!(record, tours = tours.len(), nodes = nodes_explored, complete, "search finished");

    Ok(Solution {
        tours,
        record,
        complete,
        nodes_explored,
    })
}

fn validate(matrix: &DistanceMatrix, options: &SolveOptions) -> SolveResult<()> {
    let n = matrix.size();
    if n == 0 {
        return Err(SolveError::EmptyMatrix);
    }
    if options.origin >= n {
        return Err(SolveError::InvalidOrigin {
            origin: options.origin,
            size: n,
        });
    }
    for row in 0..n {
        for (col, &value) in matrix.row(row).iter().enumerate() {
            if row != col && (value.is_nan() || value < 0.0) {
                return Err(SolveError::InvalidEntry { row, col, value });
            }
        }
    }
    let customers = n - 1;
    if options.fleet_count == 0 || options.fleet_count > customers.max(1) {
        return Err(SolveError::InvalidFleet {
            fleet: options.fleet_count,
            customers,
        });
    }
    Ok(())
}

fn check_reachable(matrix: &CostMatrix, n: usize, origin: usize) -> SolveResult<()> {
    let vertex = |augmented: usize| if augmented >= n { origin } else { augmented };

    if let Some(row) = matrix.forbidden_row() {
        return Err(SolveError::Infeasible {
            vertex: vertex(matrix.row_vertex(row)),
            axis: Axis::Row,
        });
    }
    if let Some(col) = matrix.forbidden_col() {
        return Err(SolveError::Infeasible {
            vertex: vertex(matrix.col_vertex(col)),
            axis: Axis::Column,
        });
    }
    Ok(())
}

// ============================================================================
// Fleet augmentation
// ============================================================================

/// Adds `fleet - 1` copies of the origin after the last vertex.
///
/// A copy costs what the origin costs, except that the origin and its
/// copies can never follow one another, so no vehicle runs an empty tour.
fn augment(matrix: &DistanceMatrix, origin: usize, fleet: usize) -> DistanceMatrix {
    let n = matrix.size();
    let size = n + fleet - 1;
    let mut augmented = DistanceMatrix::new(size);

    for i in 0..size {
        for j in 0..size {
            let distance = match (i < n, j < n) {
                (true, true) => matrix.get(i, j),
                (true, false) if i != origin => matrix.get(i, origin),
                (false, true) if j != origin => matrix.get(origin, j),
                _ => FORBIDDEN,
            };
            augmented.set(i, j, distance);
        }
    }

    augmented
}

/// Cuts the closed augmented tour at the origin and its copies.
fn split_tours(successors: &[usize], n: usize, origin: usize) -> Vec<Vec<usize>> {
    let mut tours = Vec::new();
    let mut current = vec![origin];
    let mut vertex = successors[origin];

    for _ in 0..successors.len() {
        if vertex == origin || vertex >= n {
            current.push(origin);
            tours.push(std::mem::replace(&mut current, vec![origin]));
            if vertex == origin {
                break;
            }
        } else {
            current.push(vertex);
        }
        vertex = successors[vertex];
    }

    tours
}

// ============================================================================
// Search tree
// ============================================================================

/// Fixed edges of a partial tour, as vertex chains.
#[derive(Debug, Clone)]
struct Chains {
    succ: Vec<Option<usize>>,
    pred: Vec<Option<usize>>,
}

impl Chains {
    fn new(size: usize) -> Self {
        Self {
            succ: vec![None; size],
            pred: vec![None; size],
        }
    }

    fn link(&self, from: usize, to: usize) -> Self {
        let mut chains = self.clone();
        chains.succ[from] = Some(to);
        chains.pred[to] = Some(from);
        chains
    }

    /// First vertex of the chain containing `vertex`.
    fn head(&self, mut vertex: usize) -> usize {
        while let Some(prev) = self.pred[vertex] {
            vertex = prev;
        }
        vertex
    }

    /// Last vertex of the chain containing `vertex`.
    fn tail(&self, mut vertex: usize) -> usize {
        while let Some(next) = self.succ[vertex] {
            vertex = next;
        }
        vertex
    }
}

#[derive(Debug, Clone)]
struct Node {
    matrix: CostMatrix,
    bound: f64,
    chains: Chains,
}

impl Node {
    fn root(matrix: CostMatrix) -> Self {
        let chains = Chains::new(matrix.size());
        Self {
            matrix,
            bound: 0.0,
            chains,
        }
    }
}

/// Splits a reduced node on the cell `(i, j)` into the child that takes
/// the edge and the child that forbids it.
///
/// Taking the edge deletes row `i` and column `j` and forbids the edge that
/// would close the grown chain into a premature cycle.
fn branch(reduced: CostMatrix, bound: f64, chains: Chains, i: usize, j: usize) -> (Node, Node) {
    let (from, to) = (reduced.row_vertex(i), reduced.col_vertex(j));

    let linked = chains.link(from, to);
    let (head, tail) = (linked.head(from), linked.tail(to));
    let mut included = reduced.without(i, j);
    if let (Some(row), Some(col)) = (included.row_of(tail), included.col_of(head)) {
        included.forbid(row, col);
    }

    let mut excluded = reduced;
    excluded.forbid(i, j);

    (
        Node {
            matrix: included,
            bound,
            chains: linked,
        },
        Node {
            matrix: excluded,
            bound,
            chains,
        },
    )
}

fn is_single_cycle(successors: &[usize]) -> bool {
    let mut vertex = 0;
    for step in 1..=successors.len() {
        vertex = successors[vertex];
        if vertex == 0 {
            return step == successors.len();
        }
    }
    false
}

// ============================================================================
// Search state
// ============================================================================

/// Branch choices from the root, `false` for include. Paths compare in
/// depth-first order.
type Path = [bool];

#[derive(Debug)]
struct Incumbent {
    cost: f64,
    path: Vec<bool>,
    successors: Vec<usize>,
}

struct Search<'a> {
    costs: &'a DistanceMatrix,
    record: AtomicU64,
    best: Mutex<Option<Incumbent>>,
    nodes: AtomicUsize,
    exhausted: AtomicBool,
    max_nodes: Option<usize>,
    deadline: Option<Instant>,
}

impl<'a> Search<'a> {
    fn new(costs: &'a DistanceMatrix, options: &SolveOptions) -> Self {
        Self {
            costs,
            record: AtomicU64::new(FORBIDDEN.to_bits()),
            best: Mutex::new(None),
            nodes: AtomicUsize::new(0),
            exhausted: AtomicBool::new(false),
            max_nodes: options.max_nodes,
            deadline: options
                .time_limit
                .and_then(|limit| Instant::now().checked_add(limit)),
        }
    }

    fn record(&self) -> f64 {
        f64::from_bits(self.record.load(Ordering::Acquire))
    }

    fn nodes_explored(&self) -> usize {
        self.nodes.load(Ordering::Acquire)
    }

    fn into_best(self) -> Option<Incumbent> {
        self.best
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts one node against the budget. Returns `false` once it is spent.
    fn tick(&self) -> bool {
        if self.exhausted.load(Ordering::Acquire) {
            return false;
        }
        let explored = self.nodes.fetch_add(1, Ordering::AcqRel);
        let out_of_nodes = self.max_nodes.is_some_and(|max| explored >= max);
        let out_of_time = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if out_of_nodes || out_of_time {
            self.nodes.fetch_sub(1, Ordering::AcqRel);
            self.exhausted.store(true, Ordering::Release);
            return false;
        }
        true
    }

    /// Offers a complete tour. Equal costs are settled by depth-first order
    /// so parallel runs pick the same tour as sequential ones.
    fn offer(&self, successors: Vec<usize>, path: &Path) {
        let cost: f64 = successors
            .iter()
            .enumerate()
            .map(|(from, &to)| self.costs.get(from, to))
            .sum();
        if cost > self.record() {
            return;
        }

        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        let improves = best.as_ref().is_none_or(|incumbent| {
            cost < incumbent.cost || (cost == incumbent.cost && path < incumbent.path.as_slice())
        });
        if improves {
            debug!(cost, "new incumbent tour");
            self.record.store(cost.to_bits(), Ordering::Release);
            *best = Some(Incumbent {
                cost,
                path: path.to_vec(),
                successors,
            });
        }
    }

    /// Processes one node and returns its include and exclude children.
    fn step(&self, node: Node, path: &Path) -> Option<(Node, Node)> {
        if !self.tick() {
            return None;
        }

        if node.matrix.size() == 2 {
            self.complete(&node, path);
            return None;
        }

        let (increase, reduced) = node.matrix.reduce();
        let bound = node.bound + increase;
        if bound == FORBIDDEN || bound > self.record() {
            return None;
        }

        let (i, j) = reduced.select_branch_edge()?;
        Some(branch(reduced, bound, node.chains, i, j))
    }

    /// Tries both ways of closing a 2×2 node.
    fn complete(&self, node: &Node, path: &Path) {
        let matrix = &node.matrix;
        for pairing in [[(0, 0), (1, 1)], [(0, 1), (1, 0)]] {
            if pairing.iter().any(|&(i, j)| matrix.get(i, j) == FORBIDDEN) {
                continue;
            }

            let mut succ = node.chains.succ.clone();
            for (i, j) in pairing {
                succ[matrix.row_vertex(i)] = Some(matrix.col_vertex(j));
            }
            let Some(successors) = succ.into_iter().collect::<Option<Vec<usize>>>() else {
                continue;
            };
            if is_single_cycle(&successors) {
                self.offer(successors, path);
            }
        }
    }

    /// Depth-first search of one subtree.
    fn run(&self, root: Node, path: &Path) {
        let mut worklist = vec![root];
        while let Some(node) = worklist.pop() {
            if self.exhausted.load(Ordering::Acquire) {
                break;
            }
            if let Some((included, excluded)) = self.step(node, path) {
                worklist.push(excluded);
                worklist.push(included);
            }
        }
    }

    fn run_parallel(&self, root: Node) {
        let width = rayon::current_num_threads() * 4;
        let mut frontier = vec![(Vec::new(), root)];

        while !frontier.is_empty() && frontier.len() < width {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            for (path, node) in frontier {
                if let Some((included, excluded)) = self.step(node, &path) {
                    let mut left = path.clone();
                    left.push(false);
                    let mut right = path;
                    right.push(true);
                    next.push((left, included));
                    next.push((right, excluded));
                }
            }
            frontier = next;
            if self.exhausted.load(Ordering::Acquire) {
                return;
            }
        }

        debug!(subtrees = frontier.len(), "searching frontier in parallel");
        frontier
            .into_par_iter()
            .for_each(|(path, node)| self.run(node, &path));
    }
}
