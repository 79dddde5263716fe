//! Test fixtures for sortie-planner.
//!
//! Provides:
//! - Reference distance matrices with known optimal tour costs
//! - A scenario with three forbidden zones around the origin
//! - A brute-force optimum for small matrices

#![allow(dead_code)]

use sortie_planner::matrix::DistanceMatrix;

pub const INF: f64 = f64::INFINITY;

pub fn matrix(rows: Vec<Vec<f64>>) -> DistanceMatrix {
    DistanceMatrix::from_rows(rows).expect("fixture matrix is square")
}

// ============================================================================
// Reference matrices
// ============================================================================

/// Optimal tour cost 10.
pub fn two_vertices() -> DistanceMatrix {
    matrix(vec![vec![INF, 10.0], vec![0.0, INF]])
}

/// Optimal tour cost 49.
pub fn three_vertices() -> DistanceMatrix {
    matrix(vec![
        vec![INF, 15.0, 40.0],
        vec![43.0, INF, 4.0],
        vec![30.0, 5.0, INF],
    ])
}

/// Optimal tour cost 45.
pub fn four_vertices() -> DistanceMatrix {
    matrix(vec![
        vec![INF, 43.0, 22.0, 14.0],
        vec![15.0, INF, 53.0, 2.0],
        vec![23.0, 10.0, INF, 4.0],
        vec![21.0, 67.0, 6.0, INF],
    ])
}

/// Optimal tour cost 29.
pub fn five_vertices() -> DistanceMatrix {
    matrix(vec![
        vec![INF, 75.0, 139.0, 34.0, 15.0],
        vec![3.0, INF, 34.0, 12.0, 33.0],
        vec![23.0, 43.0, INF, 11.0, 52.0],
        vec![21.0, 0.0, 35.0, INF, 2.0],
        vec![0.0, 0.0, 0.0, 0.0, INF],
    ])
}

/// Every off-diagonal entry equals `value`, so every tour costs `size * value`.
pub fn uniform(size: usize, value: f64) -> DistanceMatrix {
    let mut dm = DistanceMatrix::new(size);
    for i in 0..size {
        for j in 0..size {
            if i != j {
                dm.set(i, j, value);
            }
        }
    }
    dm
}

/// Entry `(i, j)` is `10i + j + 1`, minus one above the diagonal.
/// With 11 vertices the optimal tour costs 606.
pub fn staircase(size: usize) -> DistanceMatrix {
    let mut dm = DistanceMatrix::new(size);
    for i in 0..size {
        for j in 0..size {
            if i != j {
                let shift = if j > i { 1.0 } else { 0.0 };
                dm.set(i, j, (i * 10 + j + 1) as f64 - shift);
            }
        }
    }
    dm
}

/// Pseudo-random integer distances. With 9 vertices the search improves
/// its record several times before proving the optimum of 93.
pub fn scrambled(size: usize) -> DistanceMatrix {
    let mut dm = DistanceMatrix::new(size);
    for i in 0..size {
        for j in 0..size {
            if i != j {
                dm.set(i, j, ((i * 37 + j * 91 + i * j * 13) % 53 + 1) as f64);
            }
        }
    }
    dm
}

/// Two vehicles from vertex 0 cost 10 in total: `0 → 1 → 0` and `0 → 2 → 0`.
pub fn fleet_triangle() -> DistanceMatrix {
    matrix(vec![
        vec![INF, 1.0, 2.0],
        vec![3.0, INF, 1.0],
        vec![4.0, 2.0, INF],
    ])
}

// ============================================================================
// Scenarios
// ============================================================================

pub const ZONE_SCENARIO: &str = r#"{
    "n": 2,
    "data_points": [
        {"id": 0, "x": 0.100301, "y": 0.100301},
        {"id": 1001, "x": 100.100101, "y": 13.100101},
        {"id": 1002, "x": 80.100201, "y": 80.100201},
        {"id": 1003, "x": 30, "y": 40}
    ],
    "forbidden_lines": [
        {"id1": 1002, "id2": 1003}
    ],
    "data_forbidden_zone": [
        {"x": 45.100101, "y": 44.100101, "r": 11},
        {"x": 52.100201, "y": 14.100201, "r": 12},
        {"x": 86.100301, "y": 44.100301, "r": 13}
    ]
}"#;

// ============================================================================
// Brute force
// ============================================================================

/// Cheapest way to serve every vertex with `fleet` non-empty tours from
/// `origin`, by trying every ordering and every split of it.
pub fn brute_force(dm: &DistanceMatrix, origin: usize, fleet: usize) -> f64 {
    let mut customers: Vec<usize> = (0..dm.size()).filter(|&v| v != origin).collect();
    let mut best = INF;
    permute(&mut customers, 0, &mut |order| {
        best = best.min(best_split(dm, origin, order, fleet));
    });
    best
}

fn best_split(dm: &DistanceMatrix, origin: usize, order: &[usize], fleet: usize) -> f64 {
    if fleet == 1 {
        return tour_cost(dm, origin, order);
    }
    (1..=order.len() - (fleet - 1))
        .map(|k| tour_cost(dm, origin, &order[..k]) + best_split(dm, origin, &order[k..], fleet - 1))
        .fold(INF, f64::min)
}

fn tour_cost(dm: &DistanceMatrix, origin: usize, stops: &[usize]) -> f64 {
    let mut path = vec![origin];
    path.extend_from_slice(stops);
    path.push(origin);
    dm.path_cost(&path)
}

fn permute(items: &mut Vec<usize>, k: usize, visit: &mut impl FnMut(&[usize])) {
    if k == items.len() {
        visit(items);
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, visit);
        items.swap(k, i);
    }
}
