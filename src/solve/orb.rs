//! Solver for the orb puzzle.
//!
//! The vault antechamber is a 4x4 grid of alternating numbers and operators.
//! Carrying the orb from the bottom-left cell (weight 22) to the vault door
//! at the top-right applies each visited operator-number pair to its weight;
//! the door opens only if the orb arrives weighing exactly 30. Re-entering
//! the start cell resets the orb, and reaching the door with any other
//! weight shatters it, so both are dead ends for the search.
//!
//! [`solve`] finds a shortest command sequence by breadth-first search over
//! `(position, weight)` states, expanding two steps at a time so every state
//! sits on a number cell.

use std::collections::{HashMap, VecDeque};

/// Orb weight on the start cell.
const START_WEIGHT: i32 = 22;
/// Orb weight the vault door requires.
const TARGET_WEIGHT: i32 = 30;
/// Weights outside (0, BOUND] cannot recover within a shortest path; the
/// search prunes them to keep the state space finite.
const WEIGHT_BOUND: i32 = 1024;

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Num(i32),
    Add,
    Sub,
    Mul,
}

use Cell::{Add, Mul, Num, Sub};

/// The antechamber grid, indexed `GRID[y][x]` with `y = 0` the bottom row.
/// Start is `(0, 0)`, the vault door `(3, 3)`.
const GRID: [[Cell; 4]; 4] = [
    [Num(22), Sub, Num(9), Mul],
    [Add, Num(4), Sub, Num(18)],
    [Num(4), Mul, Num(11), Mul],
    [Mul, Num(8), Sub, Num(1)],
];

const DIRS: [(i32, i32, &str); 4] = [
    (0, 1, "north"),
    (0, -1, "south"),
    (-1, 0, "west"),
    (1, 0, "east"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State {
    x: i32,
    y: i32,
    weight: i32,
}

/// Finds a shortest sequence of movement commands that brings the orb to the
/// vault door at the required weight.
pub fn solve() -> Option<Vec<&'static str>> {
    let start = State { x: 0, y: 0, weight: START_WEIGHT };
    let goal = State { x: 3, y: 3, weight: TARGET_WEIGHT };

    let mut queue = VecDeque::from([start]);
    let mut paths: HashMap<State, Vec<&'static str>> = HashMap::from([(start, Vec::new())]);

    while let Some(state) = queue.pop_front() {
        if state == goal {
            return paths.remove(&goal);
        }
        // Any other arrival at the door shatters the orb.
        if (state.x, state.y) == (goal.x, goal.y) {
            continue;
        }

        for &(dx1, dy1, cmd1) in &DIRS {
            for &(dx2, dy2, cmd2) in &DIRS {
                let (ox, oy) = (state.x + dx1, state.y + dy1);
                let (nx, ny) = (ox + dx2, oy + dy2);
                // Neither step may leave the grid or reset on the start cell.
                if (ox, oy) == (start.x, start.y) || (nx, ny) == (start.x, start.y) {
                    continue;
                }
                let (Some(op), Some(num)) = (cell_at(ox, oy), cell_at(nx, ny)) else {
                    continue;
                };
                let (op, Num(n)) = (op, num) else { continue };
                let weight = match op {
                    Add => state.weight + n,
                    Sub => state.weight - n,
                    Mul => state.weight * n,
                    Num(_) => continue,
                };
                if weight <= 0 || weight > WEIGHT_BOUND {
                    continue;
                }

                let next = State { x: nx, y: ny, weight };
                if !paths.contains_key(&next) {
                    let mut path = paths[&state].clone();
                    path.extend([cmd1, cmd2]);
                    paths.insert(next, path);
                    queue.push_back(next);
                }
            }
        }
    }

    None
}

fn cell_at(x: i32, y: i32) -> Option<Cell> {
    if !(0..4).contains(&x) || !(0..4).contains(&y) {
        return None;
    }
    Some(GRID[y as usize][x as usize])
}
