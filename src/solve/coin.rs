//! Solver for the coin puzzle.
//!
//! Five coins with known values must be inserted in an order `(a, b, c, d, e)`
//! satisfying `a + b*c^2 + d^3 - e = 399`, an equation found on the monument
//! in the ruins.

const TARGET: i64 = 399;

const COINS: [(&str, i64); 5] = [
    ("red", 2),
    ("corroded", 3),
    ("shiny", 5),
    ("concave", 7),
    ("blue", 9),
];

/// Finds the coin order satisfying the monument equation, returning the coin
/// names first-inserted first.
pub fn solve() -> Option<Vec<&'static str>> {
    let mut order = [0usize; 5];
    let mut used = [false; 5];
    permute(&mut order, &mut used, 0)
        .then(|| order.iter().map(|&i| COINS[i].0).collect())
}

/// Tries every assignment for slots `depth..`, leaving the satisfying one in
/// `order` when found.
fn permute(order: &mut [usize; 5], used: &mut [bool; 5], depth: usize) -> bool {
    if depth == 5 {
        return check(order.map(|i| COINS[i].1));
    }
    for i in 0..5 {
        if used[i] {
            continue;
        }
        used[i] = true;
        order[depth] = i;
        if permute(order, used, depth + 1) {
            return true;
        }
        used[i] = false;
    }
    false
}

fn check([a, b, c, d, e]: [i64; 5]) -> bool {
    a + b * c * c + d * d * d - e == TARGET
}
