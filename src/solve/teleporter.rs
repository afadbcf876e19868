//! Solver for the teleporter puzzle.
//!
//! The program's teleporter confirmation routine is a modified two-argument
//! Ackermann function over 15-bit words, parameterized by register 8:
//!
//! ```text
//! f(0, n) = n + 1
//! f(m, 0) = f(m - 1, r8)
//! f(m, n) = f(m - 1, f(m, n - 1))     (all arithmetic mod 32768)
//! ```
//!
//! The confirmation passes when `f(4, 1) == 6`. Naive recursion overflows any
//! reasonable stack at `m = 4`, so [`verify`] fills the table a row at a
//! time: row `m` depends only on row `m - 1` and on earlier entries of
//! itself, left to right.

use crate::isa::MODULUS;

/// [`solve`] searches r8 values below this bound, i.e. every 15-bit word.
const SEARCH_BOUND: u16 = MODULUS;

/// The `f(4, 1)` value the confirmation routine accepts.
const TARGET: u16 = 6;

/// Computes the confirmation value `f(4, 1)` for the given register-8 value.
pub fn verify(r8: u16) -> u16 {
    rows(r8, 4)[1]
}

/// Searches for the register-8 value whose confirmation value is 6.
///
/// This evaluates [`verify`] for every candidate, cheap per call but slow in
/// aggregate; expect a noticeable wait.
pub fn solve() -> Option<u16> {
    (0..SEARCH_BOUND).find(|&r8| verify(r8) == TARGET)
}

/// Computes row `m` of the function table: `rows(r8, m)[n] == f(m, n)` for
/// every 15-bit `n`.
fn rows(r8: u16, m: usize) -> Vec<u16> {
    let size = usize::from(MODULUS);
    // Row 0 is the increment function.
    let mut row: Vec<u16> = (0..MODULUS).map(|n| (n + 1) % MODULUS).collect();

    for _ in 0..m {
        let prev = row;
        let mut next = vec![0u16; size];
        next[0] = prev[usize::from(r8)];
        for n in 1..size {
            next[n] = prev[usize::from(next[n - 1])];
        }
        row = next;
    }

    row
}

#[cfg(test)]
mod tests {
    use super::{rows, verify};

    const MODULUS: u32 = 32768;

    // Closed forms for the first rows, derived by unrolling the recurrence:
    //   f(1, n) = n + r8 + 1
    //   f(2, n) = (n + 1) * (r8 + 1) + r8
    #[test]
    fn test_row_one_closed_form() {
        for r8 in [0u16, 1, 7, 32767] {
            let row = rows(r8, 1);
            for n in [0u16, 1, 100, 32767] {
                let expect = (u32::from(n) + u32::from(r8) + 1) % MODULUS;
                assert_eq!(u32::from(row[usize::from(n)]), expect, "f(1, {n}) with r8 = {r8}");
            }
        }
    }

    #[test]
    fn test_row_two_closed_form() {
        for r8 in [0u16, 1, 7, 100] {
            let row = rows(r8, 2);
            for n in [0u16, 1, 55, 32767] {
                let expect = ((u32::from(n) + 1) * (u32::from(r8) + 1) + u32::from(r8)) % MODULUS;
                assert_eq!(u32::from(row[usize::from(n)]), expect, "f(2, {n}) with r8 = {r8}");
            }
        }
    }

    #[test]
    fn test_verify_r8_zero() {
        // With r8 = 0 the function collapses: f(m, 0) = f(m-1, 0) all the way
        // down, so f(4, 1) = f(3, f(4, 0)) = f(3, 1) = ... = f(0, 1) = 2.
        assert_eq!(verify(0), 2);
    }
}
