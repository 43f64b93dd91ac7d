use good_lp::{constraint, microlp, variable, Expression, Solution, SolverModel, Variable};
use nalgebra::{DMatrix, DVector};
use num::rational::Rational64;
use num::{Signed, Zero};

use crate::error::Infeasible;
use crate::machine::Machine;

// -----------------------------------------------------------------------------
// Constants & Configuration
// -----------------------------------------------------------------------------

/// Numerical epsilon for comparing floating point values to zero.
const EPSILON: f64 = 1e-9;

/// Tolerance for the Phase 1 feasibility check.
const PHASE1_TOLERANCE: f64 = 1e-6;

/// Tolerance for checking if a float represents an integer.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Slack subtracted from a relaxed bound before rounding it up for pruning.
const PRUNING_TOLERANCE: f64 = 1e-6;

/// Pivot cap per simplex phase. Bland's rule cannot cycle, so hitting it means
/// the tableau has numerically degenerated.
const MAX_PIVOTS: usize = 10_000;

// -----------------------------------------------------------------------------
// Domain Models
// -----------------------------------------------------------------------------

/// `A·x = b` for one machine: `wiring[(light, button)]` is 1 when pressing the
/// button adds a jolt to that light, and `targets[light]` is its requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncidenceSystem {
    pub wiring: DMatrix<i64>,
    pub targets: DVector<i64>,
}

impl IncidenceSystem {
    pub fn from_machine(machine: &Machine) -> Self {
        let lights = machine.light_count();
        let buttons = machine.buttons();

        let wiring = DMatrix::from_fn(lights, buttons.len(), |light, button| {
            i64::from(buttons[button].affects(light))
        });
        let targets = DVector::from_iterator(
            lights,
            machine.joltage().iter().map(|&jolts| i64::from(jolts)),
        );

        Self { wiring, targets }
    }

    pub fn lights(&self) -> usize {
        self.wiring.nrows()
    }

    pub fn buttons(&self) -> usize {
        self.wiring.ncols()
    }

    /// Presses of `button` can never exceed the smallest requirement among the
    /// lights it feeds. A button wired to nothing is never worth pressing.
    pub fn press_bound(&self, button: usize) -> i64 {
        (0..self.lights())
            .filter(|&light| self.wiring[(light, button)] != 0)
            .map(|light| self.targets[light])
            .min()
            .unwrap_or(0)
    }

    /// Exact integer check of `A·x = b`.
    pub fn is_satisfied_by(&self, presses: &[u64]) -> bool {
        presses.len() == self.buttons()
            && (0..self.lights()).all(|light| {
                let jolts: i128 = presses
                    .iter()
                    .enumerate()
                    .map(|(button, &count)| {
                        i128::from(self.wiring[(light, button)]) * i128::from(count)
                    })
                    .sum();
                jolts == i128::from(self.targets[light])
            })
    }
}

/// The "minimize `sum(x)` subject to `A·x = b`, `x >= 0`, `x` integer"
/// capability the joltage question is delegated to.
pub trait IntegerProgram: Send + Sync {
    fn name(&self) -> &'static str;

    /// Optimal press count per button, or `None` when no non-negative integer
    /// solution exists.
    fn minimize(&self, system: &IncidenceSystem) -> Option<Vec<u64>>;
}

/// Fewest total presses that bring every light to exactly its joltage.
///
/// Whatever the backend returns is re-checked with integer arithmetic before it
/// is trusted.
#[tracing::instrument(
    skip_all,
    fields(backend = program.name(), lights = machine.light_count())
)]
pub fn min_joltage_presses(
    machine: &Machine,
    program: &dyn IntegerProgram,
) -> Result<u64, Infeasible> {
    let system = IncidenceSystem::from_machine(machine);
    let presses = program.minimize(&system).ok_or(Infeasible)?;

    if !system.is_satisfied_by(&presses) {
        tracing::warn!(?presses, "backend answer misses the joltage targets");
        return Err(Infeasible);
    }

    let total: u64 = presses.iter().sum();
    tracing::debug!(total, ?presses, "joltage solved");
    Ok(total)
}

// -----------------------------------------------------------------------------
// MILP Solver
// -----------------------------------------------------------------------------

/// Hands the program to the `microlp` mixed-integer solver through `good_lp`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MilpSolver;

impl IntegerProgram for MilpSolver {
    fn name(&self) -> &'static str {
        "good_lp-microlp"
    }

    fn minimize(&self, system: &IncidenceSystem) -> Option<Vec<u64>> {
        if system.buttons() == 0 {
            return system.targets.iter().all(|&t| t == 0).then(Vec::new);
        }

        let mut vars = good_lp::variables!();
        let presses: Vec<Variable> = (0..system.buttons())
            .map(|button| {
                let bound = system.press_bound(button) as f64;
                vars.add(variable().integer().min(0).max(bound))
            })
            .collect();

        let objective: Expression = presses.iter().copied().sum();
        let mut model = vars.minimise(objective).using(microlp);
        for light in 0..system.lights() {
            let jolts: Expression = presses
                .iter()
                .enumerate()
                .filter(|&(button, _)| system.wiring[(light, button)] != 0)
                .map(|(_, &press)| press)
                .sum();
            let target = system.targets[light] as f64;
            model = model.with(constraint!(jolts == target));
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(error) => {
                tracing::trace!(%error, "milp solver found no solution");
                return None;
            }
        };

        presses
            .iter()
            .map(|&press| {
                let value = solution.value(press);
                let off_grid = (value - value.round()).abs() > INTEGRALITY_TOLERANCE;
                if off_grid || value < -INTEGRALITY_TOLERANCE {
                    tracing::warn!(value, "milp solver returned a fractional press count");
                    return None;
                }
                Some(value.round().max(0.0) as u64)
            })
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Exact Elimination
// -----------------------------------------------------------------------------

/// Gauss-Jordan elimination over rationals followed by a bounded enumeration
/// of the free variables. No floating point involved.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactElimination;

impl IntegerProgram for ExactElimination {
    fn name(&self) -> &'static str {
        "exact-elimination"
    }

    fn minimize(&self, system: &IncidenceSystem) -> Option<Vec<u64>> {
        let echelon = Echelon::reduce(system)?;
        tracing::trace!(
            pivots = echelon.pivots.len(),
            free = echelon.free.len(),
            "reduced incidence system"
        );
        echelon.cheapest(system)
    }
}

/// Pivot rows of `[A | b]` in Reduced Row Echelon Form.
struct Echelon {
    rows: Vec<Vec<Rational64>>,
    /// Column (button) solved by each row.
    pivots: Vec<usize>,
    /// Columns without a pivot; every assignment of these fixes the rest.
    free: Vec<usize>,
    buttons: usize,
    /// Total presses when every free press is zero.
    base_cost: Rational64,
    /// Change in total presses per press of each free column.
    weights: Vec<Rational64>,
}

impl Echelon {
    /// Returns `None` when the system is inconsistent over the rationals.
    fn reduce(system: &IncidenceSystem) -> Option<Self> {
        let (lights, buttons) = system.wiring.shape();

        let mut matrix: Vec<Vec<Rational64>> = (0..lights)
            .map(|r| {
                (0..buttons)
                    .map(|c| Rational64::from_integer(system.wiring[(r, c)]))
                    .chain(std::iter::once(Rational64::from_integer(system.targets[r])))
                    .collect()
            })
            .collect();

        let mut pivots = Vec::new();
        let mut free = Vec::new();
        let mut pivot_row = 0;

        for c in 0..buttons {
            let Some(r) = (pivot_row..lights).find(|&r| !matrix[r][c].is_zero()) else {
                free.push(c);
                continue;
            };

            matrix.swap(pivot_row, r);
            let scale = matrix[pivot_row][c];
            for value in matrix[pivot_row].iter_mut() {
                *value /= scale;
            }

            let pivot = matrix[pivot_row].clone();
            for (i, row) in matrix.iter_mut().enumerate() {
                if i != pivot_row && !row[c].is_zero() {
                    let factor = row[c];
                    for (value, p) in row.iter_mut().zip(&pivot) {
                        *value -= factor * p;
                    }
                }
            }

            pivots.push(c);
            pivot_row += 1;
        }

        // 0 = b with b != 0
        if matrix[pivot_row..].iter().any(|row| !row[buttons].is_zero()) {
            return None;
        }
        matrix.truncate(pivot_row);

        let base_cost: Rational64 = matrix.iter().map(|row| row[buttons]).sum();
        let weights = free
            .iter()
            .map(|&f| {
                let absorbed: Rational64 = matrix.iter().map(|row| row[f]).sum();
                Rational64::from_integer(1) - absorbed
            })
            .collect();

        Some(Self {
            rows: matrix,
            pivots,
            free,
            buttons,
            base_cost,
            weights,
        })
    }

    fn cheapest(&self, system: &IncidenceSystem) -> Option<Vec<u64>> {
        let bounds: Vec<i64> = self.free.iter().map(|&c| system.press_bound(c)).collect();
        let mut assignment = vec![0; self.free.len()];
        let mut best = None;
        self.descend(0, &bounds, &mut assignment, &mut best);
        best.map(|(_, presses)| presses)
    }

    fn descend(
        &self,
        depth: usize,
        bounds: &[i64],
        assignment: &mut [i64],
        best: &mut Option<(i64, Vec<u64>)>,
    ) {
        if !self.viable(depth, bounds, assignment, best.as_ref().map(|(cost, _)| *cost)) {
            return;
        }

        if depth == assignment.len() {
            if let Some(candidate) = self.complete(assignment) {
                if best.as_ref().is_none_or(|(cost, _)| candidate.0 < *cost) {
                    *best = Some(candidate);
                }
            }
            return;
        }

        for value in 0..=bounds[depth] {
            assignment[depth] = value;
            self.descend(depth + 1, bounds, assignment, best);
        }
    }

    /// Whether the first `depth` free presses in `assignment` can still be
    /// extended into a solution cheaper than `incumbent`.
    ///
    /// Each pivot press is `rhs - sum(coeff * free)`. With the remaining free
    /// presses somewhere in `0..=bound`, a row whose largest reachable value is
    /// negative is dead, and a row whose remaining coefficients are all integers
    /// keeps its current fractional part. The total cost is linear in the free
    /// presses too, so the cheapest reachable total bounds the subtree.
    fn viable(
        &self,
        depth: usize,
        bounds: &[i64],
        assignment: &[i64],
        incumbent: Option<i64>,
    ) -> bool {
        let fixed = assignment[..depth].iter().zip(&self.free);
        let open = bounds[depth..].iter().zip(&self.free[depth..]);

        for row in &self.rows {
            let mut partial = row[self.buttons];
            for (&x, &f) in fixed.clone() {
                partial -= row[f] * Rational64::from_integer(x);
            }

            let mut highest = partial;
            let mut integral_rest = true;
            for (&bound, &f) in open.clone() {
                if row[f].is_negative() {
                    highest -= row[f] * Rational64::from_integer(bound);
                }
                integral_rest &= row[f].is_integer();
            }

            if highest.is_negative() || (integral_rest && !partial.is_integer()) {
                return false;
            }
        }

        let Some(incumbent) = incumbent else {
            return true;
        };
        let mut floor = self.base_cost;
        for ((&x, _), weight) in fixed.zip(&self.weights) {
            floor += weight * Rational64::from_integer(x);
        }
        for ((&bound, _), weight) in open.zip(&self.weights[depth..]) {
            if weight.is_negative() {
                floor += weight * Rational64::from_integer(bound);
            }
        }
        floor.ceil() < Rational64::from_integer(incumbent)
    }

    /// Solves the pivot presses for one assignment of the free presses.
    fn complete(&self, assignment: &[i64]) -> Option<(i64, Vec<u64>)> {
        let mut presses = vec![0; self.buttons];
        let mut cost = 0;

        for (&c, &value) in self.free.iter().zip(assignment) {
            presses[c] = u64::try_from(value).ok()?;
            cost += value;
        }

        for (row, &c) in self.rows.iter().zip(&self.pivots) {
            let mut value = row[self.buttons];
            for (&f, &x) in self.free.iter().zip(assignment) {
                value -= row[f] * Rational64::from_integer(x);
            }

            if !value.is_integer() || value.is_negative() {
                return None;
            }
            let value = value.to_integer();
            presses[c] = u64::try_from(value).ok()?;
            cost += value;
        }

        Some((cost, presses))
    }
}

// -----------------------------------------------------------------------------
// Simplex Solver Core
// -----------------------------------------------------------------------------

mod simplex {
    use super::*;

    /// Minimize `c·x` subject to `A·x = b`, `x >= 0`.
    #[derive(Clone, Debug)]
    pub struct Lp {
        pub a: DMatrix<f64>,
        pub b: DVector<f64>,
        pub c: DVector<f64>,
    }

    #[derive(Clone, Debug)]
    pub struct Optimum {
        pub x: DVector<f64>,
        pub cost: f64,
    }

    /// Two-phase simplex. `None` when the LP is infeasible or unbounded.
    pub fn solve(lp: &Lp) -> Option<Optimum> {
        let (m, n) = lp.a.shape();

        // Phase 1: minimize the sum of one artificial per row.
        let rhs = n + m;
        let mut tableau: DMatrix<f64> = DMatrix::zeros(m + 1, rhs + 1);
        for r in 0..m {
            // Flip rows with negative RHS so the artificial basis starts feasible.
            let sign = if lp.b[r] < 0.0 { -1.0 } else { 1.0 };
            for c in 0..n {
                tableau[(r, c)] = lp.a[(r, c)] * sign;
            }
            tableau[(r, n + r)] = 1.0;
            tableau[(r, rhs)] = lp.b[r] * sign;
        }
        // Objective row already in canonical form: artificials eliminated.
        for c in (0..n).chain(std::iter::once(rhs)) {
            let col_sum: f64 = (0..m).map(|r| tableau[(r, c)]).sum();
            tableau[(m, c)] = -col_sum;
        }

        let mut basis: Vec<usize> = (n..n + m).collect();
        if !run_pivot_loop(&mut tableau, &mut basis, m, rhs, rhs) {
            return None;
        }
        if -tableau[(m, rhs)] > PHASE1_TOLERANCE {
            return None; // Infeasible
        }

        // Basis repair: pivot artificials out, dropping rows that are 0 = 0.
        let mut active = Vec::with_capacity(m);
        for r in 0..m {
            if basis[r] < n {
                active.push(r);
            } else if let Some(c) = (0..n).find(|&c| tableau[(r, c)].abs() > EPSILON) {
                pivot(&mut tableau, r, c);
                basis[r] = c;
                active.push(r);
            }
        }

        // Phase 2: original objective over the surviving rows.
        let k = active.len();
        let mut phase2: DMatrix<f64> = DMatrix::zeros(k + 1, n + 1);
        let mut basis2 = Vec::with_capacity(k);
        for (new_r, &old_r) in active.iter().enumerate() {
            for c in 0..n {
                phase2[(new_r, c)] = tableau[(old_r, c)];
            }
            phase2[(new_r, n)] = tableau[(old_r, rhs)];
            basis2.push(basis[old_r]);
        }

        for c in 0..n {
            phase2[(k, c)] = lp.c[c];
        }
        for (r, &bc) in basis2.iter().enumerate() {
            let factor = lp.c[bc];
            if factor.abs() > EPSILON {
                for c in 0..=n {
                    phase2[(k, c)] -= factor * phase2[(r, c)];
                }
            }
        }

        if !run_pivot_loop(&mut phase2, &mut basis2, k, n, n) {
            return None; // Unbounded
        }

        let mut x: DVector<f64> = DVector::zeros(n);
        for (r, &bc) in basis2.iter().enumerate() {
            x[bc] = phase2[(r, n)].max(0.0);
        }

        Some(Optimum {
            x,
            cost: -phase2[(k, n)],
        })
    }

    fn pivot(mat: &mut DMatrix<f64>, pr: usize, pc: usize) {
        let width = mat.ncols();
        let inv = 1.0 / mat[(pr, pc)];

        // Normalize pivot row
        for c in 0..width {
            mat[(pr, c)] *= inv;
        }

        // Eliminate other rows, objective included
        for r in 0..mat.nrows() {
            if r != pr {
                let factor = mat[(r, pc)];
                if factor.abs() > EPSILON {
                    for c in 0..width {
                        mat[(r, c)] -= factor * mat[(pr, c)];
                    }
                }
            }
        }
    }

    /// Pivots until no column below `cols` has a negative reduced cost.
    /// Returns `false` if the LP is unbounded or the pivot cap is hit.
    fn run_pivot_loop(
        mat: &mut DMatrix<f64>,
        basis: &mut [usize],
        m: usize,
        cols: usize,
        rhs: usize,
    ) -> bool {
        for _ in 0..MAX_PIVOTS {
            // Bland's Rule: first column with negative reduced cost
            let Some(pc) = (0..cols).find(|&c| mat[(m, c)] < -EPSILON) else {
                return true; // Optimal
            };

            // Min Ratio Test, ties broken by the lowest basic variable
            let mut leaving: Option<(usize, f64)> = None;
            for r in 0..m {
                let val = mat[(r, pc)];
                if val > EPSILON {
                    let ratio = mat[(r, rhs)] / val;
                    let better = match leaving {
                        None => true,
                        Some((lr, best)) => {
                            ratio < best - EPSILON
                                || (ratio <= best + EPSILON && basis[r] < basis[lr])
                        }
                    };
                    if better {
                        leaving = Some((r, ratio));
                    }
                }
            }

            let Some((pr, _)) = leaving else {
                return false; // Unbounded
            };
            pivot(mat, pr, pc);
            basis[pr] = pc;
        }

        tracing::warn!("simplex pivot limit reached");
        false
    }
}

// -----------------------------------------------------------------------------
// Mixed Integer Linear Programming (Branch & Bound)
// -----------------------------------------------------------------------------

/// Depth-first branch & bound over the simplex LP relaxation.
///
/// A relaxed optimum is only rounded once every variable sits within
/// `INTEGRALITY_TOLERANCE` of an integer, and the rounded vector must satisfy
/// the system exactly before it can become the incumbent.
#[derive(Clone, Copy, Debug, Default)]
pub struct BranchAndBound;

struct BranchNode {
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<Option<f64>>,
}

impl IntegerProgram for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch-and-bound"
    }

    fn minimize(&self, system: &IncidenceSystem) -> Option<Vec<u64>> {
        let a = system.wiring.map(|v| v as f64);
        let b = system.targets.map(|v| v as f64);
        let n = a.ncols();

        let mut best: Option<(u64, Vec<u64>)> = None;
        let mut explored = 0usize;
        let mut stack = vec![BranchNode {
            lower_bounds: vec![0.0; n],
            upper_bounds: vec![None; n],
        }];

        while let Some(node) = stack.pop() {
            explored += 1;

            let Some((lp, shift_cost)) = build_relaxed_system(&a, &b, &node) else {
                continue; // Infeasible bounds
            };
            let Some(sol) = simplex::solve(&lp) else {
                continue;
            };

            // Integer solutions have integer cost, so round the bound up.
            let bound = (sol.cost + shift_cost - PRUNING_TOLERANCE).ceil();
            if best
                .as_ref()
                .is_some_and(|(best_cost, _)| bound >= *best_cost as f64)
            {
                continue;
            }

            let full_x: Vec<f64> = (0..n).map(|c| sol.x[c] + node.lower_bounds[c]).collect();
            let fractional = full_x
                .iter()
                .position(|v| (v - v.round()).abs() > INTEGRALITY_TOLERANCE);

            match fractional {
                Some(idx) => {
                    let val = full_x[idx];

                    // Branch 1: x <= floor
                    let mut down = BranchNode {
                        lower_bounds: node.lower_bounds.clone(),
                        upper_bounds: node.upper_bounds.clone(),
                    };
                    let current_ub = down.upper_bounds[idx].unwrap_or(f64::MAX);
                    down.upper_bounds[idx] = Some(current_ub.min(val.floor()));

                    // Branch 2: x >= ceil
                    let mut up = node;
                    up.lower_bounds[idx] = up.lower_bounds[idx].max(val.ceil());

                    stack.push(up);
                    stack.push(down);
                }
                None => {
                    let presses: Vec<u64> =
                        full_x.iter().map(|v| v.round().max(0.0) as u64).collect();
                    if !system.is_satisfied_by(&presses) {
                        tracing::trace!(?full_x, "rounded relaxation drifted off the targets");
                        continue;
                    }

                    let cost: u64 = presses.iter().sum();
                    if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
                        best = Some((cost, presses));
                    }
                }
            }
        }

        tracing::trace!(explored, found = best.is_some(), "branch and bound finished");
        best.map(|(_, presses)| presses)
    }
}

/// Relaxation of `node`: lower bounds are shifted into the RHS and upper bounds
/// become `x + slack = ub - lb` rows. Returns the LP and the cost of the shift.
fn build_relaxed_system(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    node: &BranchNode,
) -> Option<(simplex::Lp, f64)> {
    let (m, n) = a.shape();
    let mut rhs = b.clone();
    let mut shift_cost = 0.0;

    // Apply Lower Bounds: Shift RHS (b' = b - A * lb)
    for c in 0..n {
        let lb = node.lower_bounds[c];
        if lb > 0.0 {
            rhs -= a.column(c) * lb;
            shift_cost += lb;
        }
    }

    // Apply Upper Bounds: Add slack constraints (x_shifted + slack = UB - LB)
    let mut slack_constraints = Vec::new();
    for c in 0..n {
        if let Some(ub) = node.upper_bounds[c] {
            let limit = ub - node.lower_bounds[c];
            if limit < -INTEGRALITY_TOLERANCE {
                return None;
            }
            slack_constraints.push((c, limit.max(0.0)));
        }
    }

    let added = slack_constraints.len();
    let mut lp_a = a.clone().resize(m + added, n + added, 0.0);
    let mut lp_b = rhs.resize_vertically(m + added, 0.0);
    for (i, &(var_idx, limit)) in slack_constraints.iter().enumerate() {
        lp_a[(m + i, var_idx)] = 1.0;
        lp_a[(m + i, n + i)] = 1.0;
        lp_b[m + i] = limit;
    }
    let lp_c = DVector::from_fn(n + added, |i, _| if i < n { 1.0 } else { 0.0 });

    Some((
        simplex::Lp {
            a: lp_a,
            b: lp_b,
            c: lp_c,
        },
        shift_cost,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::lights::LightState;
    use rstest::rstest;

    fn machine(buttons: Vec<Vec<usize>>, joltage: Vec<u32>) -> Machine {
        Machine::new(LightState::off(joltage.len()), buttons, joltage).unwrap()
    }

    fn backends() -> [&'static dyn IntegerProgram; 3] {
        [&MilpSolver, &ExactElimination, &BranchAndBound]
    }

    #[rstest]
    #[case(vec![vec![3], vec![1, 3], vec![2], vec![2, 3], vec![0, 2], vec![0, 1]], vec![3, 5, 4, 7], 10)]
    #[case(vec![vec![0, 2, 3, 4], vec![2, 3], vec![0, 4], vec![0, 1, 2], vec![1, 2, 3, 4]], vec![7, 5, 12, 7, 2], 12)]
    #[case(vec![vec![0, 1, 2, 3, 4], vec![0, 3, 4], vec![0, 1, 2, 4, 5], vec![1, 2]], vec![10, 11, 11, 5, 10, 5], 11)]
    #[case(vec![vec![0], vec![1], vec![2]], vec![3, 5, 2], 10)]
    #[case(vec![vec![0, 1], vec![0, 1]], vec![4, 4], 4)]
    #[case(vec![vec![0, 1], vec![0], vec![1]], vec![3, 2], 3)]
    #[case(vec![vec![0], vec![]], vec![0], 0)]
    #[case(vec![], vec![], 0)]
    #[case(vec![vec![0, 1], vec![1, 2], vec![0, 2], vec![3], vec![3], vec![3]], vec![100, 100, 100, 200], 350)]
    #[case(vec![vec![0, 1], vec![1, 2], vec![0, 2], vec![0, 1, 2]], vec![101, 100, 100], 101)]
    fn backends_agree_on_minimum(
        #[case] buttons: Vec<Vec<usize>>,
        #[case] joltage: Vec<u32>,
        #[case] expected: u64,
    ) {
        let m = machine(buttons, joltage);
        for program in backends() {
            assert_eq!(
                min_joltage_presses(&m, program),
                Ok(expected),
                "backend {}",
                program.name()
            );
        }
    }

    #[rstest]
    // Light 2 needs jolts but nothing is wired to it.
    #[case(vec![vec![0], vec![1]], vec![1, 1, 4])]
    // Both lights always receive the same jolts.
    #[case(vec![vec![0, 1]], vec![2, 3])]
    // Rational solution x = 1/2 only.
    #[case(vec![vec![0, 1], vec![1, 2], vec![0, 2]], vec![1, 1, 1])]
    // Half presses on the triangle, four free buttons on light 3.
    #[case(
        vec![vec![0, 1], vec![1, 2], vec![0, 2], vec![3], vec![3], vec![3], vec![3], vec![3]],
        vec![101, 100, 100, 200]
    )]
    // Light 1 alone takes 150 presses of a button that also overshoots light 0.
    #[case(vec![vec![0], vec![0], vec![0], vec![0, 1]], vec![100, 150])]
    fn infeasible_requirements_are_reported(
        #[case] buttons: Vec<Vec<usize>>,
        #[case] joltage: Vec<u32>,
    ) {
        let m = machine(buttons, joltage);
        for program in backends() {
            assert_eq!(
                min_joltage_presses(&m, program),
                Err(Infeasible),
                "backend {}",
                program.name()
            );
        }
    }

    #[test]
    fn elimination_rejects_half_presses_before_enumerating() {
        let m = machine(
            vec![vec![0, 1], vec![1, 2], vec![0, 2], vec![3], vec![3], vec![3], vec![3], vec![3]],
            vec![101, 100, 100, 200],
        );
        let system = IncidenceSystem::from_machine(&m);
        let echelon = Echelon::reduce(&system).unwrap();
        assert_eq!(echelon.free.len(), 4);

        let bounds: Vec<i64> = echelon.free.iter().map(|&c| system.press_bound(c)).collect();
        let assignment = vec![0; echelon.free.len()];
        assert!(!echelon.viable(0, &bounds, &assignment, None));
    }

    #[test]
    fn elimination_bounds_cost_of_open_presses() {
        // x0 + x1 = 10 with x1 free: total is always 10.
        let m = machine(vec![vec![0], vec![0]], vec![10]);
        let system = IncidenceSystem::from_machine(&m);
        let echelon = Echelon::reduce(&system).unwrap();

        assert_eq!(echelon.base_cost, Rational64::from_integer(10));
        assert_eq!(echelon.weights, vec![Rational64::from_integer(0)]);
        assert!(echelon.viable(0, &[10], &[0], Some(11)));
        assert!(!echelon.viable(0, &[10], &[0], Some(10)));
    }

    #[test]
    fn incidence_collapses_duplicate_indices() {
        let m = machine(vec![vec![0, 0, 2], vec![1]], vec![2, 1, 2]);
        let system = IncidenceSystem::from_machine(&m);

        assert_eq!(system.wiring, DMatrix::from_row_slice(3, 2, &[1, 0, 0, 1, 1, 0]));
        assert_eq!(system.press_bound(0), 2);
        assert_eq!(system.press_bound(1), 1);
        assert!(system.is_satisfied_by(&[2, 1]));
        assert!(!system.is_satisfied_by(&[1, 1]));
        assert!(!system.is_satisfied_by(&[2]));
        assert_eq!(min_joltage_presses(&m, &ExactElimination), Ok(3));
    }

    #[test]
    fn lying_backend_is_caught() {
        struct Lazy;
        impl IntegerProgram for Lazy {
            fn name(&self) -> &'static str {
                "lazy"
            }
            fn minimize(&self, system: &IncidenceSystem) -> Option<Vec<u64>> {
                Some(vec![0; system.buttons()])
            }
        }

        let m = machine(vec![vec![0]], vec![5]);
        assert_eq!(min_joltage_presses(&m, &Lazy), Err(Infeasible));
    }

    #[test]
    fn simplex_solves_relaxation() {
        // x0 + x1 = 4, x1 + x2 = 3: cheapest is x1 = 3, x0 = 1.
        let lp = simplex::Lp {
            a: DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 0.0, 0.0, 1.0, 1.0]),
            b: DVector::from_vec(vec![4.0, 3.0]),
            c: DVector::from_element(3, 1.0),
        };
        let opt = simplex::solve(&lp).unwrap();
        assert!((opt.cost - 4.0).abs() < 1e-9);
        assert!((opt.x[1] - 3.0).abs() < 1e-9);
    }
}
