// Domain service interface for solving optimization problems
// Solver backends implement this; the cooling model only depends on the trait

use super::models::{OptimizationProblem, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Unsupported problem: {0}")]
    Unsupported(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for optimization solvers
///
/// Infeasible and unbounded outcomes are reported through the returned
/// [`Solution`] status; `Err` is reserved for problems the backend could not
/// attempt at all.
pub trait SolverService: Send + Sync {
    /// Solve an optimization problem
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<()> {
        let mut errors = Vec::new();

        if problem.objective.coefficients.is_empty() {
            errors.push("Objective must have at least one coefficient".to_string());
        }

        let num_vars = problem.num_variables();

        if problem.variables.len() != num_vars {
            errors.push(format!(
                "Number of variables ({}) doesn't match objective coefficients ({})",
                problem.variables.len(),
                num_vars
            ));
        }

        for (i, constraint) in problem.constraints.iter().enumerate() {
            if constraint.num_variables() != num_vars {
                errors.push(format!(
                    "Constraint {} has {} coefficients but problem has {} variables",
                    i,
                    constraint.num_variables(),
                    num_vars
                ));
            }
            if constraint.coefficients.iter().any(|c| !c.is_finite()) || !constraint.bound.is_finite()
            {
                errors.push(format!("Constraint {} '{}' is not finite", i, constraint.name));
            }
        }

        for term in &problem.objective.quadratic_terms {
            if term.first >= num_vars || term.second >= num_vars {
                errors.push(format!(
                    "Quadratic term ({}, {}) references a missing variable",
                    term.first, term.second
                ));
            }
        }

        for (i, var) in problem.variables.iter().enumerate() {
            if let Some(upper) = var.upper_bound {
                if var.lower_bound > upper {
                    errors.push(format!(
                        "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                        i, var.name, var.lower_bound, upper
                    ));
                }
            }
        }

        if !problem.is_linear() && !self.supports_quadratic() {
            return Err(SolverError::Unsupported(format!(
                "{} cannot minimise a quadratic objective",
                self.name()
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver accepts products of variables in the objective
    fn supports_quadratic(&self) -> bool {
        false
    }
}
