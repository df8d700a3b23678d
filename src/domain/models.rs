use super::value_objects::{ConstraintType, OptimizationType, SolutionStatus};

/// Continuous decision variable in an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower_bound - tolerance
            && self.upper_bound.map_or(true, |upper| value <= upper + tolerance)
    }
}

/// Product of two variables scaled by a coefficient: `coefficient * x[first] * x[second]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticTerm {
    pub first: usize,
    pub second: usize,
    pub coefficient: f64,
}

/// Objective function to minimize or maximize
///
/// `constant + Σ c_i x_i + Σ q_k x_a x_b`. The quadratic part is empty for
/// purely linear models.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub coefficients: Vec<f64>,
    pub constant: f64,
    pub quadratic_terms: Vec<QuadraticTerm>,
    pub variable_names: Vec<String>,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, coefficients: Vec<f64>) -> Self {
        let variable_names = (0..coefficients.len()).map(|i| format!("x{}", i)).collect();

        Self {
            optimization_type,
            coefficients,
            constant: 0.0,
            quadratic_terms: Vec::new(),
            variable_names,
        }
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.variable_names = names;
        self
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    pub fn with_quadratic_terms(mut self, terms: Vec<QuadraticTerm>) -> Self {
        self.quadratic_terms = terms;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_linear(&self) -> bool {
        self.quadratic_terms.is_empty()
    }

    /// Value of the objective at `values`, including the constant and quadratic parts
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let linear: f64 = self
            .coefficients
            .iter()
            .zip(values)
            .map(|(coeff, value)| coeff * value)
            .sum();
        let quadratic: f64 = self
            .quadratic_terms
            .iter()
            .map(|term| term.coefficient * values[term.first] * values[term.second])
            .sum();

        self.constant + linear + quadratic
    }
}

/// Linear constraint on variables
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub coefficients: Vec<f64>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, coefficients: Vec<f64>, bound: f64) -> Self {
        Self {
            constraint_type,
            coefficients,
            bound,
            name: String::new(),
        }
    }

    /// Build a dense constraint over `num_vars` columns from `(column, coefficient)` pairs
    pub fn from_terms(
        constraint_type: ConstraintType,
        num_vars: usize,
        terms: &[(usize, f64)],
        bound: f64,
    ) -> Self {
        let mut coefficients = vec![0.0; num_vars];
        for &(column, coeff) in terms {
            coefficients[column] += coeff;
        }
        Self::new(constraint_type, coefficients, bound)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coeff, value)| coeff * value)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.constraint_type
            .holds(self.lhs(values), self.bound, tolerance)
    }
}

/// Complete optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationProblem {
    pub name: String,
    pub description: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            objective,
            constraints: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.objective.num_variables()
    }

    pub fn is_linear(&self) -> bool {
        self.objective.is_linear()
    }

    /// Check bounds and constraints at `values`
    pub fn is_feasible_point(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.num_variables()
            && self
                .variables
                .iter()
                .zip(values)
                .all(|(var, &value)| var.contains(value, tolerance))
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(values, tolerance))
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
}

impl SolverStatistics {
    pub fn for_problem(problem: &OptimizationProblem, solve_time_ms: f64) -> Self {
        Self {
            solve_time_ms,
            num_variables: problem.num_variables() as u32,
            num_constraints: problem.constraints.len() as u32,
        }
    }
}

/// Solution to an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
