//! Builds the linear well-cooling model for one request.
//!
//! Columns are laid out as `[Q_0, z_0, Q_1, z_1, ..., Q_{n-1}, z_{n-1}, D]`
//! where `Q_t` is the pump flow in period `t`, `z_t` stands for `Q_t·D` and
//! `D` is the well depth shared by every period.
//!
//! The true cooling requirement
//! `T_surface − alpha·D + load_t / (K·Q_t) ≤ T_target`
//! is multiplied through by `Q_t` and written as
//! `K·(A·Q_t + alpha·z_t) ≥ load_t` with `A = T_target − T_surface`.
//! The McCormick envelope then ties `z_t` back to `Q_t` and `D`.

use tracing::debug;

use super::envelope::{Interval, McCormickEnvelope};
use super::error::Result;
use super::params::{CoolingParameters, LoadProfile};
use crate::domain::{
    Constraint, ConstraintType, ObjectiveFunction, OptimizationProblem, OptimizationType,
    QuadraticTerm, Variable,
};

/// How the pump energy term `Q_t·D` enters the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveForm {
    /// Substitute `z_t` for `Q_t·D`. Purely linear; any LP backend can solve it.
    #[default]
    Linearised,
    /// Keep `Q_t·D` as a quadratic term. Needs a backend with `supports_quadratic()`.
    Bilinear,
}

/// Column positions of the decision variables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    periods: usize,
}

impl VariableLayout {
    pub fn new(periods: usize) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn flow(&self, t: usize) -> usize {
        2 * t
    }

    pub fn product(&self, t: usize) -> usize {
        2 * t + 1
    }

    pub fn depth(&self) -> usize {
        2 * self.periods
    }

    pub fn num_variables(&self) -> usize {
        2 * self.periods + 1
    }
}

/// A built model together with the layout needed to read its solution
#[derive(Debug, Clone, PartialEq)]
pub struct WellModel {
    pub problem: OptimizationProblem,
    pub layout: VariableLayout,
    pub form: ObjectiveForm,
}

/// Validate `params` and emit the model. Nothing is built if validation fails.
pub fn build(
    profile: &LoadProfile,
    params: &CoolingParameters,
    form: ObjectiveForm,
) -> Result<WellModel> {
    params.validate()?;

    let layout = VariableLayout::new(profile.len());
    let n = layout.num_variables();
    let envelope = McCormickEnvelope::new(
        Interval::new(params.min_flow, params.max_flow),
        Interval::new(params.min_depth, params.max_depth),
    );

    let mut variables = vec![Variable::continuous(""); n];
    let mut constraints = Vec::with_capacity(5 * layout.periods());

    for (t, load) in profile.iter() {
        let (q, z, d) = (layout.flow(t), layout.product(t), layout.depth());

        variables[q] = Variable::continuous(format!("Q_{}", t))
            .with_bounds(params.min_flow, Some(params.max_flow));
        variables[z] = Variable::continuous(format!("z_{}", t))
            .with_bounds(0.0, Some(params.max_flow * params.max_depth));

        constraints.push(
            Constraint::from_terms(
                ConstraintType::GreaterThanOrEqual,
                n,
                &[
                    (q, params.cooling_coefficient * params.temp_headroom()),
                    (z, params.cooling_coefficient * params.temp_gradient),
                ],
                load,
            )
            .with_name(format!("Cooling_{}", t)),
        );

        // z - a·Q - b·D <sense> c
        for (k, plane) in envelope.planes().iter().enumerate() {
            constraints.push(
                Constraint::from_terms(
                    plane.sense,
                    n,
                    &[(z, 1.0), (q, -plane.x_coef), (d, -plane.y_coef)],
                    plane.constant,
                )
                .with_name(format!("McCormick{}_{}", k + 1, t)),
            );
        }
    }

    variables[layout.depth()] =
        Variable::continuous("Depth").with_bounds(params.min_depth, Some(params.max_depth));

    let names = variables.iter().map(|var| var.name.clone()).collect();
    let objective = objective(&layout, params, form).with_names(names);

    debug!(
        periods = layout.periods(),
        variables = n,
        constraints = constraints.len(),
        ?form,
        "built well cooling model"
    );

    let problem = OptimizationProblem::new(objective)
        .with_name("Underground_Well_Model")
        .with_description(format!(
            "{}-period well cooling, depth {}..{} m",
            layout.periods(),
            params.min_depth,
            params.max_depth
        ))
        .with_variables(variables)
        .with_constraints(constraints);

    Ok(WellModel {
        problem,
        layout,
        form,
    })
}

/// `Σ_t Q_t·D·e·c_energy + (V + leak·Σ_t Q_t·Δt)·c_water`
fn objective(
    layout: &VariableLayout,
    params: &CoolingParameters,
    form: ObjectiveForm,
) -> ObjectiveFunction {
    let energy_coef = params.energy_per_flow_depth() * params.energy_cost;
    let water_coef = params.leakage_rate * params.period_hours * params.water_cost;

    let mut coefficients = vec![0.0; layout.num_variables()];
    let mut quadratic = Vec::new();

    for t in 0..layout.periods() {
        coefficients[layout.flow(t)] = water_coef;
        match form {
            ObjectiveForm::Linearised => coefficients[layout.product(t)] = energy_coef,
            ObjectiveForm::Bilinear => quadratic.push(QuadraticTerm {
                first: layout.flow(t),
                second: layout.depth(),
                coefficient: energy_coef,
            }),
        }
    }

    ObjectiveFunction::new(OptimizationType::Minimize, coefficients)
        .with_constant(params.initial_volume * params.water_cost)
        .with_quadratic_terms(quadratic)
}
