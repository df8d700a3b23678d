use tracing::{debug, info, warn};

use super::baseline::ConventionalBaseline;
use super::builder::{build, ObjectiveForm};
use super::error::{CoolingError, Result};
use super::extractor::{extract, SolutionReport};
use super::params::{CoolingParameters, LoadProfile};
use crate::domain::SolverService;

/// Everything needed for one build/solve/extract cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingRequest {
    pub profile: LoadProfile,
    pub params: CoolingParameters,
    pub baseline: ConventionalBaseline,
    pub form: ObjectiveForm,
}

impl CoolingRequest {
    pub fn new(profile: LoadProfile, params: CoolingParameters) -> Self {
        Self {
            profile,
            params,
            baseline: ConventionalBaseline::default(),
            form: ObjectiveForm::default(),
        }
    }

    pub fn with_baseline(mut self, baseline: ConventionalBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_form(mut self, form: ObjectiveForm) -> Self {
        self.form = form;
        self
    }
}

/// Build the well model, solve it with `solver` and derive the report
///
/// Any non-optimal outcome, including a solver that refuses the model,
/// surfaces as [`CoolingError::OptimizationFailed`].
pub fn optimise(solver: &dyn SolverService, request: &CoolingRequest) -> Result<SolutionReport> {
    let model = build(&request.profile, &request.params, request.form)?;

    info!(
        solver = solver.name(),
        horizon = %request.profile.horizon(),
        variables = model.problem.num_variables(),
        constraints = model.problem.constraints.len(),
        "solving well cooling model"
    );

    let solution = solver.solve(&model.problem).map_err(|err| {
        warn!(solver = solver.name(), error = %err, "solver rejected well cooling model");
        CoolingError::from(err)
    })?;

    debug!(
        status = %solution.status,
        solve_time_ms = solution.statistics.solve_time_ms,
        "solver finished"
    );

    if !solution.is_optimal() {
        warn!(status = %solution.status, message = %solution.message, "no optimal well design");
        return Err(CoolingError::OptimizationFailed {
            status: solution.status,
            message: solution.message,
        });
    }

    let report = extract(
        &solution,
        &model,
        &request.profile,
        &request.params,
        &request.baseline,
    )?;

    info!(
        depth_m = report.well_depth,
        total_cost = report.total_cost,
        savings = report.comparison.savings,
        relaxation_gap = report.relaxation_gap,
        "optimal well design found"
    );

    Ok(report)
}
