//! Turns a solved model back into physical and financial metrics.

use super::baseline::ConventionalBaseline;
use super::builder::{ObjectiveForm, WellModel};
use super::error::{CoolingError, Result};
use super::params::{CoolingParameters, Horizon, LoadProfile};
use crate::domain::{Solution, SolutionStatus};
use tracing::debug;

/// Flows at or below this are treated as "pump off"; no temperature is derived for them.
pub const FLOW_EPSILON: f64 = 1e-6;

/// Outcome of one period at the optimum
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodResult {
    pub index: usize,
    pub it_load_kw: f64,
    /// m³/s
    pub flow: f64,
    pub energy_kwh: f64,
    /// `None` when the pump is effectively off
    pub estimated_dc_temp: Option<f64>,
    pub cumulative_energy_kwh: f64,
    pub cumulative_water_m3: f64,
    pub cumulative_cost: f64,
}

/// Conventional system against the well solution
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub conventional_energy_kwh: f64,
    pub conventional_water_m3: f64,
    pub conventional_cost: f64,
    pub conventional_cumulative_energy_kwh: Vec<f64>,
    pub conventional_cumulative_water_m3: Vec<f64>,
    pub conventional_cumulative_cost: Vec<f64>,
    /// First period whose conventional cumulative water reaches the well's initial fill
    pub break_even_period: Option<usize>,
    /// `conventional_cost − total_cost`; negative when the well is dearer
    pub savings: f64,
    /// `max(0, conventional_water − net_water)`
    pub water_saved_m3: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolutionReport {
    pub horizon: Horizon,
    pub well_depth: f64,
    pub well_temp: f64,
    pub periods: Vec<PeriodResult>,
    pub total_energy_kwh: f64,
    pub total_pumped_m3: f64,
    pub net_water_m3: f64,
    pub energy_cost: f64,
    pub water_cost: f64,
    /// Optimal objective value reported by the solver
    pub total_cost: f64,
    pub efficiency_percent: Option<f64>,
    pub avg_flow: f64,
    /// Estimated temperature of the last period that had flow
    pub circulation_temp: Option<f64>,
    /// `Σ_t |Q_t·D − z_t|`, zero when the envelope is tight
    pub relaxation_gap: f64,
    pub comparison: Comparison,
}

/// Read the optimum out of `solution`. Does not touch the model.
///
/// Energy is taken from the flow×depth quantity the objective priced, so
/// `energy_cost + water_cost` equals `total_cost`. Under the linearised form
/// the depth column carries no cost and is not unique at the optimum; the
/// reported depth is the flow-weighted effective depth `Σ z_t / Σ Q_t`, and
/// each period's temperature uses its own `z_t / Q_t`.
pub fn extract(
    solution: &Solution,
    model: &WellModel,
    profile: &LoadProfile,
    params: &CoolingParameters,
    baseline: &ConventionalBaseline,
) -> Result<SolutionReport> {
    if !solution.is_optimal() {
        return Err(CoolingError::OptimizationFailed {
            status: solution.status,
            message: solution.message.clone(),
        });
    }

    let layout = model.layout;
    let values = &solution.variable_values;
    if layout.periods() != profile.len() {
        return Err(CoolingError::OptimizationFailed {
            status: SolutionStatus::Error,
            message: format!(
                "load profile has {} periods but the model was built for {}",
                profile.len(),
                layout.periods()
            ),
        });
    }
    if values.len() != layout.num_variables() {
        return Err(CoolingError::OptimizationFailed {
            status: SolutionStatus::Error,
            message: format!(
                "solver returned {} values for a model with {} variables",
                values.len(),
                layout.num_variables()
            ),
        });
    }

    let solver_depth = values[layout.depth()];
    let priced: Vec<(f64, f64)> = (0..layout.periods())
        .map(|t| {
            let flow = values[layout.flow(t)];
            let product = match model.form {
                ObjectiveForm::Linearised => values[layout.product(t)],
                ObjectiveForm::Bilinear => flow * solver_depth,
            };
            (flow, product)
        })
        .collect();

    let depth = match model.form {
        ObjectiveForm::Linearised => effective_depth(&priced, params),
        ObjectiveForm::Bilinear => solver_depth,
    };
    let well_temp = params.well_temp(depth);

    let mut periods = Vec::with_capacity(profile.len());
    let mut cumulative_energy = 0.0;
    let mut cumulative_pumped = 0.0;
    let mut cumulative_cost = params.initial_volume * params.water_cost;
    let mut relaxation_gap = 0.0;

    for ((t, load), &(flow, product)) in profile.iter().zip(&priced) {
        let energy = product * params.energy_per_flow_depth();
        let pumped = flow * params.period_hours;

        cumulative_energy += energy;
        cumulative_pumped += pumped;
        cumulative_cost +=
            energy * params.energy_cost + params.leakage_rate * pumped * params.water_cost;
        relaxation_gap += (flow * depth - values[layout.product(t)]).abs();

        let estimated_dc_temp = (flow > FLOW_EPSILON).then(|| {
            params.well_temp(product / flow) + load / (params.cooling_coefficient * flow)
        });

        periods.push(PeriodResult {
            index: t,
            it_load_kw: load,
            flow,
            energy_kwh: energy,
            estimated_dc_temp,
            cumulative_energy_kwh: cumulative_energy,
            cumulative_water_m3: params.net_water(cumulative_pumped),
            cumulative_cost,
        });
    }

    if (depth - solver_depth).abs() > 1e-6 {
        debug!(
            solver_depth,
            effective_depth = depth,
            "depth column not tight, reporting effective depth"
        );
    }

    let net_water = params.net_water(cumulative_pumped);
    let total_cost = solution
        .optimal_value
        .unwrap_or_else(|| model.problem.objective.evaluate(values));

    let cooling_output_kwh: f64 =
        profile.loads().iter().sum::<f64>() * params.period_hours / 1000.0;
    let efficiency_percent =
        (cumulative_energy > 0.0).then(|| cooling_output_kwh / cumulative_energy * 100.0);

    let avg_flow = if periods.is_empty() {
        0.0
    } else {
        periods.iter().map(|p| p.flow).sum::<f64>() / periods.len() as f64
    };
    let circulation_temp = periods.iter().rev().find_map(|p| p.estimated_dc_temp);

    let comparison = Comparison {
        conventional_energy_kwh: baseline.energy_kwh,
        conventional_water_m3: baseline.water_m3,
        conventional_cost: baseline.cost(params),
        conventional_cumulative_energy_kwh: baseline.cumulative_energy_kwh.clone(),
        conventional_cumulative_water_m3: baseline.cumulative_water_m3.clone(),
        conventional_cumulative_cost: baseline.cumulative_cost(params),
        break_even_period: baseline.break_even_period(params.initial_volume),
        savings: baseline.cost(params) - total_cost,
        water_saved_m3: (baseline.water_m3 - net_water).max(0.0),
    };

    Ok(SolutionReport {
        horizon: profile.horizon(),
        well_depth: depth,
        well_temp,
        periods,
        total_energy_kwh: cumulative_energy,
        total_pumped_m3: cumulative_pumped,
        net_water_m3: net_water,
        energy_cost: cumulative_energy * params.energy_cost,
        water_cost: net_water * params.water_cost,
        total_cost,
        efficiency_percent,
        avg_flow,
        circulation_temp,
        relaxation_gap,
        comparison,
    })
}

/// `Σ z_t / Σ Q_t`, or the shallowest depth when nothing is pumped
fn effective_depth(priced: &[(f64, f64)], params: &CoolingParameters) -> f64 {
    let (flow, product) = priced
        .iter()
        .fold((0.0, 0.0), |(q, z), &(flow, product)| (q + flow, z + product));
    if flow > FLOW_EPSILON {
        (product / flow).clamp(params.min_depth, params.max_depth)
    } else {
        params.min_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooling::builder::{build, ObjectiveForm};
    use crate::cooling::params::fixtures::yearly_params;
    use approx::assert_relative_eq;

    fn solved(flow: f64, depth: f64, params: &CoolingParameters) -> (WellModel, Solution) {
        let profile = LoadProfile::constant(Horizon::Monthly, 3000.0).unwrap();
        let model = build(&profile, params, ObjectiveForm::Linearised).unwrap();
        let mut values = vec![0.0; model.layout.num_variables()];
        for t in 0..model.layout.periods() {
            values[model.layout.flow(t)] = flow;
            values[model.layout.product(t)] = flow * depth;
        }
        values[model.layout.depth()] = depth;
        let objective = model.problem.objective.evaluate(&values);
        (model, Solution::optimal(objective, values))
    }

    fn monthly_profile() -> LoadProfile {
        LoadProfile::constant(Horizon::Monthly, 3000.0).unwrap()
    }

    #[test]
    fn derives_temperatures_from_depth_and_flow() {
        let params = yearly_params();
        let (model, solution) = solved(0.5, 20.0, &params);
        let report = extract(
            &solution,
            &model,
            &monthly_profile(),
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap();

        // 25 - 0.07·20
        assert_relative_eq!(report.well_temp, 23.6, max_relative = 1e-12);
        // 23.6 + 3000 / (2000·0.5)
        let temp = report.periods[0].estimated_dc_temp.unwrap();
        assert_relative_eq!(temp, 26.6, max_relative = 1e-12);
        assert_eq!(report.circulation_temp, Some(temp));
        assert_relative_eq!(report.relaxation_gap, 0.0);
    }

    #[test]
    fn cumulative_trajectories_end_at_totals() {
        let params = yearly_params();
        let (model, solution) = solved(0.5, 20.0, &params);
        let report = extract(
            &solution,
            &model,
            &monthly_profile(),
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap();

        let last = report.periods.last().unwrap();
        assert_relative_eq!(last.cumulative_energy_kwh, report.total_energy_kwh);
        // 1000 + 0.05·(12·0.5·720)
        assert_relative_eq!(last.cumulative_water_m3, 1216.0, max_relative = 1e-12);
        assert_relative_eq!(last.cumulative_cost, report.total_cost, max_relative = 1e-9);
        assert_relative_eq!(report.periods[0].cumulative_water_m3, 1018.0, max_relative = 1e-12);
    }

    #[test]
    fn zero_flow_leaves_temperature_undefined() {
        let params = yearly_params();
        let (model, solution) = solved(0.0, 15.0, &params);
        let report = extract(
            &solution,
            &model,
            &monthly_profile(),
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap();

        assert!(report.periods.iter().all(|p| p.estimated_dc_temp.is_none()));
        assert_eq!(report.circulation_temp, None);
        assert_eq!(report.efficiency_percent, None);
        assert_eq!(report.total_energy_kwh, 0.0);
    }

    #[test]
    fn efficiency_compares_cooling_output_with_pump_energy() {
        let params = yearly_params();
        let (model, solution) = solved(0.5, 20.0, &params);
        let report = extract(
            &solution,
            &model,
            &monthly_profile(),
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap();

        let output = 12.0 * 3000.0 * 720.0 / 1000.0;
        let expected = output / report.total_energy_kwh * 100.0;
        assert_relative_eq!(report.efficiency_percent.unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn savings_are_not_clamped() {
        let params = yearly_params();
        let (model, solution) = solved(0.5, 20.0, &params);
        let cheap = ConventionalBaseline::totals(10.0, 10.0);
        let report = extract(&solution, &model, &monthly_profile(), &params, &cheap).unwrap();

        let conventional = 10.0 * 0.10 + 10.0 * 2.00;
        assert_eq!(report.comparison.savings, conventional - report.total_cost);
        assert!(report.comparison.savings < 0.0);
        assert_eq!(report.comparison.water_saved_m3, 0.0);
    }

    #[test]
    fn water_saved_is_clamped_difference() {
        let params = yearly_params();
        let (model, solution) = solved(0.5, 20.0, &params);
        let thirsty = ConventionalBaseline::evenly_spread(500_000.0, 10_000.0, 12);
        let report = extract(&solution, &model, &monthly_profile(), &params, &thirsty).unwrap();

        assert_eq!(
            report.comparison.water_saved_m3,
            (10_000.0 - report.net_water_m3).max(0.0)
        );
        assert_eq!(report.comparison.conventional_cumulative_cost.len(), 12);
        assert!(report.comparison.water_saved_m3 > 0.0);
    }

    #[test]
    fn non_optimal_solution_is_an_optimization_failure() {
        let params = yearly_params();
        let (model, _) = solved(0.5, 20.0, &params);
        let infeasible = Solution::new(SolutionStatus::Infeasible, "no feasible point");
        let err = extract(
            &infeasible,
            &model,
            &monthly_profile(),
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CoolingError::OptimizationFailed { status: SolutionStatus::Infeasible, .. }
        ));
    }

    fn hourly_params() -> CoolingParameters {
        CoolingParameters {
            surface_temp: 25.0,
            target_dc_temp: 24.0,
            temp_gradient: 0.1,
            max_flow: 0.05,
            max_depth: 150.0,
            initial_volume: 100.0,
            leakage_rate: 0.01,
            energy_cost: 0.1,
            water_cost: 1.0,
            period_hours: 1.0,
            ..yearly_params()
        }
    }

    /// Same flows and products with the depth column anywhere the envelope allows
    fn slack_depth_solution(model: &WellModel, depth_at: impl Fn(f64, f64) -> f64) -> Solution {
        let flow = 1.0 / 280.0;
        let product = 10.0 * flow + 0.5;
        let mut values = vec![0.0; model.layout.num_variables()];
        for t in 0..model.layout.periods() {
            values[model.layout.flow(t)] = flow;
            values[model.layout.product(t)] = product;
        }
        values[model.layout.depth()] = depth_at(flow, product);
        assert!(model.problem.is_feasible_point(&values, 1e-9));
        Solution::optimal(model.problem.objective.evaluate(&values), values)
    }

    #[test]
    fn equally_optimal_depths_give_one_report() {
        let params = hourly_params();
        let profile = LoadProfile::constant(Horizon::Hourly, 100.0).unwrap();
        let model = build(&profile, &params, ObjectiveForm::Linearised).unwrap();
        let baseline = ConventionalBaseline::default();

        // Shallowest depth the third envelope plane admits, and the deepest
        let shallow = slack_depth_solution(&model, |q, z| (z - 15.0 * q + 0.75) / 0.05);
        let deep = slack_depth_solution(&model, |_, _| 150.0);
        assert_relative_eq!(
            shallow.optimal_value.unwrap(),
            deep.optimal_value.unwrap(),
            max_relative = 1e-12
        );

        let from_shallow = extract(&shallow, &model, &profile, &params, &baseline).unwrap();
        let from_deep = extract(&deep, &model, &profile, &params, &baseline).unwrap();

        assert_relative_eq!(from_shallow.well_depth, 150.0, max_relative = 1e-9);
        assert_relative_eq!(from_shallow.well_depth, from_deep.well_depth, max_relative = 1e-12);
        assert_relative_eq!(from_shallow.relaxation_gap, 0.0, epsilon = 1e-9);
        assert_eq!(from_shallow.periods, from_deep.periods);
    }

    #[test]
    fn reported_costs_add_up_and_respect_target_temperature() {
        let params = hourly_params();
        let profile = LoadProfile::constant(Horizon::Hourly, 100.0).unwrap();
        let model = build(&profile, &params, ObjectiveForm::Linearised).unwrap();
        let solution = slack_depth_solution(&model, |q, z| (z - 15.0 * q + 0.75) / 0.05);
        let report = extract(
            &solution,
            &model,
            &profile,
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap();

        assert_relative_eq!(
            report.energy_cost + report.water_cost,
            report.total_cost,
            max_relative = 1e-9
        );
        let last = report.periods.last().unwrap();
        assert_relative_eq!(last.cumulative_cost, report.total_cost, max_relative = 1e-9);
        for period in &report.periods {
            let temp = period.estimated_dc_temp.unwrap();
            assert!(temp <= params.target_dc_temp + 1e-6, "period {} at {}", period.index, temp);
        }
    }

    #[test]
    fn comparison_carries_break_even_period() {
        let params = yearly_params();
        let (model, solution) = solved(0.5, 20.0, &params);
        // 1000 m³ initial fill against 10000/12 m³ a month
        let baseline = ConventionalBaseline::evenly_spread(500_000.0, 10_000.0, 12);
        let report = extract(&solution, &model, &monthly_profile(), &params, &baseline).unwrap();
        assert_eq!(report.comparison.break_even_period, Some(1));

        let empty = extract(
            &solution,
            &model,
            &monthly_profile(),
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap();
        assert_eq!(empty.comparison.break_even_period, None);
    }

    #[test]
    fn profile_length_mismatch_is_named() {
        let params = yearly_params();
        let (model, solution) = solved(0.5, 20.0, &params);
        let hourly = LoadProfile::constant(Horizon::Hourly, 3000.0).unwrap();
        let err = extract(
            &solution,
            &model,
            &hourly,
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("load profile has 24 periods"), "{}", err);
    }

    #[test]
    fn wrong_solution_length_is_rejected() {
        let params = yearly_params();
        let (model, _) = solved(0.5, 20.0, &params);
        let short = Solution::optimal(0.0, vec![1.0; 3]);
        let err = extract(
            &short,
            &model,
            &monthly_profile(),
            &params,
            &ConventionalBaseline::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoolingError::OptimizationFailed { .. }));
    }
}
