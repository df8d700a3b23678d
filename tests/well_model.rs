#![cfg(feature = "highs")]

use std::io::Write;
use std::path::Path;

use approx::assert_relative_eq;
use wellopt::cooling::{Interval, McCormickEnvelope, ScenarioDefaults};
use wellopt::{
    optimise, CoolingError, CoolingParameters, CoolingRequest, HighsSolver, Horizon,
    HourlyRequest, LoadProfile, ObjectiveForm, ReferenceData, SolutionReport, YearlyRequest,
};

fn yearly_params() -> CoolingParameters {
    CoolingParameters {
        surface_temp: 25.0,
        target_dc_temp: 27.0,
        temp_gradient: 0.07,
        cooling_coefficient: 2000.0,
        min_flow: 0.0,
        max_flow: 6.0,
        min_depth: 15.0,
        max_depth: 80.0,
        initial_volume: 1000.0,
        leakage_rate: 0.05,
        energy_cost: 0.10,
        water_cost: 2.00,
        period_hours: 720.0,
        pump_efficiency: 0.7,
        fluid_density: 1000.0,
        gravity: 9.81,
    }
}

fn monthly_request(params: CoolingParameters, load_kw: f64) -> CoolingRequest {
    let profile = LoadProfile::constant(Horizon::Monthly, load_kw).unwrap();
    CoolingRequest::new(profile, params)
}

fn solve(request: &CoolingRequest) -> SolutionReport {
    optimise(&HighsSolver::new(), request).unwrap()
}

/// Optimum of the relaxation when shallow water is cheapest: every period
/// runs at the flow that just meets its load with `z = Q·D_min`.
fn expected_cost(params: &CoolingParameters, load_kw: f64) -> f64 {
    let depth = params.min_depth;
    let flow = load_kw
        / (params.cooling_coefficient
            * (params.temp_headroom() + params.temp_gradient * depth));
    params.uniform_cost(Horizon::Monthly.periods(), flow, depth)
}

#[test]
fn yearly_scenario_stays_within_bounds_and_below_worst_case() {
    let params = yearly_params();
    let report = solve(&monthly_request(params.clone(), 3000.0));

    assert!((15.0..=80.0).contains(&report.well_depth));
    assert_eq!(report.periods.len(), 12);
    for period in &report.periods {
        assert!(period.flow >= -1e-9 && period.flow <= 6.0 + 1e-9);
    }
    assert!(report.total_cost < params.uniform_cost(12, 6.0, 80.0));
    assert_relative_eq!(
        report.total_cost,
        expected_cost(&params, 3000.0),
        max_relative = 1e-6
    );
}

#[test]
fn solution_satisfies_cooling_and_envelope() {
    let params = yearly_params();
    let request = monthly_request(params.clone(), 3000.0);
    let report = solve(&request);
    let envelope = McCormickEnvelope::new(
        Interval::new(params.min_flow, params.max_flow),
        Interval::new(params.min_depth, params.max_depth),
    );

    let depth = report.well_depth;
    for period in &report.periods {
        // Flow alone delivers the headroom share; the remainder is the depth share
        let by_flow = params.cooling_coefficient * params.temp_headroom() * period.flow;
        let product_needed = (period.it_load_kw - by_flow)
            / (params.cooling_coefficient * params.temp_gradient);
        assert!(envelope.bounds_at(period.flow, depth).hi >= product_needed - 1e-6);

        if envelope.is_on_edge(period.flow, depth, 1e-9) {
            let range = envelope.bounds_at(period.flow, depth);
            assert_relative_eq!(range.lo, range.hi, epsilon = 1e-6);
        }
    }
    assert!(report.relaxation_gap >= 0.0);
}

#[test]
fn reported_costs_match_objective_and_meet_target() {
    for (params, load_kw) in [
        (yearly_params(), 3000.0),
        (
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
            },
            100.0,
        ),
    ] {
        let horizon = if params.period_hours == 1.0 {
            Horizon::Hourly
        } else {
            Horizon::Monthly
        };
        let profile = LoadProfile::constant(horizon, load_kw).unwrap();
        let report = solve(&CoolingRequest::new(profile, params.clone()));

        assert_relative_eq!(
            report.energy_cost + report.water_cost,
            report.total_cost,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            report.periods.last().unwrap().cumulative_cost,
            report.total_cost,
            max_relative = 1e-6
        );
        for period in &report.periods {
            if let Some(temp) = period.estimated_dc_temp {
                assert!(temp <= params.target_dc_temp + 1e-4, "{} > target", temp);
            }
        }
    }
}

#[test]
fn total_cost_is_monotone_in_energy_price() {
    let mut last = f64::NEG_INFINITY;
    for energy_cost in [0.05, 0.10, 0.20, 0.40] {
        let params = CoolingParameters {
            energy_cost,
            ..yearly_params()
        };
        let report = solve(&monthly_request(params, 3000.0));
        assert!(report.total_cost >= last - 1e-6);
        last = report.total_cost;
    }
}

#[test]
fn repeated_solves_agree() {
    let request = monthly_request(yearly_params(), 3000.0);
    let first = solve(&request);
    let second = solve(&request);
    assert_eq!(first, second);
}

#[test]
fn idle_pump_has_no_temperature() {
    let report = solve(&monthly_request(yearly_params(), 0.0));

    for period in &report.periods {
        assert!(period.flow.abs() < 1e-9);
        assert_eq!(period.estimated_dc_temp, None);
    }
    assert_eq!(report.efficiency_percent, None);
    assert_eq!(report.circulation_temp, None);
    assert_relative_eq!(report.total_cost, 2000.0, epsilon = 1e-6);
}

#[test]
fn bilinear_objective_is_refused_by_lp_backend() {
    let request =
        monthly_request(yearly_params(), 3000.0).with_form(ObjectiveForm::Bilinear);
    let err = optimise(&HighsSolver::new(), &request).unwrap_err();
    assert!(matches!(err, CoolingError::OptimizationFailed { .. }));
}

#[test]
fn unreachable_load_is_reported_infeasible() {
    let params = CoolingParameters {
        max_flow: 0.001,
        ..yearly_params()
    };
    let err = optimise(&HighsSolver::new(), &monthly_request(params, 3000.0)).unwrap_err();
    assert!(matches!(err, CoolingError::OptimizationFailed { .. }));
}

#[test]
fn yearly_request_compares_against_client_figures() {
    let request = YearlyRequest {
        annual_energy_conventional: 500_000.0,
        annual_water_conventional: 10_000.0,
        avg_it_load: 3000.0,
        evaporation_rate: 0.05,
        energy_cost: 0.10,
        water_cost: 2.00,
        ambient_temp: 25.0,
    }
    .into_cooling_request(&ScenarioDefaults::yearly())
    .unwrap();
    let report = solve(&request);
    let comparison = &report.comparison;

    assert_relative_eq!(comparison.conventional_cost, 70_000.0, max_relative = 1e-12);
    assert_eq!(comparison.savings, comparison.conventional_cost - report.total_cost);
    assert_eq!(
        comparison.water_saved_m3,
        (comparison.conventional_water_m3 - report.net_water_m3).max(0.0)
    );
    assert_eq!(comparison.conventional_cumulative_cost.len(), 12);

    let cumulative: Vec<f64> = report.periods.iter().map(|p| p.cumulative_cost).collect();
    assert!(cumulative.windows(2).all(|w| w[1] >= w[0]));
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

#[test]
fn hourly_request_runs_on_reference_data() {
    let dir = tempfile::tempdir().unwrap();

    let mut conventional = String::from(
        "Time,Pump_Energy_kWh,Makeup_Water_Usage_m3,Evaporative_Loss_Percent,Pump_Flow_Rate_m3s\n",
    );
    let mut well = String::from("Time,IT_Load_kW\n");
    for hour in 0..24 {
        conventional.push_str(&format!("{},5.0,0.01,1.0,0.0002\n", hour));
        well.push_str(&format!("{},{}\n", hour, 40.0 + hour as f64));
    }
    write_file(dir.path(), "conventional_datacentre.csv", &conventional);
    write_file(dir.path(), "underground_well_datacentre.csv", &well);

    let reference = ReferenceData::load_dir(dir.path());
    let request = HourlyRequest {
        surface_temp: 20.0,
        max_flow: 0.05,
        initial_volume: 100.0,
        humidity: 55.0,
        wind_speed: 2.0,
        evap_override: None,
        it_load_kw: Vec::new(),
    }
    .into_cooling_request(&ScenarioDefaults::hourly(), &reference)
    .unwrap();

    assert_eq!(request.profile.loads()[23], 63.0);
    // 0.01 · 0.0002 m³/s · 3.6e6 → 7.2 L/h
    assert_relative_eq!(request.params.leakage_rate, 0.0072, max_relative = 1e-9);

    let report = solve(&request);
    assert_eq!(report.periods.len(), 24);
    assert!((15.0..=150.0).contains(&report.well_depth));
    for period in &report.periods {
        assert!(period.flow >= 0.003 - 1e-9 && period.flow <= 0.05 + 1e-9);
        assert!(period.estimated_dc_temp.is_some());
    }
    assert!(report.efficiency_percent.is_some());
    assert_relative_eq!(report.comparison.conventional_energy_kwh, 120.0, max_relative = 1e-9);
    assert!(report.comparison.water_saved_m3 >= 0.0);
    // 0.01 · 200 = 2 m³ a hour against a 100 m³ fill
    assert_eq!(report.comparison.break_even_period, None);
}
