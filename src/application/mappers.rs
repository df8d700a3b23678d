// Mappers: Convert between gRPC protobuf types and the cooling model
// Keeps protobuf types out of the optimisation code

use crate::cooling::{CoolingError, HourlyRequest, PeriodResult, SolutionReport, YearlyRequest};
use tonic::Status;

pub mod wellopt {
    tonic::include_proto!("wellopt");
}

use wellopt as proto;

/// m³/s → L/min
const LITRES_PER_MINUTE: f64 = 60_000.0;
const LITRES_PER_M3: f64 = 1000.0;

pub fn proto_to_hourly_request(request: proto::HourlyModelRequest) -> HourlyRequest {
    HourlyRequest {
        surface_temp: request.surface_temp,
        max_flow: request.max_flow,
        initial_volume: request.initial_volume,
        humidity: request.humidity,
        wind_speed: request.wind_speed,
        evap_override: request.evap_override,
        it_load_kw: request.it_load_kw,
    }
}

pub fn proto_to_yearly_request(request: proto::YearlyModelRequest) -> YearlyRequest {
    YearlyRequest {
        annual_energy_conventional: request.annual_energy_conventional,
        annual_water_conventional: request.annual_water_conventional,
        avg_it_load: request.avg_it_load,
        evaporation_rate: request.evaporation_rate,
        energy_cost: request.energy_cost,
        water_cost: request.water_cost,
        ambient_temp: request.ambient_temp,
    }
}

pub fn report_to_hourly_response(
    report: &SolutionReport,
    reference_available: bool,
) -> proto::HourlyModelResponse {
    proto::HourlyModelResponse {
        well_depth_m: report.well_depth,
        reservoir_temp_c: report.well_temp,
        circulation_temp_c: report.circulation_temp,
        avg_flow_rate_lpm: report.avg_flow * LITRES_PER_MINUTE,
        efficiency_percent: report.efficiency_percent,
        water_saved_l: report.comparison.water_saved_m3 * LITRES_PER_M3,
        total_cost: report.total_cost,
        relaxation_gap: report.relaxation_gap,
        reference_available,
        periods: report.periods.iter().map(period_to_proto).collect(),
        comparison: Some(comparison_to_proto(report)),
    }
}

fn period_to_proto(period: &PeriodResult) -> proto::PeriodRecord {
    proto::PeriodRecord {
        index: period.index as u32,
        it_load_kw: period.it_load_kw,
        flow_m3s: period.flow,
        energy_kwh: period.energy_kwh,
        estimated_dc_temp_c: period.estimated_dc_temp,
        cumulative_energy_kwh: period.cumulative_energy_kwh,
        cumulative_water_m3: period.cumulative_water_m3,
        cumulative_cost: period.cumulative_cost,
    }
}

fn comparison_to_proto(report: &SolutionReport) -> proto::Comparison {
    let comparison = &report.comparison;

    proto::Comparison {
        conventional_energy_kwh: comparison.conventional_energy_kwh,
        conventional_water_m3: comparison.conventional_water_m3,
        conventional_cost: comparison.conventional_cost,
        well_energy_kwh: report.total_energy_kwh,
        well_water_m3: report.net_water_m3,
        well_cost: report.total_cost,
        savings: comparison.savings,
        water_saved_m3: comparison.water_saved_m3,
        conventional_cumulative_cost: comparison.conventional_cumulative_cost.clone(),
        conventional_cumulative_water: comparison.conventional_cumulative_water_m3.clone(),
        conventional_cumulative_energy: comparison.conventional_cumulative_energy_kwh.clone(),
        break_even_period: comparison.break_even_period.map(|period| period as u32),
    }
}

pub fn report_to_yearly_response(report: &SolutionReport) -> proto::YearlyModelResponse {
    proto::YearlyModelResponse {
        well_depth_m: report.well_depth,
        well_temp_c: report.well_temp,
        periods: report.periods.iter().map(period_to_proto).collect(),
        efficiency_percent: report.efficiency_percent,
        comparison: Some(comparison_to_proto(report)),
        relaxation_gap: report.relaxation_gap,
    }
}

/// A single error message, never partial metrics
pub fn error_to_status(err: CoolingError) -> Status {
    match err {
        CoolingError::InvalidInput(_) => Status::invalid_argument(err.to_string()),
        CoolingError::OptimizationFailed { .. } => Status::failed_precondition(err.to_string()),
        CoolingError::MissingReferenceData(_) => Status::internal(err.to_string()),
    }
}
