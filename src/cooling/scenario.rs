//! The two request shapes served by the optimizer.
//!
//! Both end up as a [`CoolingRequest`] for the same builder; they differ in
//! horizon, where the IT load and baseline come from, and their constants.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::baseline::ConventionalBaseline;
use super::error::{CoolingError, Result};
use super::optimizer::CoolingRequest;
use super::params::{CoolingParameters, Horizon, LoadProfile};
use crate::reference::ReferenceData;

/// Constants not supplied by the client
///
/// `max_flow`, `initial_volume`, `leakage_rate` and the prices are only used
/// where the request does not carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDefaults {
    pub target_dc_temp: f64,
    pub temp_gradient: f64,
    pub cooling_coefficient: f64,
    pub min_flow: f64,
    pub max_flow: f64,
    pub min_depth: f64,
    pub max_depth: f64,
    pub initial_volume: f64,
    pub leakage_rate: f64,
    pub energy_cost: f64,
    pub water_cost: f64,
    pub period_hours: f64,
    pub pump_efficiency: f64,
    pub fluid_density: f64,
    pub gravity: f64,
}

impl ScenarioDefaults {
    pub fn hourly() -> Self {
        Self {
            target_dc_temp: 24.0,
            temp_gradient: 0.1,
            cooling_coefficient: 2000.0,
            min_flow: 0.003,
            max_flow: 0.05,
            min_depth: 15.0,
            max_depth: 150.0,
            initial_volume: 100.0,
            leakage_rate: 0.01,
            energy_cost: 0.1,
            water_cost: 1.0,
            period_hours: Horizon::Hourly.period_hours(),
            pump_efficiency: 0.7,
            fluid_density: 1000.0,
            gravity: 9.81,
        }
    }

    pub fn yearly() -> Self {
        Self {
            target_dc_temp: 27.0,
            temp_gradient: 0.07,
            cooling_coefficient: 2000.0,
            min_flow: 0.0,
            max_flow: 6.0,
            min_depth: 15.0,
            max_depth: 80.0,
            initial_volume: 6000.0,
            leakage_rate: 0.05,
            energy_cost: 0.10,
            water_cost: 2.00,
            period_hours: Horizon::Monthly.period_hours(),
            pump_efficiency: 0.7,
            fluid_density: 1000.0,
            gravity: 9.81,
        }
    }

    fn parameters(&self, surface_temp: f64) -> CoolingParameters {
        CoolingParameters {
            surface_temp,
            target_dc_temp: self.target_dc_temp,
            temp_gradient: self.temp_gradient,
            cooling_coefficient: self.cooling_coefficient,
            min_flow: self.min_flow,
            max_flow: self.max_flow,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            initial_volume: self.initial_volume,
            leakage_rate: self.leakage_rate,
            energy_cost: self.energy_cost,
            water_cost: self.water_cost,
            period_hours: self.period_hours,
            pump_efficiency: self.pump_efficiency,
            fluid_density: self.fluid_density,
            gravity: self.gravity,
        }
    }
}

/// Constants for both scenarios. A section given in a TOML file replaces the
/// built-in one as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDefaults {
    #[serde(default = "ScenarioDefaults::hourly")]
    pub hourly: ScenarioDefaults,
    #[serde(default = "ScenarioDefaults::yearly")]
    pub yearly: ScenarioDefaults,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            hourly: ScenarioDefaults::hourly(),
            yearly: ScenarioDefaults::yearly(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid defaults file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ModelDefaults {
    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, DefaultsError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: &Path) -> std::result::Result<Self, DefaultsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DefaultsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

/// Dashboard run over one day of hourly periods
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HourlyRequest {
    /// °C
    pub surface_temp: f64,
    /// m³/s
    pub max_flow: f64,
    /// m³
    pub initial_volume: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    /// Evaporation (L/h) to use instead of the reference-derived mean
    pub evap_override: Option<f64>,
    /// Hourly IT load; empty means "take it from the reference well dataset"
    pub it_load_kw: Vec<f64>,
}

impl HourlyRequest {
    /// Resolve loads, evaporation and baseline, then assemble the model request
    ///
    /// Missing reference data is not an error here: the comparison is left
    /// empty and the leakage falls back to the configured default.
    pub fn into_cooling_request(
        self,
        defaults: &ScenarioDefaults,
        reference: &ReferenceData,
    ) -> Result<CoolingRequest> {
        require_non_negative(&[
            ("surface_temp", self.surface_temp),
            ("max_flow", self.max_flow),
            ("initial_volume", self.initial_volume),
            ("humidity", self.humidity),
            ("wind_speed", self.wind_speed),
        ])?;
        if self.max_flow == 0.0 {
            return Err(CoolingError::invalid(
                "Max pump flow rate must be greater than 0",
            ));
        }
        if let Some(evap) = self.evap_override {
            require_non_negative(&[("evap_override", evap)])?;
        }

        let loads = if self.it_load_kw.is_empty() {
            reference
                .well()
                .map_err(|err| {
                    CoolingError::invalid(format!("no hourly IT load supplied and {}", err))
                })?
                .it_load_kw
                .clone()
        } else {
            self.it_load_kw
        };
        let profile = LoadProfile::new(Horizon::Hourly, loads)?;

        let conventional = reference.conventional();
        let evap_lph = match (self.evap_override, &conventional) {
            (Some(evap), _) => Some(evap),
            (None, Ok(dataset)) => dataset.mean_evaporation_lph(),
            (None, Err(_)) => None,
        };
        let baseline = match conventional {
            Ok(dataset) => dataset.baseline(),
            Err(err) => {
                warn!(error = %err, "hourly comparison left empty");
                ConventionalBaseline::default()
            }
        };

        let mut params = defaults.parameters(self.surface_temp);
        params.max_flow = self.max_flow;
        params.min_flow = params.min_flow.min(self.max_flow);
        params.initial_volume = self.initial_volume;
        if let Some(evap) = evap_lph {
            params.leakage_rate = evap / 1000.0;
        }

        debug!(
            humidity = self.humidity,
            wind_speed = self.wind_speed,
            leakage_rate = params.leakage_rate,
            "hourly request resolved"
        );

        Ok(CoolingRequest::new(profile, params).with_baseline(baseline))
    }
}

/// Client-supplied annual figures for a conventional site
#[derive(Debug, Clone, PartialEq, Default)]
pub struct YearlyRequest {
    /// kWh/year
    pub annual_energy_conventional: f64,
    /// m³/year
    pub annual_water_conventional: f64,
    /// kW, applied to every month
    pub avg_it_load: f64,
    /// Fraction of pumped water lost per month
    pub evaporation_rate: f64,
    pub energy_cost: f64,
    pub water_cost: f64,
    /// °C
    pub ambient_temp: f64,
}

impl YearlyRequest {
    pub fn into_cooling_request(self, defaults: &ScenarioDefaults) -> Result<CoolingRequest> {
        require_non_negative(&[
            ("annual_energy_conventional", self.annual_energy_conventional),
            ("annual_water_conventional", self.annual_water_conventional),
            ("avg_it_load", self.avg_it_load),
            ("evaporation_rate", self.evaporation_rate),
            ("energy_cost", self.energy_cost),
            ("water_cost", self.water_cost),
            ("ambient_temp", self.ambient_temp),
        ])?;

        let horizon = Horizon::Monthly;
        let profile = LoadProfile::constant(horizon, self.avg_it_load)?;

        let mut params = defaults.parameters(self.ambient_temp);
        params.leakage_rate = self.evaporation_rate;
        params.energy_cost = self.energy_cost;
        params.water_cost = self.water_cost;

        let baseline = ConventionalBaseline::evenly_spread(
            self.annual_energy_conventional,
            self.annual_water_conventional,
            horizon.periods(),
        );

        Ok(CoolingRequest::new(profile, params).with_baseline(baseline))
    }
}

fn require_non_negative(fields: &[(&str, f64)]) -> Result<()> {
    for &(name, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(CoolingError::invalid(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }
    Ok(())
}
