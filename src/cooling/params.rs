use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{CoolingError, Result};

/// Planning horizon of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    /// 24 one-hour periods
    Hourly,
    /// 12 periods of roughly 30 days
    Monthly,
}

impl Horizon {
    pub fn periods(self) -> usize {
        match self {
            Horizon::Hourly => 24,
            Horizon::Monthly => 12,
        }
    }

    /// Default length of one period in hours
    pub fn period_hours(self) -> f64 {
        match self {
            Horizon::Hourly => 1.0,
            Horizon::Monthly => 720.0,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Hourly => write!(f, "hourly"),
            Horizon::Monthly => write!(f, "monthly"),
        }
    }
}

/// IT load (kW) for every period of a horizon
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfile {
    horizon: Horizon,
    loads_kw: Vec<f64>,
}

impl LoadProfile {
    pub fn new(horizon: Horizon, loads_kw: Vec<f64>) -> Result<Self> {
        if loads_kw.len() != horizon.periods() {
            return Err(CoolingError::invalid(format!(
                "{} horizon needs {} IT load values, got {}",
                horizon,
                horizon.periods(),
                loads_kw.len()
            )));
        }
        if let Some((t, load)) = loads_kw
            .iter()
            .enumerate()
            .find(|(_, load)| !load.is_finite() || **load < 0.0)
        {
            return Err(CoolingError::invalid(format!(
                "IT load for period {} must be non-negative, got {}",
                t, load
            )));
        }
        Ok(Self { horizon, loads_kw })
    }

    /// Same load in every period
    pub fn constant(horizon: Horizon, load_kw: f64) -> Result<Self> {
        Self::new(horizon, vec![load_kw; horizon.periods()])
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn len(&self) -> usize {
        self.loads_kw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads_kw.is_empty()
    }

    pub fn loads(&self) -> &[f64] {
        &self.loads_kw
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.loads_kw.iter().copied().enumerate()
    }
}

/// Physical and cost scalars of one request. Never mutated once validated.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingParameters {
    /// Ambient / ground-surface temperature (°C)
    pub surface_temp: f64,
    /// Maximum allowed data-centre temperature (°C)
    pub target_dc_temp: f64,
    /// Temperature drop per metre of depth (°C/m)
    pub temp_gradient: f64,
    /// Cooling coefficient (kW per m³/s per °C)
    pub cooling_coefficient: f64,
    /// Pump flow bounds (m³/s)
    pub min_flow: f64,
    pub max_flow: f64,
    /// Well depth bounds (m)
    pub min_depth: f64,
    pub max_depth: f64,
    /// Initial reservoir fill (m³)
    pub initial_volume: f64,
    /// Fraction of pumped water lost per period
    pub leakage_rate: f64,
    /// $ per kWh
    pub energy_cost: f64,
    /// $ per m³
    pub water_cost: f64,
    /// Duration of one period (h)
    pub period_hours: f64,
    pub pump_efficiency: f64,
    /// kg/m³
    pub fluid_density: f64,
    /// m/s²
    pub gravity: f64,
}

impl CoolingParameters {
    /// Reject any negative or non-finite magnitude, a non-positive max flow,
    /// inverted bounds, or a zero divisor.
    pub fn validate(&self) -> Result<()> {
        let magnitudes = [
            ("surface_temp", self.surface_temp),
            ("target_dc_temp", self.target_dc_temp),
            ("temp_gradient", self.temp_gradient),
            ("cooling_coefficient", self.cooling_coefficient),
            ("min_flow", self.min_flow),
            ("max_flow", self.max_flow),
            ("min_depth", self.min_depth),
            ("max_depth", self.max_depth),
            ("initial_volume", self.initial_volume),
            ("leakage_rate", self.leakage_rate),
            ("energy_cost", self.energy_cost),
            ("water_cost", self.water_cost),
            ("period_hours", self.period_hours),
            ("pump_efficiency", self.pump_efficiency),
            ("fluid_density", self.fluid_density),
            ("gravity", self.gravity),
        ];
        for (name, value) in magnitudes {
            if !value.is_finite() {
                return Err(CoolingError::invalid(format!("{} must be a finite number", name)));
            }
            if value < 0.0 {
                return Err(CoolingError::invalid(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if self.max_flow <= 0.0 {
            return Err(CoolingError::invalid(
                "Max pump flow rate must be greater than 0",
            ));
        }
        if self.min_flow > self.max_flow {
            return Err(CoolingError::invalid(format!(
                "min_flow ({}) exceeds max_flow ({})",
                self.min_flow, self.max_flow
            )));
        }
        if self.min_depth > self.max_depth {
            return Err(CoolingError::invalid(format!(
                "min_depth ({}) exceeds max_depth ({})",
                self.min_depth, self.max_depth
            )));
        }
        for (name, value) in [
            ("pump_efficiency", self.pump_efficiency),
            ("cooling_coefficient", self.cooling_coefficient),
            ("period_hours", self.period_hours),
        ] {
            if value == 0.0 {
                return Err(CoolingError::invalid(format!("{} must be greater than 0", name)));
            }
        }

        Ok(())
    }

    /// `T_target - T_surface`
    pub fn temp_headroom(&self) -> f64 {
        self.target_dc_temp - self.surface_temp
    }

    /// Pump energy (kWh) per unit of flow×depth over one period: `g·ρ·Δt / (1000·η)`
    pub fn energy_per_flow_depth(&self) -> f64 {
        self.gravity * self.fluid_density * self.period_hours / (1000.0 * self.pump_efficiency)
    }

    /// Water temperature drawn from `depth` metres
    pub fn well_temp(&self, depth: f64) -> f64 {
        self.surface_temp - self.temp_gradient * depth
    }

    /// Pump energy (kWh) over one period at the given flow and depth
    pub fn pump_energy(&self, flow: f64, depth: f64) -> f64 {
        flow * depth * self.energy_per_flow_depth()
    }

    /// Net water use (m³): initial fill plus leakage on everything pumped
    pub fn net_water(&self, total_pumped: f64) -> f64 {
        self.initial_volume + self.leakage_rate * total_pumped
    }

    /// Cost of running `flow` at `depth` in every period of a horizon
    pub fn uniform_cost(&self, periods: usize, flow: f64, depth: f64) -> f64 {
        let n = periods as f64;
        let energy = n * self.pump_energy(flow, depth);
        let water = self.net_water(n * flow * self.period_hours);
        energy * self.energy_cost + water * self.water_cost
    }
}
