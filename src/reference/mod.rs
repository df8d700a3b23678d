//! Historical datasets used to fill in and compare the hourly run.
//!
//! Loaded once at start-up and shared read-only between requests. Either file
//! may be missing; callers fall back to request values or empty comparisons.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::cooling::{ConventionalBaseline, CoolingError};

pub const CONVENTIONAL_FILE: &str = "conventional_datacentre.csv";
pub const WELL_FILE: &str = "underground_well_datacentre.csv";

/// Synthetic makeup-water readings are far below a real site; scale them up.
pub const MAKEUP_WATER_SCALE: f64 = 200.0;

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{0} has no rows")]
    Empty(PathBuf),
}

impl From<ReferenceError> for CoolingError {
    fn from(err: ReferenceError) -> Self {
        CoolingError::MissingReferenceData(err.to_string())
    }
}

/// One hour of the conventional cooling-tower dataset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConventionalRecord {
    #[serde(rename = "Time")]
    pub time: u32,
    #[serde(rename = "Pump_Energy_kWh")]
    pub pump_energy_kwh: f64,
    #[serde(rename = "Makeup_Water_Usage_m3")]
    pub makeup_water_m3: f64,
    #[serde(rename = "Evaporative_Loss_Percent")]
    pub evaporative_loss_percent: f64,
    #[serde(rename = "Pump_Flow_Rate_m3s")]
    pub pump_flow_m3s: f64,
}

impl ConventionalRecord {
    /// Evaporation in litres per hour
    pub fn evaporation_lph(&self) -> f64 {
        self.evaporative_loss_percent / 100.0 * self.pump_flow_m3s * 3600.0 * 1000.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConventionalDataset {
    pub records: Vec<ConventionalRecord>,
}

impl ConventionalDataset {
    pub fn from_path(path: &Path) -> Result<Self, ReferenceError> {
        let mut records: Vec<ConventionalRecord> = read_rows(path)?;
        records.sort_by_key(|r| r.time);
        Ok(Self { records })
    }

    /// Per-period energy and scaled makeup water
    pub fn baseline(&self) -> ConventionalBaseline {
        let energy: Vec<f64> = self.records.iter().map(|r| r.pump_energy_kwh).collect();
        let water: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.makeup_water_m3 * MAKEUP_WATER_SCALE)
            .collect();
        ConventionalBaseline::from_periods(&energy, &water)
    }

    /// Mean derived evaporation rate (L/h)
    pub fn mean_evaporation_lph(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let total: f64 = self.records.iter().map(ConventionalRecord::evaporation_lph).sum();
        Some(total / self.records.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct WellRecord {
    #[serde(rename = "Time")]
    time: u32,
    #[serde(rename = "IT_Load_kW")]
    it_load_kw: f64,
}

/// Hourly IT load of the underground-well site
#[derive(Debug, Clone, PartialEq)]
pub struct WellDataset {
    pub it_load_kw: Vec<f64>,
}

impl WellDataset {
    pub fn from_path(path: &Path) -> Result<Self, ReferenceError> {
        let mut records: Vec<WellRecord> = read_rows(path)?;
        records.sort_by_key(|r| r.time);
        Ok(Self {
            it_load_kw: records.into_iter().map(|r| r.it_load_kw).collect(),
        })
    }
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, ReferenceError> {
    let csv_err = |source| ReferenceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let rows = reader
        .deserialize::<T>()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_err)?;
    if rows.is_empty() {
        return Err(ReferenceError::Empty(path.to_path_buf()));
    }
    Ok(rows)
}

/// Whatever reference data could be loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    conventional: Option<ConventionalDataset>,
    well: Option<WellDataset>,
}

impl ReferenceData {
    pub fn new(conventional: Option<ConventionalDataset>, well: Option<WellDataset>) -> Self {
        Self { conventional, well }
    }

    /// Load both files from `dir`, keeping whichever succeed
    pub fn load_dir(dir: &Path) -> Self {
        let conventional = load_logged(dir.join(CONVENTIONAL_FILE), ConventionalDataset::from_path);
        let well = load_logged(dir.join(WELL_FILE), WellDataset::from_path);
        Self { conventional, well }
    }

    pub fn conventional(&self) -> Result<&ConventionalDataset, CoolingError> {
        self.conventional.as_ref().ok_or_else(|| {
            CoolingError::MissingReferenceData(format!("{} not loaded", CONVENTIONAL_FILE))
        })
    }

    pub fn well(&self) -> Result<&WellDataset, CoolingError> {
        self.well
            .as_ref()
            .ok_or_else(|| CoolingError::MissingReferenceData(format!("{} not loaded", WELL_FILE)))
    }
}

fn load_logged<T>(path: PathBuf, load: fn(&Path) -> Result<T, ReferenceError>) -> Option<T> {
    match load(&path) {
        Ok(dataset) => {
            info!(path = %path.display(), "loaded reference dataset");
            Some(dataset)
        }
        Err(err) => {
            warn!(error = %err, "reference dataset unavailable");
            None
        }
    }
}
