//! Underground-well cooling model: parameters, the linearised LP, and the
//! metrics derived from its optimum.

pub mod baseline;
pub mod builder;
pub mod envelope;
pub mod error;
pub mod extractor;
pub mod optimizer;
pub mod params;
pub mod scenario;

pub use baseline::ConventionalBaseline;
pub use builder::{build, ObjectiveForm, VariableLayout, WellModel};
pub use envelope::{EnvelopePlane, Interval, McCormickEnvelope};
pub use error::CoolingError;
pub use extractor::{extract, Comparison, PeriodResult, SolutionReport, FLOW_EPSILON};
pub use optimizer::{optimise, CoolingRequest};
pub use params::{CoolingParameters, Horizon, LoadProfile};
pub use scenario::{HourlyRequest, ModelDefaults, ScenarioDefaults, YearlyRequest};
