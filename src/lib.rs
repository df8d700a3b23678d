// Domain layer: LP model description and the solver capability
pub mod domain;

// Cooling model: builder, envelope, extractor and scenarios
pub mod cooling;

// Reference datasets loaded at start-up
pub mod reference;

// Application layer: gRPC handlers
pub mod application;

// Infrastructure layer: External concerns (gRPC, server)
#[cfg(feature = "server")]
pub mod infrastructure;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    Constraint, ConstraintType, ObjectiveFunction, OptimizationProblem, OptimizationType, Solution,
    SolutionStatus, SolverBackend, SolverError, SolverService, Variable,
};

pub use cooling::{
    optimise, CoolingError, CoolingParameters, CoolingRequest, Horizon, HourlyRequest,
    LoadProfile, ModelDefaults, ObjectiveForm, SolutionReport, YearlyRequest,
};

pub use reference::ReferenceData;

pub use application::GrpcWellCoolingService;

#[cfg(feature = "server")]
pub use infrastructure::{start_server, ServerConfig};

pub use solver::SolverFactory;
#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;
#[cfg(feature = "highs")]
pub use solver::HighsSolver;
