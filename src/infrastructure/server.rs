// Infrastructure: Server setup and configuration

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;

use crate::application::mappers::wellopt::well_cooling_optimizer_server::WellCoolingOptimizerServer;
use crate::application::GrpcWellCoolingService;
use crate::cooling::ModelDefaults;
use crate::domain::solver_service::SolverService;
use crate::reference::ReferenceData;

pub struct ServerConfig {
    pub address: SocketAddr,
    pub solver: Arc<dyn SolverService>,
    pub reference: ReferenceData,
    pub defaults: ModelDefaults,
}

impl ServerConfig {
    pub fn new(address: SocketAddr, solver: Arc<dyn SolverService>) -> Self {
        Self {
            address,
            solver,
            reference: ReferenceData::default(),
            defaults: ModelDefaults::default(),
        }
    }

    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_defaults(mut self, defaults: ModelDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    log_banner(&config);

    let service = GrpcWellCoolingService::new(
        config.solver,
        Arc::new(config.reference),
        Arc::new(config.defaults),
    );

    Server::builder()
        .add_service(WellCoolingOptimizerServer::new(service))
        .serve(config.address)
        .await?;

    Ok(())
}

fn log_banner(config: &ServerConfig) {
    info!(
        address = %config.address,
        solver = config.solver.name(),
        conventional_reference = config.reference.conventional().is_ok(),
        well_reference = config.reference.well().is_ok(),
        "well cooling optimizer listening"
    );
    info!(
        hourly_depth_range = ?(config.defaults.hourly.min_depth, config.defaults.hourly.max_depth),
        yearly_depth_range = ?(config.defaults.yearly.min_depth, config.defaults.yearly.max_depth),
        "model defaults"
    );
}
