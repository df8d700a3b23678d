use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{info, instrument};

use super::mappers::{self, wellopt};
use crate::cooling::{optimise, CoolingRequest, ModelDefaults, SolutionReport};
use crate::domain::SolverService;
use crate::reference::ReferenceData;

/// gRPC service implementation
pub struct GrpcWellCoolingService {
    solver: Arc<dyn SolverService>,
    reference: Arc<ReferenceData>,
    defaults: Arc<ModelDefaults>,
}

impl GrpcWellCoolingService {
    pub fn new(
        solver: Arc<dyn SolverService>,
        reference: Arc<ReferenceData>,
        defaults: Arc<ModelDefaults>,
    ) -> Self {
        Self {
            solver,
            reference,
            defaults,
        }
    }

    /// The solve blocks, so keep it off the async workers
    async fn run(&self, request: CoolingRequest) -> Result<SolutionReport, Status> {
        let solver = Arc::clone(&self.solver);
        tokio::task::spawn_blocking(move || optimise(solver.as_ref(), &request))
            .await
            .map_err(|e| Status::internal(format!("solver task failed: {}", e)))?
            .map_err(mappers::error_to_status)
    }
}

#[tonic::async_trait]
impl wellopt::well_cooling_optimizer_server::WellCoolingOptimizer for GrpcWellCoolingService {
    #[instrument(skip_all, name = "hourly")]
    async fn run_hourly_model(
        &self,
        request: Request<wellopt::HourlyModelRequest>,
    ) -> Result<Response<wellopt::HourlyModelResponse>, Status> {
        let hourly = mappers::proto_to_hourly_request(request.into_inner());
        info!(
            surface_temp = hourly.surface_temp,
            max_flow = hourly.max_flow,
            "hourly model requested"
        );

        let cooling_request = hourly
            .into_cooling_request(&self.defaults.hourly, &self.reference)
            .map_err(mappers::error_to_status)?;
        let report = self.run(cooling_request).await?;

        let reference_available = self.reference.conventional().is_ok();
        Ok(Response::new(mappers::report_to_hourly_response(
            &report,
            reference_available,
        )))
    }

    #[instrument(skip_all, name = "yearly")]
    async fn run_yearly_model(
        &self,
        request: Request<wellopt::YearlyModelRequest>,
    ) -> Result<Response<wellopt::YearlyModelResponse>, Status> {
        let yearly = mappers::proto_to_yearly_request(request.into_inner());
        info!(
            ambient_temp = yearly.ambient_temp,
            avg_it_load = yearly.avg_it_load,
            "yearly model requested"
        );

        let cooling_request = yearly
            .into_cooling_request(&self.defaults.yearly)
            .map_err(mappers::error_to_status)?;
        let report = self.run(cooling_request).await?;

        Ok(Response::new(mappers::report_to_yearly_response(&report)))
    }
}
