// Application layer: gRPC handlers around the cooling optimizer

pub mod grpc_service;
pub mod mappers;

pub use grpc_service::GrpcWellCoolingService;
