pub mod contractor_service;
pub use contractor_service::ContractorService;
