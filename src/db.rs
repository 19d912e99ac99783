pub mod contractor_repo;
pub use contractor_repo::{ContractorStore, PgContractorRepository};
pub mod user_repo;
pub use user_repo::UserRepository;
