pub mod contractor;
pub use contractor::{
    Contractor, ContractorChanges, ContractorPage, ContractorStatus, GeoPoint, NewContractor,
    PageRequest, SortDirection, SortField,
};
pub mod user;
pub use user::{User, UserRole};
