pub mod aggregate;
pub mod mock;
pub mod schema;

pub use aggregate::{ContractStatus, ProcurementContract};
