pub mod aggregate;
pub mod schema;

pub use aggregate::{IncomingInspection, InspectionResult};
