pub mod aggregate;

pub use aggregate::{redistribute_total, PlanError, ProductionPlanLine};
