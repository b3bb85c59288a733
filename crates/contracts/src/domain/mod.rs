pub mod a001_procurement_contract;
pub mod a002_production_plan;
pub mod a003_incoming_inspection;
