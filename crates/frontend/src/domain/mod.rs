pub mod a001_procurement_contract;
