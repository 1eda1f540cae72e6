mod demand_table;
pub use demand_table::DemandTable;
