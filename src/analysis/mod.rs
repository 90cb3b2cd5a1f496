pub mod constraints;
pub mod ordering;
