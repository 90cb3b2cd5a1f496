pub mod elements;
pub mod species;
