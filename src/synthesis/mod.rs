pub mod profile;
pub mod renderer;
