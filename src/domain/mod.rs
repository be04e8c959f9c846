// Domain layer - Crop geometry, job model and error taxonomy

pub mod errors;
pub mod model;
pub mod rules;
