// Domain layer: ticket models and ports (interfaces) shared by the pipeline
// and the backend adapter.

pub mod model;
pub mod ports;
