// Domain layer: models, ports and the phonological services.

pub mod model;
pub mod ports;

pub mod services;
