// Domain layer: models and ports. Subprocesses and files live behind the ports.

pub mod model;
pub mod ports;
