// Domain layer: core models and ports (interfaces). No GraphQL or HTTP types in here.

pub mod model;
pub mod ports;
