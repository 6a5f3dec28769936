// Domain layer: topology, fields and ports (interfaces). Depends only on std, serde and async-trait.

pub mod field;
pub mod model;
pub mod ports;
