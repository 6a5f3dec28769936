pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::mesh_document::MeshDocument;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{
    engine::OutputEngine,
    fault_fields::FaultOutputFields,
    field_store::VertexFieldStore,
    output_manager::{OutputManager, OutputSettings},
    vertex_filter::{
        mesh_output_vertex_filter, submesh_output_vertex_filter, MeshVertexFilterVecNorm,
        SubMeshVertexFilterVecNorm, VertexFilterVecNorm,
    },
};
pub use utils::error::{OutputError, Result};
