pub mod engine;
pub mod fault_fields;
pub mod field_store;
pub mod output_manager;
pub mod vertex_filter;

pub use crate::domain::field::{Field, Fields};
pub use crate::domain::model::{Mesh, MeshKind, OutputBatch, SubMesh, VectorFieldType};
pub use crate::domain::ports::{
    ConfigProvider, DataWriter, FieldSource, FilterState, OutputFormat, Pipeline, Storage, VertexFilter,
    VertexFilterKind,
};
pub use crate::utils::error::Result;
