// Adapters layer: concrete implementations for external formats (input documents, output writers).

pub mod mesh_document;
pub mod writers;
