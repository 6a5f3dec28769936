use crate::domain::field::{Field, Fields};
use crate::domain::model::{Mesh, MeshKind, OutputBatch};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexFilterKind {
    None,
    #[default]
    VectorNorm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Vtk,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Vtk => "vtk",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vtk" => Ok(OutputFormat::Vtk),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown writer format '{}' (vtk, csv, json)", other)),
        }
    }
}

impl std::str::FromStr for VertexFilterKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(VertexFilterKind::None),
            "vector_norm" | "vecnorm" => Ok(VertexFilterKind::VectorNorm),
            other => Err(format!("unknown vertex filter '{}' (none, vector_norm)", other)),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn basename(&self) -> &str;
    fn writer_format(&self) -> OutputFormat;
    fn vertex_filter(&self) -> VertexFilterKind;
    fn vertex_data_fields(&self) -> &[String];
    fn time_constant(&self) -> f64;
    fn time_precision(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Unconfigured,
    Configured,
    Initialized,
}

/// Transform applied to a vertex field right before it is written.
pub trait VertexFilter<M: MeshKind>: Send + Sync {
    fn name(&self) -> &str;
    fn state(&self) -> FilterState;
    fn configure(&mut self) -> Result<()>;
    fn initialize(&mut self) -> Result<()>;
    fn filter(&mut self, field: &Field<M>, mesh: &M) -> Result<&Field<M>>;
    fn deallocate(&mut self);
    fn boxed_clone(&self) -> Box<dyn VertexFilter<M>>;
}

/// Provider of named vertex fields for output.
pub trait FieldSource<M: MeshKind>: Send + Sync {
    fn mesh(&self) -> &M;
    fn available_fields(&self) -> Vec<String>;
    fn vertex_field(&mut self, name: &str, solution: Option<&Fields<Mesh>>) -> Result<&Field<M>>;
}

pub trait DataWriter<M: MeshKind>: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn filename(&self, basename: &str, time: Option<f64>) -> String;

    fn encode(&self, mesh: &M, time: Option<f64>, fields: &[Field<M>]) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Mesh: MeshKind;

    async fn extract(&self) -> Result<Vec<Field<Self::Mesh>>>;
    async fn transform(&self, fields: Vec<Field<Self::Mesh>>) -> Result<OutputBatch<Self::Mesh>>;
    async fn load(&self, batch: OutputBatch<Self::Mesh>) -> Result<String>;
}
