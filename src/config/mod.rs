pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::{ConfigProvider, OutputFormat, VertexFilterKind};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_list, validate_non_empty_string, validate_path,
    validate_positive, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "vertex-output")]
#[command(about = "Write mesh vertex fields, optionally reduced to their vector norm")]
pub struct CliConfig {
    /// TOML configuration file; replaces the output flags below
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON document with the mesh and its vertex fields
    #[arg(short, long)]
    pub input: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "output")]
    pub basename: String,

    #[arg(long, default_value = "vtk")]
    pub writer: OutputFormat,

    #[arg(long, default_value = "vector_norm")]
    pub vertex_filter: VertexFilterKind,

    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    #[arg(long, default_value = "1.0")]
    pub time_constant: f64,

    #[arg(long, default_value = "0")]
    pub time_precision: usize,

    #[arg(long, help = "Write fields on the sub-mesh instead of the full mesh")]
    pub submesh: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system resource usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Show what would be written without writing")]
    pub dry_run: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn basename(&self) -> &str {
        &self.basename
    }

    fn writer_format(&self) -> OutputFormat {
        self.writer
    }

    fn vertex_filter(&self) -> VertexFilterKind {
        self.vertex_filter
    }

    fn vertex_data_fields(&self) -> &[String] {
        &self.fields
    }

    fn time_constant(&self) -> f64 {
        self.time_constant
    }

    fn time_precision(&self) -> usize {
        self.time_precision
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let input = crate::utils::validation::validate_required_field("input", &self.input)?;
        validate_path("input", input)?;
        validate_file_extension("input", input, &["json"])?;

        validate_non_empty_string("basename", &self.basename)?;
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_list("fields", &self.fields)?;
        validate_positive("time_constant", self.time_constant)?;
        validate_range("time_precision", self.time_precision, 0, 9)?;
        Ok(())
    }
}
