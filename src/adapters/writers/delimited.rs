use super::{format_value, TimeStamp};
use crate::domain::field::Field;
use crate::domain::model::MeshKind;
use crate::domain::ports::{DataWriter, OutputFormat};
use crate::utils::error::{OutputError, Result};

const COORDINATE_NAMES: [&str; 3] = ["x", "y", "z"];

/// One row per vertex: optional time, vertex id, coordinates, then every
/// field component.
#[derive(Debug, Clone, Default)]
pub struct CsvWriter {
    time_stamp: TimeStamp,
}

impl CsvWriter {
    pub fn new(time_stamp: TimeStamp) -> Self {
        Self { time_stamp }
    }
}

fn header<M>(space_dim: usize, time: Option<f64>, fields: &[Field<M>]) -> Vec<String> {
    let mut header = Vec::new();
    if time.is_some() {
        header.push("t".to_string());
    }
    header.push("vertex".to_string());
    header.extend(COORDINATE_NAMES.iter().take(space_dim).map(|c| c.to_string()));
    for field in fields {
        if field.fiber_dim() == 1 {
            header.push(field.label().to_string());
        } else {
            header.extend((0..field.fiber_dim()).map(|i| format!("{}_{}", field.label(), i)));
        }
    }
    header
}

impl<M: MeshKind> DataWriter<M> for CsvWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn filename(&self, basename: &str, time: Option<f64>) -> String {
        self.time_stamp.filename(basename, time, "csv")
    }

    fn encode(&self, mesh: &M, time: Option<f64>, fields: &[Field<M>]) -> Result<Vec<u8>> {
        for field in fields {
            field.matches_mesh(mesh)?;
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(header(mesh.space_dim(), time, fields))?;

        for vertex in 0..mesh.num_vertices() {
            let mut row = Vec::new();
            if let Some(t) = time {
                row.push(format_value(t));
            }
            row.push(vertex.to_string());
            row.extend(mesh.vertex_coordinates(vertex).iter().map(|&c| format_value(c)));
            for field in fields {
                row.extend(field.dimensionalized(vertex)?.into_iter().map(format_value));
            }
            writer.write_record(&row)?;
        }

        let data = writer.into_inner().map_err(|e| OutputError::ProcessingError {
            message: format!("Failed to flush CSV output: {}", e),
        })?;
        tracing::debug!(
            "Encoded {} fields on '{}' as CSV ({} bytes)",
            fields.len(),
            mesh.label(),
            data.len()
        );
        Ok(data)
    }
}
