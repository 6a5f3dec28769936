use super::TimeStamp;
use crate::domain::field::Field;
use crate::domain::model::{MeshKind, VectorFieldType};
use crate::domain::ports::{DataWriter, OutputFormat};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    mesh: &'a str,
    kind: &'a str,
    time: Option<f64>,
    written_at: DateTime<Utc>,
    space_dim: usize,
    coordinates: Vec<&'a [f64]>,
    cells: &'a [Vec<usize>],
    fields: Vec<JsonField<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonField<'a> {
    label: &'a str,
    vector_field_type: VectorFieldType,
    fiber_dim: usize,
    values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    time_stamp: TimeStamp,
}

impl JsonWriter {
    pub fn new(time_stamp: TimeStamp) -> Self {
        Self { time_stamp }
    }
}

impl<M: MeshKind> DataWriter<M> for JsonWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn filename(&self, basename: &str, time: Option<f64>) -> String {
        self.time_stamp.filename(basename, time, "json")
    }

    fn encode(&self, mesh: &M, time: Option<f64>, fields: &[Field<M>]) -> Result<Vec<u8>> {
        let fields = fields
            .iter()
            .map(|field| {
                field.matches_mesh(mesh)?;
                let values = (0..field.num_vertices())
                    .map(|vertex| field.dimensionalized(vertex))
                    .collect::<Result<Vec<_>>>()?;
                Ok(JsonField {
                    label: field.label(),
                    vector_field_type: field.vector_field_type(),
                    fiber_dim: field.fiber_dim(),
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let document = JsonOutput {
            mesh: mesh.label(),
            kind: mesh.kind(),
            time,
            written_at: Utc::now(),
            space_dim: mesh.space_dim(),
            coordinates: (0..mesh.num_vertices())
                .map(|vertex| mesh.vertex_coordinates(vertex))
                .collect(),
            cells: mesh.cells(),
            fields,
        };

        Ok(serde_json::to_vec_pretty(&document)?)
    }
}
