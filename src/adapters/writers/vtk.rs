use super::{format_value, TimeStamp};
use crate::domain::field::Field;
use crate::domain::model::{MeshKind, VectorFieldType};
use crate::domain::ports::{DataWriter, OutputFormat};
use crate::utils::error::{OutputError, Result};
use std::fmt::Write;

/// Legacy ASCII VTK unstructured grid with point data.
#[derive(Debug, Clone, Default)]
pub struct VtkWriter {
    time_stamp: TimeStamp,
}

impl VtkWriter {
    pub fn new(time_stamp: TimeStamp) -> Self {
        Self { time_stamp }
    }
}

fn cell_type(dimension: usize, num_vertices: usize) -> Result<u8> {
    match (dimension, num_vertices) {
        (_, 1) => Ok(1),
        (_, 2) => Ok(3),
        (_, 3) => Ok(5),
        (2, 4) => Ok(9),
        (3, 4) => Ok(10),
        (_, 8) => Ok(12),
        _ => Err(OutputError::UnsupportedCell {
            dimension,
            num_vertices,
        }),
    }
}

/// Joins at most `width` values, padding with zeros up to `width`.
fn padded(values: &[f64], width: usize) -> String {
    (0..width)
        .map(|i| format_value(values.get(i).copied().unwrap_or(0.0)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn vtk_name(label: &str) -> String {
    // VTK 名稱不能有空白
    label.replace(char::is_whitespace, "_")
}

impl<M: MeshKind> DataWriter<M> for VtkWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Vtk
    }

    fn filename(&self, basename: &str, time: Option<f64>) -> String {
        self.time_stamp.filename(basename, time, "vtk")
    }

    fn encode(&self, mesh: &M, time: Option<f64>, fields: &[Field<M>]) -> Result<Vec<u8>> {
        for field in fields {
            field.matches_mesh(mesh)?;
        }

        let num_vertices = mesh.num_vertices();
        let mut out = String::new();
        let fmt_err = |e: std::fmt::Error| OutputError::ProcessingError {
            message: format!("VTK formatting failed: {}", e),
        };

        writeln!(out, "# vtk DataFile Version 2.0").map_err(fmt_err)?;
        let title = match time {
            Some(t) => format!("{} t={}", mesh.label(), t),
            None => mesh.label().to_string(),
        };
        writeln!(out, "{}", title).map_err(fmt_err)?;
        writeln!(out, "ASCII").map_err(fmt_err)?;
        writeln!(out, "DATASET UNSTRUCTURED_GRID").map_err(fmt_err)?;

        writeln!(out, "POINTS {} double", num_vertices).map_err(fmt_err)?;
        for vertex in 0..num_vertices {
            writeln!(out, "{}", padded(mesh.vertex_coordinates(vertex), 3)).map_err(fmt_err)?;
        }

        let cells = mesh.cells();
        let size: usize = cells.iter().map(|c| c.len() + 1).sum();
        writeln!(out, "CELLS {} {}", cells.len(), size).map_err(fmt_err)?;
        for cell in cells {
            let ids = cell.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
            writeln!(out, "{} {}", cell.len(), ids).map_err(fmt_err)?;
        }
        writeln!(out, "CELL_TYPES {}", cells.len()).map_err(fmt_err)?;
        for cell in cells {
            writeln!(out, "{}", cell_type(mesh.dimension(), cell.len())?).map_err(fmt_err)?;
        }

        if !fields.is_empty() {
            writeln!(out, "POINT_DATA {}", num_vertices).map_err(fmt_err)?;
        }
        for field in fields {
            let name = vtk_name(field.label());
            let fiber_dim = field.fiber_dim();
            if fiber_dim == 1 {
                writeln!(out, "SCALARS {} double 1", name).map_err(fmt_err)?;
                writeln!(out, "LOOKUP_TABLE default").map_err(fmt_err)?;
                for vertex in 0..num_vertices {
                    writeln!(out, "{}", format_value(field.dimensionalized(vertex)?[0])).map_err(fmt_err)?;
                }
            } else if field.vector_field_type() == VectorFieldType::Vector && fiber_dim <= 3 {
                writeln!(out, "VECTORS {} double", name).map_err(fmt_err)?;
                for vertex in 0..num_vertices {
                    writeln!(out, "{}", padded(&field.dimensionalized(vertex)?, 3)).map_err(fmt_err)?;
                }
            } else {
                writeln!(out, "FIELD FieldData 1").map_err(fmt_err)?;
                writeln!(out, "{} {} {} double", name, fiber_dim, num_vertices).map_err(fmt_err)?;
                for vertex in 0..num_vertices {
                    writeln!(out, "{}", padded(&field.dimensionalized(vertex)?, fiber_dim))
                        .map_err(fmt_err)?;
                }
            }
        }

        tracing::debug!(
            "Encoded {} fields on '{}' as VTK ({} bytes)",
            fields.len(),
            mesh.label(),
            out.len()
        );
        Ok(out.into_bytes())
    }
}
