use crate::domain::field::{Field, Fields};
use crate::domain::model::{Mesh, MeshKind, SubMesh, VectorFieldType};
use crate::domain::ports::FieldSource;
use crate::utils::error::{OutputError, Result};
use std::collections::BTreeMap;

const CUMULATIVE_SLIP: &str = "cumulative slip";
const ORIENTATION: &str = "orientation";
const AREA: &str = "area";
const VECTOR_BUFFER: &str = "buffer (vector)";
const SOLUTION_DISP: &str = "disp(t)";

const FINAL_SLIP_PREFIX: &str = "final_slip_";
const SLIP_TIME_PREFIX: &str = "slip_time_";

struct EarthquakeSource {
    final_slip: Field<SubMesh>,
    slip_time: Field<SubMesh>,
}

/// Vertex fields available for output on a kinematic fault surface.
///
/// Orientation holds one direction per row (`space_dim` rows of `space_dim`
/// components): along-strike, up-dip (3D only), then fault normal. The row of
/// the normal direction equals the fault dimension.
pub struct FaultOutputFields {
    label: String,
    fault_mesh: SubMesh,
    fields: Fields<SubMesh>,
    eq_srcs: BTreeMap<String, EarthquakeSource>,
    length_scale: f64,
    pressure_scale: f64,
}

impl FaultOutputFields {
    pub fn new(
        label: impl Into<String>,
        fault_mesh: SubMesh,
        length_scale: f64,
        pressure_scale: f64,
    ) -> Result<Self> {
        let num_vertices = fault_mesh.num_vertices();
        let space_dim = fault_mesh.space_dim();
        let mut fields = Fields::new();

        let slip = fields.add(CUMULATIVE_SLIP, "cumulative_slip")?;
        slip.new_section(num_vertices, space_dim);
        slip.set_vector_field_type(VectorFieldType::Vector);
        slip.set_scale(length_scale);

        let orientation = fields.add(ORIENTATION, "orientation")?;
        orientation.new_section(num_vertices, space_dim * space_dim);

        let area = fields.add(AREA, "area")?;
        area.new_section(num_vertices, 1);
        area.set_vector_field_type(VectorFieldType::Scalar);
        area.set_scale(length_scale.powi(fault_mesh.dimension() as i32));

        Ok(Self {
            label: label.into(),
            fault_mesh,
            fields,
            eq_srcs: BTreeMap::new(),
            length_scale,
            pressure_scale,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_cumulative_slip(&mut self, values: &[f64]) -> Result<()> {
        Self::fill(self.fields.get_mut(CUMULATIVE_SLIP)?, values)
    }

    pub fn set_orientation(&mut self, values: &[f64]) -> Result<()> {
        Self::fill(self.fields.get_mut(ORIENTATION)?, values)
    }

    pub fn set_area(&mut self, values: &[f64]) -> Result<()> {
        Self::fill(self.fields.get_mut(AREA)?, values)
    }

    /// Registers the final slip (`space_dim` per vertex) and slip initiation
    /// time (one per vertex) of a named earthquake source.
    pub fn add_eq_src(&mut self, name: &str, final_slip: Vec<f64>, slip_time: Vec<f64>) -> Result<()> {
        if self.eq_srcs.contains_key(name) {
            return Err(OutputError::DuplicateField {
                name: format!("{}{}", FINAL_SLIP_PREFIX, name),
            });
        }

        let mut final_slip =
            Field::from_values(format!("{}{}", FINAL_SLIP_PREFIX, name), self.fault_mesh.space_dim(), final_slip)?;
        final_slip.set_vector_field_type(VectorFieldType::Vector);
        final_slip.set_scale(self.length_scale);
        final_slip.matches_mesh(&self.fault_mesh)?;

        let mut slip_time = Field::from_values(format!("{}{}", SLIP_TIME_PREFIX, name), 1, slip_time)?;
        slip_time.set_vector_field_type(VectorFieldType::Scalar);
        slip_time.matches_mesh(&self.fault_mesh)?;

        self.eq_srcs.insert(
            name.to_string(),
            EarthquakeSource {
                final_slip,
                slip_time,
            },
        );
        Ok(())
    }

    fn fill(field: &mut Field<SubMesh>, values: &[f64]) -> Result<()> {
        if values.len() != field.values().len() {
            return Err(OutputError::FieldMismatch {
                label: field.label().to_string(),
                expected: format!("{} values", field.values().len()),
                actual: values.len().to_string(),
            });
        }
        let fiber_dim = field.fiber_dim().max(1);
        for (vertex, chunk) in values.chunks(fiber_dim).enumerate() {
            field.update_point(vertex, chunk)?;
        }
        Ok(())
    }

    fn unknown(&self, name: &str) -> OutputError {
        OutputError::UnknownField {
            name: name.to_string(),
            source_label: self.label.clone(),
        }
    }

    /// Removes the vector buffer from the field set, allocating it with the
    /// layout of cumulative slip on first use.
    fn take_vector_buffer(&mut self) -> Result<Field<SubMesh>> {
        if self.fields.has_field(VECTOR_BUFFER) {
            return self.fields.del(VECTOR_BUFFER);
        }
        tracing::debug!("Allocating vector output buffer for fault '{}'", self.label);
        let mut buffer = Field::new("buffer");
        buffer.clone_section(self.fields.get(CUMULATIVE_SLIP)?);
        buffer.zero();
        Ok(buffer)
    }

    fn store_vector_buffer(&mut self, buffer: Field<SubMesh>) -> Result<&Field<SubMesh>> {
        self.fields.insert(VECTOR_BUFFER, buffer)?;
        self.fields.get(VECTOR_BUFFER)
    }

    fn orientation_direction(&mut self, row: usize, label: &str) -> Result<&Field<SubMesh>> {
        let space_dim = self.fault_mesh.space_dim();
        let mut buffer = self.take_vector_buffer()?;
        {
            let orientation = self.fields.get(ORIENTATION)?;
            for vertex in 0..self.fault_mesh.num_vertices() {
                let values = orientation.restrict_point(vertex)?;
                buffer.update_point(vertex, &values[row * space_dim..(row + 1) * space_dim])?;
            }
        }
        buffer.set_label(label);
        buffer.set_vector_field_type(VectorFieldType::Vector);
        buffer.set_scale(1.0);
        self.store_vector_buffer(buffer)
    }

    fn traction_change(&mut self, solution: Option<&Fields<Mesh>>) -> Result<&Field<SubMesh>> {
        let disp = solution
            .ok_or_else(|| OutputError::FieldNotFound {
                name: SOLUTION_DISP.to_string(),
            })?
            .get(SOLUTION_DISP)?;
        let space_dim = self.fault_mesh.space_dim();
        if disp.fiber_dim() != space_dim {
            return Err(OutputError::FieldMismatch {
                label: disp.label().to_string(),
                expected: format!("fiber dimension {}", space_dim),
                actual: disp.fiber_dim().to_string(),
            });
        }

        let mut buffer = self.take_vector_buffer()?;
        buffer.zero();
        buffer.set_label("traction_change");
        buffer.set_vector_field_type(VectorFieldType::Vector);
        buffer.set_scale(self.pressure_scale);

        let area = self.fields.get(AREA)?;
        let mut traction = vec![0.0; space_dim];
        for vertex in 0..self.fault_mesh.num_vertices() {
            let parent_vertex = self.fault_mesh.parent_vertex(vertex).ok_or_else(|| {
                OutputError::ProcessingError {
                    message: format!("fault vertex {} has no parent vertex", vertex),
                }
            })?;
            let disp_vertex = disp.restrict_point(parent_vertex)?;
            let area_vertex = area.restrict_point(vertex)?[0];
            if area_vertex <= 0.0 {
                return Err(OutputError::ProcessingError {
                    message: format!(
                        "non-positive tributary area {} at vertex {} of fault '{}'",
                        area_vertex, vertex, self.label
                    ),
                });
            }
            for (t, d) in traction.iter_mut().zip(disp_vertex) {
                *t = d / area_vertex;
            }
            buffer.update_point(vertex, &traction)?;
        }

        self.store_vector_buffer(buffer)
    }
}

impl FieldSource<SubMesh> for FaultOutputFields {
    fn mesh(&self) -> &SubMesh {
        &self.fault_mesh
    }

    fn available_fields(&self) -> Vec<String> {
        let cohesive_dim = self.fault_mesh.dimension();
        let mut names = vec!["slip".to_string()];
        if cohesive_dim > 0 {
            names.push("strike_dir".to_string());
        }
        if cohesive_dim == 2 {
            names.push("dip_dir".to_string());
        }
        names.push("normal_dir".to_string());
        for src in self.eq_srcs.keys() {
            names.push(format!("{}{}", FINAL_SLIP_PREFIX, src));
            names.push(format!("{}{}", SLIP_TIME_PREFIX, src));
        }
        names.push("traction_change".to_string());
        names
    }

    fn vertex_field(&mut self, name: &str, solution: Option<&Fields<Mesh>>) -> Result<&Field<SubMesh>> {
        let cohesive_dim = self.fault_mesh.dimension();
        let lower = name.to_ascii_lowercase();

        match lower.as_str() {
            "slip" => return self.fields.get(CUMULATIVE_SLIP),
            "strike_dir" if cohesive_dim > 0 => return self.orientation_direction(0, "strike_dir"),
            "dip_dir" if cohesive_dim == 2 => return self.orientation_direction(1, "dip_dir"),
            "normal_dir" if cohesive_dim < self.fault_mesh.space_dim() => {
                return self.orientation_direction(cohesive_dim, "normal_dir")
            }
            "traction_change" => return self.traction_change(solution),
            _ => {}
        }

        // 前綴比對不分大小寫，來源名稱保留原樣
        if lower.starts_with(FINAL_SLIP_PREFIX) {
            let src = &name[FINAL_SLIP_PREFIX.len()..];
            return match self.eq_srcs.get(src) {
                Some(eq_src) => Ok(&eq_src.final_slip),
                None => Err(self.unknown(name)),
            };
        }
        if lower.starts_with(SLIP_TIME_PREFIX) {
            let src = &name[SLIP_TIME_PREFIX.len()..];
            return match self.eq_srcs.get(src) {
                Some(eq_src) => Ok(&eq_src.slip_time),
                None => Err(self.unknown(name)),
            };
        }

        Err(self.unknown(name))
    }
}
