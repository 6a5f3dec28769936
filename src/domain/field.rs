use crate::domain::model::{MeshKind, VectorFieldType};
use crate::utils::error::{OutputError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Per-vertex values on a mesh of kind `M`, stored contiguously with
/// `fiber_dim` values per vertex.
pub struct Field<M> {
    label: String,
    vector_field_type: VectorFieldType,
    scale: f64,
    fiber_dim: usize,
    num_vertices: usize,
    values: Vec<f64>,
    allocated: bool,
    _mesh: PhantomData<fn() -> M>,
}

impl<M> Field<M> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            vector_field_type: VectorFieldType::Other,
            scale: 1.0,
            fiber_dim: 0,
            num_vertices: 0,
            values: Vec::new(),
            allocated: false,
            _mesh: PhantomData,
        }
    }

    pub fn with_section(label: impl Into<String>, num_vertices: usize, fiber_dim: usize) -> Self {
        let mut field = Self::new(label);
        field.new_section(num_vertices, fiber_dim);
        field
    }

    pub fn from_values(label: impl Into<String>, fiber_dim: usize, values: Vec<f64>) -> Result<Self> {
        let label = label.into();
        if fiber_dim == 0 {
            return Err(OutputError::InvalidField {
                label,
                reason: "fiber dimension must be positive".to_string(),
            });
        }
        if values.len() % fiber_dim != 0 {
            return Err(OutputError::InvalidField {
                reason: format!(
                    "{} values is not a multiple of fiber dimension {}",
                    values.len(),
                    fiber_dim
                ),
                label,
            });
        }

        let mut field = Self::new(label);
        field.num_vertices = values.len() / fiber_dim;
        field.fiber_dim = fiber_dim;
        field.values = values;
        field.allocated = true;
        Ok(field)
    }

    /// Reallocates storage for `num_vertices * fiber_dim` zeros.
    pub fn new_section(&mut self, num_vertices: usize, fiber_dim: usize) {
        self.num_vertices = num_vertices;
        self.fiber_dim = fiber_dim;
        self.values.clear();
        self.values.resize(num_vertices * fiber_dim, 0.0);
        self.allocated = true;
    }

    /// Takes the layout of `other`; values are zeroed and the label kept.
    pub fn clone_section(&mut self, other: &Field<M>) {
        self.new_section(other.num_vertices, other.fiber_dim);
        self.vector_field_type = other.vector_field_type;
        self.scale = other.scale;
    }

    pub fn copy_from(&mut self, other: &Field<M>) -> Result<()> {
        if self.num_vertices != other.num_vertices || self.fiber_dim != other.fiber_dim {
            return Err(OutputError::FieldMismatch {
                label: self.label.clone(),
                expected: format!("{} x {}", self.num_vertices, self.fiber_dim),
                actual: format!("{} x {}", other.num_vertices, other.fiber_dim),
            });
        }
        self.values.copy_from_slice(&other.values);
        Ok(())
    }

    pub fn zero(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn restrict_point(&self, vertex: usize) -> Result<&[f64]> {
        self.check_vertex(vertex)?;
        let start = vertex * self.fiber_dim;
        Ok(&self.values[start..start + self.fiber_dim])
    }

    pub fn update_point(&mut self, vertex: usize, values: &[f64]) -> Result<()> {
        self.check_vertex(vertex)?;
        if values.len() != self.fiber_dim {
            return Err(OutputError::FieldMismatch {
                label: self.label.clone(),
                expected: format!("{} values at vertex {}", self.fiber_dim, vertex),
                actual: values.len().to_string(),
            });
        }
        let start = vertex * self.fiber_dim;
        self.values[start..start + self.fiber_dim].copy_from_slice(values);
        Ok(())
    }

    /// Values at `vertex` multiplied by the field scale.
    pub fn dimensionalized(&self, vertex: usize) -> Result<Vec<f64>> {
        Ok(self
            .restrict_point(vertex)?
            .iter()
            .map(|v| v * self.scale)
            .collect())
    }

    pub fn points(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics
        self.values.chunks_exact(self.fiber_dim.max(1))
    }

    fn check_vertex(&self, vertex: usize) -> Result<()> {
        if vertex >= self.num_vertices {
            return Err(OutputError::FieldMismatch {
                label: self.label.clone(),
                expected: format!("vertex < {}", self.num_vertices),
                actual: vertex.to_string(),
            });
        }
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn vector_field_type(&self) -> VectorFieldType {
        self.vector_field_type
    }

    pub fn set_vector_field_type(&mut self, vector_field_type: VectorFieldType) {
        self.vector_field_type = vector_field_type;
    }

    pub fn fiber_dim(&self) -> usize {
        self.fiber_dim
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }
}

impl<M: MeshKind> Field<M> {
    pub fn matches_mesh(&self, mesh: &M) -> Result<()> {
        if self.num_vertices != mesh.num_vertices() {
            return Err(OutputError::FieldMismatch {
                label: self.label.clone(),
                expected: format!("{} vertices of '{}'", mesh.num_vertices(), mesh.label()),
                actual: self.num_vertices.to_string(),
            });
        }
        Ok(())
    }
}

impl<M> Clone for Field<M> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            vector_field_type: self.vector_field_type,
            scale: self.scale,
            fiber_dim: self.fiber_dim,
            num_vertices: self.num_vertices,
            values: self.values.clone(),
            allocated: self.allocated,
            _mesh: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Field<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("label", &self.label)
            .field("vector_field_type", &self.vector_field_type)
            .field("scale", &self.scale)
            .field("fiber_dim", &self.fiber_dim)
            .field("num_vertices", &self.num_vertices)
            .finish()
    }
}

/// Named collection of fields on one mesh.
pub struct Fields<M> {
    fields: BTreeMap<String, Field<M>>,
}

impl<M> Fields<M> {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, label: impl Into<String>) -> Result<&mut Field<M>> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(OutputError::DuplicateField { name });
        }
        Ok(self.fields.entry(name).or_insert_with(|| Field::new(label)))
    }

    /// Stores an already built field under `name`.
    pub fn insert(&mut self, name: impl Into<String>, field: Field<M>) -> Result<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(OutputError::DuplicateField { name });
        }
        self.fields.insert(name, field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Field<M>> {
        self.fields.get(name).ok_or_else(|| OutputError::FieldNotFound {
            name: name.to_string(),
        })
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Field<M>> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| OutputError::FieldNotFound {
                name: name.to_string(),
            })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn del(&mut self, name: &str) -> Result<Field<M>> {
        self.fields.remove(name).ok_or_else(|| OutputError::FieldNotFound {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<M> Default for Fields<M> {
    fn default() -> Self {
        Self::new()
    }
}
