use crate::domain::field::Field;
use crate::utils::error::{OutputError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the components of a vertex field are interpreted by writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorFieldType {
    Scalar,
    Vector,
    Tensor,
    #[default]
    Other,
}

impl VectorFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorFieldType::Scalar => "scalar",
            VectorFieldType::Vector => "vector",
            VectorFieldType::Tensor => "tensor",
            VectorFieldType::Other => "other",
        }
    }
}

/// Read access shared by the full mesh and its sub-meshes.
pub trait MeshKind: Send + Sync + 'static {
    fn kind(&self) -> &'static str;
    fn label(&self) -> &str;
    /// Cell dimension.
    fn dimension(&self) -> usize;
    fn space_dim(&self) -> usize;
    fn num_vertices(&self) -> usize;
    fn vertex_coordinates(&self, vertex: usize) -> &[f64];
    fn cells(&self) -> &[Vec<usize>];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    label: String,
    dimension: usize,
    space_dim: usize,
    coordinates: Vec<f64>,
    cells: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new(
        label: impl Into<String>,
        dimension: usize,
        space_dim: usize,
        coordinates: Vec<f64>,
        cells: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let label = label.into();
        let invalid = |reason: String| OutputError::InvalidMesh {
            label: label.clone(),
            reason,
        };

        if !(1..=3).contains(&space_dim) {
            return Err(invalid(format!("space dimension {} not in 1..=3", space_dim)));
        }
        if dimension > space_dim {
            return Err(invalid(format!(
                "cell dimension {} exceeds space dimension {}",
                dimension, space_dim
            )));
        }
        if coordinates.len() % space_dim != 0 {
            return Err(invalid(format!(
                "{} coordinate values is not a multiple of space dimension {}",
                coordinates.len(),
                space_dim
            )));
        }

        let num_vertices = coordinates.len() / space_dim;
        for (index, cell) in cells.iter().enumerate() {
            if let Some(&vertex) = cell.iter().find(|&&v| v >= num_vertices) {
                return Err(invalid(format!(
                    "cell {} references vertex {} but mesh has {} vertices",
                    index, vertex, num_vertices
                )));
            }
        }

        Ok(Self {
            label,
            dimension,
            space_dim,
            coordinates,
            cells,
        })
    }
}

impl MeshKind for Mesh {
    fn kind(&self) -> &'static str {
        "mesh"
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn space_dim(&self) -> usize {
        self.space_dim
    }

    fn num_vertices(&self) -> usize {
        self.coordinates.len() / self.space_dim
    }

    fn vertex_coordinates(&self, vertex: usize) -> &[f64] {
        let start = vertex * self.space_dim;
        &self.coordinates[start..start + self.space_dim]
    }

    fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }
}

/// Lower-dimensional piece of a mesh (fault surface, boundary) with its own
/// vertex numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    label: String,
    dimension: usize,
    space_dim: usize,
    coordinates: Vec<f64>,
    cells: Vec<Vec<usize>>,
    parent_vertices: Vec<usize>,
    renumbering: HashMap<usize, usize>,
}

impl SubMesh {
    /// `vertices` and `cells` use the parent's numbering; sub-mesh vertex `i`
    /// is `vertices[i]`.
    pub fn from_vertices(
        parent: &Mesh,
        label: impl Into<String>,
        vertices: Vec<usize>,
        cells: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let label = label.into();
        let invalid = |reason: String| OutputError::InvalidMesh {
            label: label.clone(),
            reason,
        };

        let mut renumbering = HashMap::with_capacity(vertices.len());
        let mut coordinates = Vec::with_capacity(vertices.len() * parent.space_dim());
        for (sub_vertex, &parent_vertex) in vertices.iter().enumerate() {
            if parent_vertex >= parent.num_vertices() {
                return Err(invalid(format!(
                    "vertex {} not in parent mesh '{}'",
                    parent_vertex,
                    parent.label()
                )));
            }
            if renumbering.insert(parent_vertex, sub_vertex).is_some() {
                return Err(invalid(format!("duplicate vertex {}", parent_vertex)));
            }
            coordinates.extend_from_slice(parent.vertex_coordinates(parent_vertex));
        }

        let cells = cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                cell.into_iter()
                    .map(|v| {
                        renumbering.get(&v).copied().ok_or_else(|| {
                            invalid(format!("cell {} references vertex {} outside sub-mesh", index, v))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dimension: parent.dimension().saturating_sub(1),
            space_dim: parent.space_dim(),
            label,
            coordinates,
            cells,
            parent_vertices: vertices,
            renumbering,
        })
    }

    pub fn parent_vertex(&self, vertex: usize) -> Option<usize> {
        self.parent_vertices.get(vertex).copied()
    }

    pub fn sub_vertex(&self, parent_vertex: usize) -> Option<usize> {
        self.renumbering.get(&parent_vertex).copied()
    }
}

impl MeshKind for SubMesh {
    fn kind(&self) -> &'static str {
        "submesh"
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn space_dim(&self) -> usize {
        self.space_dim
    }

    fn num_vertices(&self) -> usize {
        self.parent_vertices.len()
    }

    fn vertex_coordinates(&self, vertex: usize) -> &[f64] {
        let start = vertex * self.space_dim;
        &self.coordinates[start..start + self.space_dim]
    }

    fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }
}

/// Fields ready for a writer, after the vertex filter ran.
#[derive(Debug)]
pub struct OutputBatch<M> {
    pub fields: Vec<Field<M>>,
    pub time: Option<f64>,
    pub filtered_fields: usize,
}
