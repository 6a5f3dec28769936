use crate::core::fault_fields::FaultOutputFields;
use crate::core::field_store::VertexFieldStore;
use crate::domain::field::{Field, Fields};
use crate::domain::model::{Mesh, MeshKind, SubMesh, VectorFieldType};
use crate::utils::error::{OutputError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDocument {
    pub mesh: MeshData,
    pub submesh: Option<SubMeshData>,
    pub time: Option<f64>,
    #[serde(default)]
    pub fields: Vec<FieldData>,
    /// Solver fields (e.g. "disp(t)") on the full mesh.
    #[serde(default)]
    pub solution: Vec<FieldData>,
    /// Kinematic fault state on the sub-mesh.
    pub fault: Option<FaultData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshData {
    pub label: String,
    pub dimension: usize,
    pub space_dim: usize,
    pub coordinates: Vec<f64>,
    #[serde(default)]
    pub cells: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubMeshData {
    pub label: String,
    pub vertices: Vec<usize>,
    #[serde(default)]
    pub cells: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultData {
    pub label: Option<String>,
    pub cumulative_slip: Vec<f64>,
    pub orientation: Vec<f64>,
    pub area: Vec<f64>,
    #[serde(default)]
    pub eq_srcs: Vec<EqSrcData>,
    pub length_scale: Option<f64>,
    pub pressure_scale: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EqSrcData {
    pub name: String,
    pub final_slip: Vec<f64>,
    pub slip_time: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    #[default]
    Mesh,
    Submesh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldData {
    pub label: String,
    /// Lookup name; defaults to the label.
    pub name: Option<String>,
    #[serde(default)]
    pub vector_field_type: VectorFieldType,
    pub scale: Option<f64>,
    pub fiber_dim: usize,
    pub values: Vec<f64>,
    #[serde(default)]
    pub on: FieldLocation,
}

impl FieldData {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.label)
    }

    fn to_field<M>(&self) -> Result<Field<M>> {
        let mut field = Field::from_values(self.label.clone(), self.fiber_dim, self.values.clone())?;
        field.set_vector_field_type(self.vector_field_type);
        field.set_scale(self.scale.unwrap_or(1.0));
        Ok(field)
    }
}

impl MeshDocument {
    /// 從 JSON 檔案載入網格與欄位
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn has_submesh(&self) -> bool {
        self.submesh.is_some()
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    fn build_mesh(&self) -> Result<Mesh> {
        Mesh::new(
            self.mesh.label.clone(),
            self.mesh.dimension,
            self.mesh.space_dim,
            self.mesh.coordinates.clone(),
            self.mesh.cells.clone(),
        )
    }

    pub fn solution_fields(&self) -> Result<Fields<Mesh>> {
        let mut fields = Fields::new();
        for data in &self.solution {
            fields.insert(data.name(), data.to_field()?)?;
        }
        Ok(fields)
    }

    pub fn into_mesh_source(self) -> Result<VertexFieldStore<Mesh>> {
        let mut store = VertexFieldStore::new(self.build_mesh()?);
        for data in self.fields.iter().filter(|f| f.on == FieldLocation::Mesh) {
            store.add_field(data.name(), data.to_field()?)?;
        }
        tracing::debug!(
            "Loaded mesh '{}' with {} vertex fields",
            self.mesh.label,
            store.fields().len()
        );
        Ok(store)
    }

    fn build_submesh(&self) -> Result<SubMesh> {
        let submesh = self.submesh.as_ref().ok_or_else(|| OutputError::MissingConfigError {
            field: "submesh".to_string(),
        })?;
        let mesh = self.build_mesh()?;
        SubMesh::from_vertices(
            &mesh,
            submesh.label.clone(),
            submesh.vertices.clone(),
            submesh.cells.clone(),
        )
    }

    pub fn into_fault_source(self) -> Result<FaultOutputFields> {
        let submesh = self.build_submesh()?;
        let fault = self.fault.ok_or_else(|| OutputError::MissingConfigError {
            field: "fault".to_string(),
        })?;

        let label = fault.label.unwrap_or_else(|| submesh.label().to_string());
        let mut source = FaultOutputFields::new(
            label,
            submesh,
            fault.length_scale.unwrap_or(1.0),
            fault.pressure_scale.unwrap_or(1.0),
        )?;
        source.set_cumulative_slip(&fault.cumulative_slip)?;
        source.set_orientation(&fault.orientation)?;
        source.set_area(&fault.area)?;
        for eq_src in fault.eq_srcs {
            source.add_eq_src(&eq_src.name, eq_src.final_slip, eq_src.slip_time)?;
        }
        tracing::debug!("Loaded fault '{}'", source.label());
        Ok(source)
    }

    pub fn into_submesh_source(self) -> Result<VertexFieldStore<SubMesh>> {
        let submesh = self.build_submesh()?;

        let mut store = VertexFieldStore::new(submesh);
        for data in self.fields.iter().filter(|f| f.on == FieldLocation::Submesh) {
            store.add_field(data.name(), data.to_field()?)?;
        }
        Ok(store)
    }
}
