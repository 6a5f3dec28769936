use crate::domain::field::Field;
use crate::domain::model::{Mesh, MeshKind, SubMesh, VectorFieldType};
use crate::domain::ports::{FilterState, VertexFilter, VertexFilterKind};
use crate::utils::error::{OutputError, Result};

/// Replaces each vertex's values by their Euclidean norm.
pub struct VertexFilterVecNorm<M> {
    name: String,
    state: FilterState,
    field_vec_norm: Option<Field<M>>,
}

pub type MeshVertexFilterVecNorm = VertexFilterVecNorm<Mesh>;
pub type SubMeshVertexFilterVecNorm = VertexFilterVecNorm<SubMesh>;

impl<M: MeshKind> VertexFilterVecNorm<M> {
    pub fn new() -> Self {
        Self {
            name: "vertexfiltervecnorm".to_string(),
            state: FilterState::Unconfigured,
            field_vec_norm: None,
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }
}

impl<M: MeshKind> Default for VertexFilterVecNorm<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MeshKind> VertexFilter<M> for VertexFilterVecNorm<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn configure(&mut self) -> Result<()> {
        // 沒有可調參數，只需重設狀態
        self.field_vec_norm = None;
        self.state = FilterState::Configured;
        tracing::debug!("Configured vertex filter '{}'", self.name);
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        match self.state {
            FilterState::Unconfigured => Err(OutputError::NotConfigured {
                component: format!("vertex filter '{}'", self.name),
            }),
            FilterState::Configured => {
                self.state = FilterState::Initialized;
                tracing::debug!("Initialized vertex filter '{}'", self.name);
                Ok(())
            }
            FilterState::Initialized => Ok(()),
        }
    }

    fn filter(&mut self, field_in: &Field<M>, mesh: &M) -> Result<&Field<M>> {
        if self.state != FilterState::Initialized {
            return Err(OutputError::NotInitialized {
                component: format!("vertex filter '{}'", self.name),
            });
        }
        field_in.matches_mesh(mesh)?;

        let num_vertices = field_in.num_vertices();
        let field_vec_norm = self
            .field_vec_norm
            .get_or_insert_with(|| Field::new(field_in.label()));
        if !field_vec_norm.is_allocated() || field_vec_norm.num_vertices() != num_vertices {
            field_vec_norm.new_section(num_vertices, 1);
        }
        field_vec_norm.set_label(field_in.label());
        field_vec_norm.set_scale(field_in.scale());
        field_vec_norm.set_vector_field_type(VectorFieldType::Scalar);

        for (vertex, values) in field_in.points().enumerate().take(num_vertices) {
            let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
            field_vec_norm.update_point(vertex, &[norm])?;
        }

        tracing::debug!(
            "Computed vector norm of '{}' over {} vertices of '{}'",
            field_in.label(),
            num_vertices,
            mesh.label()
        );
        Ok(field_vec_norm)
    }

    fn deallocate(&mut self) {
        self.field_vec_norm = None;
    }

    fn boxed_clone(&self) -> Box<dyn VertexFilter<M>> {
        Box::new(Self {
            name: self.name.clone(),
            state: self.state,
            field_vec_norm: None,
        })
    }
}

/// Configured vector-norm filter for output on the full mesh.
pub fn mesh_output_vertex_filter() -> Result<MeshVertexFilterVecNorm> {
    let mut filter = MeshVertexFilterVecNorm::new();
    filter.configure()?;
    Ok(filter)
}

/// Configured vector-norm filter for output on a sub-mesh.
pub fn submesh_output_vertex_filter() -> Result<SubMeshVertexFilterVecNorm> {
    let mut filter = SubMeshVertexFilterVecNorm::new();
    filter.configure()?;
    Ok(filter)
}

pub fn output_vertex_filter<M: MeshKind>(kind: VertexFilterKind) -> Result<Option<Box<dyn VertexFilter<M>>>> {
    match kind {
        VertexFilterKind::None => Ok(None),
        VertexFilterKind::VectorNorm => {
            let mut filter = VertexFilterVecNorm::<M>::new();
            filter.configure()?;
            Ok(Some(Box::new(filter)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_mesh(num_vertices: usize) -> Mesh {
        let coordinates = (0..num_vertices).map(|i| i as f64).collect();
        let cells = (1..num_vertices).map(|i| vec![i - 1, i]).collect();
        Mesh::new("line", 1, 1, coordinates, cells).unwrap()
    }

    fn fault() -> SubMesh {
        let mesh = Mesh::new(
            "domain",
            2,
            2,
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![vec![0, 1, 3, 2]],
        )
        .unwrap();
        SubMesh::from_vertices(&mesh, "fault", vec![1, 3], vec![vec![1, 3]]).unwrap()
    }

    #[test]
    fn test_mesh_filter_constructor() {
        let mut filter = MeshVertexFilterVecNorm::new();
        assert_eq!(filter.state(), FilterState::Unconfigured);
        filter.configure().unwrap();
        assert_eq!(filter.state(), FilterState::Configured);
    }

    #[test]
    fn test_mesh_filter_initialize() {
        let mut filter = MeshVertexFilterVecNorm::new();
        filter.configure().unwrap();
        filter.initialize().unwrap();
        assert_eq!(filter.state(), FilterState::Initialized);
        // 重複呼叫不影響狀態
        filter.initialize().unwrap();
        assert_eq!(filter.state(), FilterState::Initialized);
    }

    #[test]
    fn test_mesh_factory() {
        let filter = mesh_output_vertex_filter().unwrap();
        assert_eq!(filter.state(), FilterState::Configured);
        assert_eq!(filter.name(), "vertexfiltervecnorm");
    }

    #[test]
    fn test_submesh_filter_constructor() {
        let mut filter = SubMeshVertexFilterVecNorm::new();
        filter.configure().unwrap();
        assert_eq!(filter.state(), FilterState::Configured);
    }

    #[test]
    fn test_submesh_filter_initialize() {
        let mut filter = SubMeshVertexFilterVecNorm::new();
        filter.configure().unwrap();
        filter.initialize().unwrap();
        assert_eq!(filter.state(), FilterState::Initialized);
    }

    #[test]
    fn test_submesh_factory() {
        let filter = submesh_output_vertex_filter().unwrap();
        assert_eq!(filter.state(), FilterState::Configured);
    }

    #[test]
    fn test_initialize_requires_configure() {
        let mut filter = MeshVertexFilterVecNorm::new();
        assert!(matches!(
            filter.initialize(),
            Err(OutputError::NotConfigured { .. })
        ));
    }

    #[test]
    fn test_filter_requires_initialize() {
        let mesh = line_mesh(2);
        let field = Field::from_values("disp", 1, vec![1.0, 2.0]).unwrap();
        let mut filter = mesh_output_vertex_filter().unwrap();
        assert!(matches!(
            filter.filter(&field, &mesh),
            Err(OutputError::NotInitialized { .. })
        ));
    }

    #[test]
    fn test_reconfigure_after_initialize() {
        let mesh = line_mesh(2);
        let field = Field::from_values("disp", 1, vec![-1.0, 2.0]).unwrap();
        let mut filter = mesh_output_vertex_filter().unwrap();
        filter.initialize().unwrap();
        filter.filter(&field, &mesh).unwrap();

        filter.configure().unwrap();
        assert_eq!(filter.state(), FilterState::Configured);
        assert!(filter.field_vec_norm.is_none());
        assert!(matches!(
            filter.filter(&field, &mesh),
            Err(OutputError::NotInitialized { .. })
        ));

        filter.initialize().unwrap();
        assert_eq!(filter.filter(&field, &mesh).unwrap().values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_filter_computes_norm() {
        let mesh = line_mesh(3);
        let mut field = Field::from_values(
            "displacement",
            2,
            vec![3.0, 4.0, 0.0, 0.0, -1.0, 1.0],
        )
        .unwrap();
        field.set_scale(2.5);
        field.set_vector_field_type(VectorFieldType::Vector);

        let mut filter = mesh_output_vertex_filter().unwrap();
        filter.initialize().unwrap();
        let result = filter.filter(&field, &mesh).unwrap();

        assert_eq!(result.label(), "displacement");
        assert_eq!(result.scale(), 2.5);
        assert_eq!(result.fiber_dim(), 1);
        assert_eq!(result.vector_field_type(), VectorFieldType::Scalar);
        let values = result.values();
        assert!((values[0] - 5.0).abs() < 1e-12);
        assert_eq!(values[1], 0.0);
        assert!((values[2] - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_filter_on_submesh_field() {
        let fault = fault();
        let slip = Field::from_values("slip", 2, vec![0.0, 2.0, 6.0, 8.0]).unwrap();

        let mut filter = submesh_output_vertex_filter().unwrap();
        filter.initialize().unwrap();
        let result = filter.filter(&slip, &fault).unwrap();
        assert_eq!(result.values(), &[2.0, 10.0]);
    }

    #[test]
    fn test_filter_rejects_mismatched_field() {
        let mesh = line_mesh(3);
        let field = Field::from_values("disp", 2, vec![1.0, 2.0]).unwrap();
        let mut filter = mesh_output_vertex_filter().unwrap();
        filter.initialize().unwrap();
        assert!(matches!(
            filter.filter(&field, &mesh),
            Err(OutputError::FieldMismatch { .. })
        ));
    }

    #[test]
    fn test_filter_reallocates_buffer_on_size_change() {
        let mut filter = mesh_output_vertex_filter().unwrap();
        filter.initialize().unwrap();

        let small = line_mesh(2);
        let field = Field::from_values("a", 1, vec![-1.0, 2.0]).unwrap();
        assert_eq!(filter.filter(&field, &small).unwrap().values(), &[1.0, 2.0]);

        let large = line_mesh(3);
        let field = Field::from_values("b", 1, vec![-3.0, 0.0, 4.0]).unwrap();
        let result = filter.filter(&field, &large).unwrap();
        assert_eq!(result.label(), "b");
        assert_eq!(result.values(), &[3.0, 0.0, 4.0]);
    }

    #[test]
    fn test_filter_empty_field() {
        let mesh = Mesh::new("empty", 1, 1, vec![], vec![]).unwrap();
        let field = Field::with_section("nothing", 0, 3);
        let mut filter = mesh_output_vertex_filter().unwrap();
        filter.initialize().unwrap();
        let result = filter.filter(&field, &mesh).unwrap();
        assert_eq!(result.num_vertices(), 0);
        assert!(result.values().is_empty());
    }

    #[test]
    fn test_boxed_clone_keeps_state_without_buffer() {
        let mesh = line_mesh(2);
        let field = Field::from_values("a", 1, vec![1.0, 1.0]).unwrap();
        let mut filter = mesh_output_vertex_filter().unwrap();
        filter.initialize().unwrap();
        filter.filter(&field, &mesh).unwrap();

        let mut copy = filter.boxed_clone();
        assert_eq!(copy.state(), FilterState::Initialized);
        assert_eq!(copy.filter(&field, &mesh).unwrap().values(), &[1.0, 1.0]);

        filter.deallocate();
        assert_eq!(filter.state(), FilterState::Initialized);
    }

    #[test]
    fn test_output_vertex_filter_kinds() {
        assert!(output_vertex_filter::<Mesh>(VertexFilterKind::None).unwrap().is_none());
        let filter = output_vertex_filter::<SubMesh>(VertexFilterKind::VectorNorm)
            .unwrap()
            .unwrap();
        assert_eq!(filter.state(), FilterState::Configured);
    }
}
