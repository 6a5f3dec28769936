use crate::domain::field::{Field, Fields};
use crate::domain::model::{Mesh, MeshKind, SubMesh};
use crate::domain::ports::FieldSource;
use crate::utils::error::{OutputError, Result};

/// Mesh together with the vertex fields loaded for it.
pub struct VertexFieldStore<M> {
    mesh: M,
    fields: Fields<M>,
}

impl<M: MeshKind> VertexFieldStore<M> {
    pub fn new(mesh: M) -> Self {
        Self {
            mesh,
            fields: Fields::new(),
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, field: Field<M>) -> Result<()> {
        field.matches_mesh(&self.mesh)?;
        self.fields.insert(name, field)
    }

    pub fn fields(&self) -> &Fields<M> {
        &self.fields
    }

    fn unknown(&self, name: &str) -> OutputError {
        OutputError::UnknownField {
            name: name.to_string(),
            source_label: self.mesh.label().to_string(),
        }
    }
}

impl FieldSource<Mesh> for VertexFieldStore<Mesh> {
    fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn available_fields(&self) -> Vec<String> {
        self.fields.names()
    }

    fn vertex_field(&mut self, name: &str, solution: Option<&Fields<Mesh>>) -> Result<&Field<Mesh>> {
        if self.fields.has_field(name) {
            return self.fields.get(name);
        }

        // 找不到時改用求解器的欄位 (例如 "disp(t)")
        match solution.filter(|fields| fields.has_field(name)) {
            Some(fields) => {
                let field = fields.get(name)?;
                field.matches_mesh(&self.mesh)?;
                self.fields.insert(name, field.clone())?;
                self.fields.get(name)
            }
            None => Err(self.unknown(name)),
        }
    }
}

impl FieldSource<SubMesh> for VertexFieldStore<SubMesh> {
    fn mesh(&self) -> &SubMesh {
        &self.mesh
    }

    fn available_fields(&self) -> Vec<String> {
        self.fields.names()
    }

    fn vertex_field(&mut self, name: &str, _solution: Option<&Fields<Mesh>>) -> Result<&Field<SubMesh>> {
        if self.fields.has_field(name) {
            return self.fields.get(name);
        }
        Err(self.unknown(name))
    }
}
