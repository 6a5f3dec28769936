use crate::domain::field::{Field, Fields};
use crate::domain::model::{Mesh, MeshKind, OutputBatch};
use crate::domain::ports::{DataWriter, FieldSource, Pipeline, Storage, VertexFilter};
use crate::utils::error::{OutputError, Result};
use crate::utils::validation::{validate_non_empty_list, validate_non_empty_string, validate_path};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub basename: String,
    pub output_path: String,
    pub vertex_data_fields: Vec<String>,
    pub time: Option<f64>,
}

/// Gathers vertex fields from a source, runs them through the vertex filter
/// and hands them to a data writer.
pub struct OutputManager<M: MeshKind, S: Storage> {
    settings: OutputSettings,
    source: Mutex<Box<dyn FieldSource<M>>>,
    filter: Mutex<Option<Box<dyn VertexFilter<M>>>>,
    writer: Box<dyn DataWriter<M>>,
    storage: S,
    solution: Option<Fields<Mesh>>,
    initialized: bool,
}

impl<M: MeshKind, S: Storage> OutputManager<M, S> {
    pub fn new(
        source: Box<dyn FieldSource<M>>,
        writer: Box<dyn DataWriter<M>>,
        storage: S,
        settings: OutputSettings,
    ) -> Self {
        Self {
            settings,
            source: Mutex::new(source),
            filter: Mutex::new(None),
            writer,
            storage,
            solution: None,
            initialized: false,
        }
    }

    pub fn with_vertex_filter(mut self, filter: Option<Box<dyn VertexFilter<M>>>) -> Self {
        self.filter = Mutex::new(filter);
        self.initialized = false;
        self
    }

    pub fn with_solution(mut self, solution: Fields<Mesh>) -> Self {
        self.solution = Some(solution);
        self
    }

    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }

    /// Checks the settings and initializes the vertex filter.
    pub fn initialize(&mut self) -> Result<()> {
        validate_non_empty_string("output.basename", &self.settings.basename)?;
        validate_path("output.output_path", &self.settings.output_path)?;
        validate_non_empty_list("output.vertex_data_fields", &self.settings.vertex_data_fields)?;

        if let Some(filter) = self.filter.get_mut() {
            filter.initialize()?;
            tracing::debug!("Vertex filter '{}' ready", filter.name());
        }

        self.initialized = true;
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(OutputError::NotInitialized {
                component: "output manager".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<M: MeshKind, S: Storage> Pipeline for OutputManager<M, S> {
    type Mesh = M;

    async fn extract(&self) -> Result<Vec<Field<M>>> {
        self.ensure_initialized()?;
        let mut source = self.source.lock().await;

        let mut fields = Vec::with_capacity(self.settings.vertex_data_fields.len());
        for name in &self.settings.vertex_data_fields {
            let field = source.vertex_field(name, self.solution.as_ref())?;
            tracing::debug!(
                "Extracted vertex field '{}' ({} vertices x {})",
                name,
                field.num_vertices(),
                field.fiber_dim()
            );
            fields.push(field.clone());
        }
        Ok(fields)
    }

    async fn transform(&self, fields: Vec<Field<M>>) -> Result<OutputBatch<M>> {
        self.ensure_initialized()?;
        let source = self.source.lock().await;
        let mut filter = self.filter.lock().await;

        let Some(filter) = filter.as_mut() else {
            return Ok(OutputBatch {
                fields,
                time: self.settings.time,
                filtered_fields: 0,
            });
        };

        let filtered = fields
            .iter()
            .map(|field| filter.filter(field, source.mesh()).map(|f| f.clone()))
            .collect::<Result<Vec<_>>>()?;

        Ok(OutputBatch {
            filtered_fields: filtered.len(),
            fields: filtered,
            time: self.settings.time,
        })
    }

    async fn load(&self, batch: OutputBatch<M>) -> Result<String> {
        self.ensure_initialized()?;
        let filename = self.writer.filename(&self.settings.basename, batch.time);

        let data = {
            let source = self.source.lock().await;
            self.writer.encode(source.mesh(), batch.time, &batch.fields)?
        };

        tracing::debug!(
            "Writing {} ({} bytes, {:?}) to storage",
            filename,
            data.len(),
            self.writer.format()
        );
        self.storage.write_file(&filename, &data).await?;

        Ok(format!("{}/{}", self.settings.output_path, filename))
    }
}
