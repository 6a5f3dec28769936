use crate::domain::model::MeshKind;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct OutputEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> OutputEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting output process...");
        self.monitor.log_stats("Start");

        // Extract
        let fields = self.pipeline.extract().await?;
        tracing::info!("Extracted {} vertex fields", fields.len());
        self.monitor.log_stats("Extract");

        // Transform
        let batch = self.pipeline.transform(fields).await?;
        tracing::info!(
            "Filtered {} of {} vertex fields",
            batch.filtered_fields,
            batch.fields.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(batch).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

/// Short description of a mesh for log lines.
pub fn describe_mesh<M: MeshKind>(mesh: &M) -> String {
    format!(
        "{} '{}' ({}D cells in {}D space, {} vertices, {} cells)",
        mesh.kind(),
        mesh.label(),
        mesh.dimension(),
        mesh.space_dim(),
        mesh.num_vertices(),
        mesh.cells().len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::Field;
    use crate::domain::model::{Mesh, OutputBatch};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockPipeline {
        loads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        type Mesh = Mesh;

        async fn extract(&self) -> Result<Vec<Field<Mesh>>> {
            Ok(vec![Field::from_values("pressure", 1, vec![1.0, 2.0])?])
        }

        async fn transform(&self, fields: Vec<Field<Mesh>>) -> Result<OutputBatch<Mesh>> {
            Ok(OutputBatch {
                fields,
                time: None,
                filtered_fields: 0,
            })
        }

        async fn load(&self, batch: OutputBatch<Mesh>) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("/tmp/{}.vtk", batch.fields[0].label()))
        }
    }

    #[test]
    fn test_run_executes_all_phases() {
        let engine = OutputEngine::new(MockPipeline {
            loads: AtomicUsize::new(0),
        });
        let output_path = tokio_test::block_on(engine.run()).unwrap();
        assert_eq!(output_path, "/tmp/pressure.vtk");
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_describe_mesh() {
        let mesh = Mesh::new("bar", 1, 1, vec![0.0, 1.0], vec![vec![0, 1]]).unwrap();
        assert_eq!(
            describe_mesh(&mesh),
            "mesh 'bar' (1D cells in 1D space, 2 vertices, 1 cells)"
        );
    }
}
