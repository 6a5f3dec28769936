use tempfile::TempDir;
use vertex_output::adapters::writers::{data_writer, TimeStamp};
use vertex_output::core::vertex_filter::output_vertex_filter;
use vertex_output::core::{
    ConfigProvider, Field, FieldSource, Fields, Mesh, OutputFormat, SubMesh, VectorFieldType,
    VertexFilterKind,
};
use vertex_output::utils::validation::Validate;
use vertex_output::{
    mesh_output_vertex_filter, LocalStorage, MeshDocument, OutputEngine, OutputError, OutputManager,
    OutputSettings, TomlConfig, VertexFieldStore,
};

const FAULT_DOCUMENT: &str = r#"
{
  "mesh": {
    "label": "domain",
    "dimension": 2,
    "space_dim": 2,
    "coordinates": [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0],
    "cells": [[0, 1, 3, 2]]
  },
  "submesh": { "label": "fault", "vertices": [1, 3], "cells": [[1, 3]] },
  "time": 5.0,
  "solution": [
    { "label": "displacement", "name": "disp(t)", "vector_field_type": "vector", "fiber_dim": 2,
      "values": [0.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 2.0] }
  ],
  "fault": {
    "cumulative_slip": [3.0, 4.0, 0.0, 1.0],
    "orientation": [0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
    "area": [0.5, 2.0],
    "eq_srcs": [
      { "name": "mainshock", "final_slip": [3.0, 4.0, 0.0, 1.0], "slip_time": [0.0, 0.25] }
    ],
    "length_scale": 0.5
  }
}
"#;

fn triangle() -> Mesh {
    Mesh::new("domain", 2, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0], vec![vec![0, 1, 2]]).unwrap()
}

fn settings(output_path: &str, basename: &str, fields: &[&str], time: Option<f64>) -> OutputSettings {
    OutputSettings {
        basename: basename.to_string(),
        output_path: output_path.to_string(),
        vertex_data_fields: fields.iter().map(|f| f.to_string()).collect(),
        time,
    }
}

#[tokio::test]
async fn test_mesh_vector_norm_to_vtk() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let mut store = VertexFieldStore::new(triangle());
    let mut displacement = Field::from_values("displacement", 2, vec![3.0, 4.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
    displacement.set_vector_field_type(VectorFieldType::Vector);
    store.add_field("displacement", displacement).unwrap();

    let mut manager = OutputManager::new(
        Box::new(store),
        data_writer::<Mesh>(OutputFormat::Vtk, TimeStamp::default()),
        LocalStorage::new(output_path.clone()),
        settings(&output_path, "domain", &["displacement"], Some(2.0)),
    )
    .with_vertex_filter(Some(Box::new(mesh_output_vertex_filter().unwrap())));
    manager.initialize().unwrap();

    let engine = OutputEngine::new(manager);
    let result = engine.run().await.unwrap();
    assert!(result.ends_with("domain_t0002.vtk"));

    let content = std::fs::read_to_string(temp_dir.path().join("domain_t0002.vtk")).unwrap();
    assert!(content.starts_with("# vtk DataFile Version 2.0\ndomain t=2\n"));
    assert!(content.contains("CELL_TYPES 1\n5\n"));
    assert!(content.contains("POINT_DATA 3\nSCALARS displacement double 1\nLOOKUP_TABLE default\n5\n0\n1\n"));
    assert!(!content.contains("VECTORS"));
}

#[tokio::test]
async fn test_mesh_without_filter_keeps_vectors() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let mut store = VertexFieldStore::new(triangle());
    let mut displacement = Field::from_values("displacement", 2, vec![3.0, 4.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
    displacement.set_vector_field_type(VectorFieldType::Vector);
    store.add_field("displacement", displacement).unwrap();

    let filter = output_vertex_filter::<Mesh>(VertexFilterKind::None).unwrap();
    assert!(filter.is_none());

    let mut manager = OutputManager::new(
        Box::new(store),
        data_writer::<Mesh>(OutputFormat::Vtk, TimeStamp::default()),
        LocalStorage::new(output_path.clone()),
        settings(&output_path, "domain", &["displacement"], None),
    )
    .with_vertex_filter(filter);
    manager.initialize().unwrap();

    OutputEngine::new(manager).run().await.unwrap();

    let content = std::fs::read_to_string(temp_dir.path().join("domain.vtk")).unwrap();
    assert!(content.contains("VECTORS displacement double\n3 4 0\n0 0 0\n1 0 0\n"));
}

#[tokio::test]
async fn test_fault_document_to_csv() {
    let temp_dir = TempDir::new().unwrap();
    let document_path = temp_dir.path().join("fault.json");
    std::fs::write(&document_path, FAULT_DOCUMENT).unwrap();
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    let document = MeshDocument::from_file(&document_path).unwrap();
    assert!(document.has_fault());
    let time = document.time;
    let solution = document.solution_fields().unwrap();
    let source = document.into_fault_source().unwrap();

    let filter = output_vertex_filter::<SubMesh>(VertexFilterKind::VectorNorm).unwrap();
    let mut manager = OutputManager::new(
        Box::new(source),
        data_writer::<SubMesh>(OutputFormat::Csv, TimeStamp::default()),
        LocalStorage::new(output_path.clone()),
        settings(&output_path, "fault", &["slip", "traction_change", "slip_time_mainshock"], time),
    )
    .with_vertex_filter(filter)
    .with_solution(solution);
    manager.initialize().unwrap();

    let result = OutputEngine::new_with_monitoring(manager, false).run().await.unwrap();
    assert_eq!(result, format!("{}/fault_t0005.csv", output_path));

    let content = std::fs::read_to_string(temp_dir.path().join("out").join("fault_t0005.csv")).unwrap();
    assert_eq!(
        content,
        "t,vertex,x,y,cumulative_slip,traction_change,slip_time_mainshock\n\
         5,0,1,0,2.5,10,0\n\
         5,1,1,1,0.5,1,0.25\n"
    );
}

#[tokio::test]
async fn test_unknown_field_fails_extract() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let mesh = triangle();
    let fault_mesh = SubMesh::from_vertices(&mesh, "fault", vec![1, 2], vec![vec![1, 2]]).unwrap();
    let store: VertexFieldStore<SubMesh> = VertexFieldStore::new(fault_mesh);

    let mut manager = OutputManager::new(
        Box::new(store),
        data_writer::<SubMesh>(OutputFormat::Json, TimeStamp::default()),
        LocalStorage::new(output_path.clone()),
        settings(&output_path, "fault", &["slip"], None),
    );
    manager.initialize().unwrap();

    let err = OutputEngine::new(manager).run().await.unwrap_err();
    assert!(matches!(err, OutputError::UnknownField { .. }));
    assert!(!temp_dir.path().join("fault.json").exists());
}

#[tokio::test]
async fn test_run_before_initialize_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let manager = OutputManager::new(
        Box::new(VertexFieldStore::new(triangle())),
        data_writer::<Mesh>(OutputFormat::Vtk, TimeStamp::default()),
        LocalStorage::new(output_path.clone()),
        settings(&output_path, "domain", &["displacement"], None),
    );

    let err = OutputEngine::new(manager).run().await.unwrap_err();
    assert!(matches!(err, OutputError::NotInitialized { .. }));
}

#[test]
fn test_toml_config_drives_output_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("output.toml");
    std::fs::write(
        &config_path,
        r#"
[output]
name = "fault-output"
basename = "fault"
output_path = "./output"
vertex_data_fields = ["slip", "traction_change"]

[input]
document = "fault.json"
submesh = true

[writer]
format = "csv"
time_constant = 0.5
time_precision = 1

[filter]
kind = "none"
"#,
    )
    .unwrap();

    let config = TomlConfig::from_file(&config_path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.pipeline_name(), "fault-output");
    assert!(config.use_submesh());
    assert!(!config.monitoring_enabled());
    assert_eq!(config.writer_format(), OutputFormat::Csv);
    assert_eq!(config.vertex_filter(), VertexFilterKind::None);

    let writer = data_writer::<SubMesh>(
        config.writer_format(),
        TimeStamp::new(config.time_constant(), config.time_precision()),
    );
    assert_eq!(writer.filename(config.basename(), Some(1.25)), "fault_t0025.csv");
}

#[test]
fn test_mesh_store_falls_back_to_solution() {
    let mut solution: Fields<Mesh> = Fields::new();
    solution
        .insert("disp(t)", Field::from_values("displacement", 2, vec![0.0; 6]).unwrap())
        .unwrap();

    let mut store = VertexFieldStore::new(triangle());
    let field = store.vertex_field("disp(t)", Some(&solution)).unwrap();
    assert_eq!(field.label(), "displacement");
    assert!(store.vertex_field("velocity", Some(&solution)).is_err());
}
