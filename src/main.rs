use anyhow::Context;
use clap::Parser;
use vertex_output::adapters::writers::{data_writer, TimeStamp};
use vertex_output::core::engine::describe_mesh;
use vertex_output::core::vertex_filter::output_vertex_filter;
use vertex_output::core::{ConfigProvider, FieldSource, Fields, Mesh, MeshKind, SubMesh};
use vertex_output::utils::error::ErrorSeverity;
use vertex_output::utils::{logger, validation::Validate};
use vertex_output::{
    CliConfig, LocalStorage, MeshDocument, OutputEngine, OutputError, OutputManager, OutputSettings,
    TomlConfig,
};

struct RunOptions {
    time: Option<f64>,
    monitor: bool,
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 先讀取 TOML，日誌等級可能來自 [monitoring]
    let toml_config = cli.config.as_ref().map(TomlConfig::from_file);
    let log_level = match &toml_config {
        Some(Ok(config)) => config.log_level(),
        _ => None,
    };

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose, log_level);
    } else {
        logger::init_cli_logger(cli.verbose, log_level);
    }

    tracing::info!("🚀 Starting vertex-output");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置，TOML 優先
    let (provider, input, use_submesh, monitor): (Box<dyn ConfigProvider>, String, bool, bool) =
        match toml_config {
            Some(loaded) => {
                tracing::info!("📁 Loading configuration from: {}", cli.config.as_deref().unwrap_or_default());
                let config = loaded.unwrap_or_else(|e| exit_with(&e));
                if let Err(e) = config.validate() {
                    exit_with(&e);
                }
                tracing::info!("✅ Configuration '{}' validated", config.pipeline_name());
                let input = config.input_document().to_string();
                let use_submesh = cli.submesh || config.use_submesh();
                let monitor = cli.monitor || config.monitoring_enabled();
                (Box::new(config) as Box<dyn ConfigProvider>, input, use_submesh, monitor)
            }
            None => {
                if let Err(e) = cli.validate() {
                    exit_with(&e);
                }
                let input = cli.input.clone().unwrap_or_default();
                (Box::new(cli.clone()) as Box<dyn ConfigProvider>, input, cli.submesh, cli.monitor)
            }
        };

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let document = MeshDocument::from_file(&input)
        .with_context(|| format!("failed to load input document '{}'", input))?;
    let options = RunOptions {
        time: document.time,
        monitor,
        dry_run: cli.dry_run,
    };

    let result = if use_submesh && document.has_fault() {
        let solution = document.solution_fields().unwrap_or_else(|e| exit_with(&e));
        let source = document.into_fault_source().unwrap_or_else(|e| exit_with(&e));
        run_output::<SubMesh>(Box::new(source), solution, provider.as_ref(), &options).await
    } else if use_submesh {
        let source = document.into_submesh_source().unwrap_or_else(|e| exit_with(&e));
        run_output::<SubMesh>(Box::new(source), Fields::new(), provider.as_ref(), &options).await
    } else {
        let solution = document.solution_fields().unwrap_or_else(|e| exit_with(&e));
        let source = document.into_mesh_source().unwrap_or_else(|e| exit_with(&e));
        run_output::<Mesh>(Box::new(source), solution, provider.as_ref(), &options).await
    };

    match result {
        Ok(Some(output_path)) => {
            tracing::info!("✅ Output written successfully!");
            println!("✅ Output written successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Ok(None) => {}
        Err(e) => exit_with(&e),
    }

    Ok(())
}

async fn run_output<M: MeshKind>(
    source: Box<dyn FieldSource<M>>,
    solution: Fields<Mesh>,
    config: &dyn ConfigProvider,
    options: &RunOptions,
) -> vertex_output::Result<Option<String>> {
    tracing::info!("🧭 Output on {}", describe_mesh(source.mesh()));

    let time_stamp = TimeStamp::new(config.time_constant(), config.time_precision());
    let writer = data_writer::<M>(config.writer_format(), time_stamp);

    if options.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        println!("Mesh: {}", describe_mesh(source.mesh()));
        println!("Available fields: {}", source.available_fields().join(", "));
        println!("Requested fields: {}", config.vertex_data_fields().join(", "));
        println!("Vertex filter: {:?}", config.vertex_filter());
        println!(
            "Output file: {}/{}",
            config.output_path(),
            writer.filename(config.basename(), options.time)
        );
        return Ok(None);
    }

    let filter = output_vertex_filter::<M>(config.vertex_filter())?;
    let storage = LocalStorage::new(config.output_path());
    let settings = OutputSettings {
        basename: config.basename().to_string(),
        output_path: config.output_path().to_string(),
        vertex_data_fields: config.vertex_data_fields().to_vec(),
        time: options.time,
    };

    let mut manager = OutputManager::new(source, writer, storage, settings)
        .with_vertex_filter(filter)
        .with_solution(solution);
    manager.initialize()?;

    let engine = OutputEngine::new_with_monitoring(manager, options.monitor);
    engine.run().await.map(Some)
}

fn exit_with(e: &OutputError) -> ! {
    tracing::error!(
        "❌ Output failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
