use crate::core::{ConfigProvider, OutputFormat, VertexFilterKind};
use crate::utils::error::{OutputError, Result};
use crate::utils::logger::LOG_LEVELS;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_list, validate_non_empty_string, validate_path,
    validate_positive, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub output: OutputSection,
    pub input: InputSection,
    pub writer: Option<WriterSection>,
    pub filter: Option<FilterSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub name: Option<String>,
    pub basename: String,
    pub output_path: String,
    pub vertex_data_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSection {
    pub document: String,
    pub submesh: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterSection {
    pub format: Option<OutputFormat>,
    pub time_constant: Option<f64>,
    pub time_precision: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSection {
    pub kind: Option<VertexFilterKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OutputError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OutputError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OutputError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("output.basename", &self.output.basename)?;
        validate_path("output.output_path", &self.output.output_path)?;
        validate_non_empty_list("output.vertex_data_fields", &self.output.vertex_data_fields)?;

        validate_path("input.document", &self.input.document)?;
        validate_file_extension("input.document", &self.input.document, &["json"])?;

        validate_positive("writer.time_constant", self.time_constant())?;
        validate_range("writer.time_precision", self.time_precision(), 0, 9)?;

        if let Some(level) = self.log_level() {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(OutputError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Must be one of: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn input_document(&self) -> &str {
        &self.input.document
    }

    pub fn use_submesh(&self) -> bool {
        self.input.submesh.unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn pipeline_name(&self) -> &str {
        self.output.name.as_deref().unwrap_or(&self.output.basename)
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn basename(&self) -> &str {
        &self.output.basename
    }

    fn writer_format(&self) -> OutputFormat {
        self.writer.as_ref().and_then(|w| w.format).unwrap_or_default()
    }

    fn vertex_filter(&self) -> VertexFilterKind {
        self.filter.as_ref().and_then(|f| f.kind).unwrap_or_default()
    }

    fn vertex_data_fields(&self) -> &[String] {
        &self.output.vertex_data_fields
    }

    fn time_constant(&self) -> f64 {
        self.writer.as_ref().and_then(|w| w.time_constant).unwrap_or(1.0)
    }

    fn time_precision(&self) -> usize {
        self.writer.as_ref().and_then(|w| w.time_precision).unwrap_or(0)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
