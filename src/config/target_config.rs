use crate::core::csv_writer::{CsvDialect, CsvFileSink};
use crate::utils::error::{Result, TargetError};
use crate::utils::validation::{validate_csv_char, validate_distinct, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `--config` 指定的設定檔內容 (JSON 或 TOML)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub delimiter: Option<String>,
    pub quotechar: Option<String>,
    /// 所有 stream 共用的輸出檔
    pub filename: Option<String>,
    /// `<stream>.csv` 所在目錄
    pub destination_path: Option<String>,
}

impl TargetConfig {
    /// 依副檔名決定格式：`.toml` 用 TOML，其餘視為 JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(TargetError::IoError)?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        serde_json::from_str(&processed_content).map_err(|e| TargetError::ConfigValidationError {
            field: "json_parsing".to_string(),
            message: format!("JSON parsing error: {}", e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TargetError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TargetError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn dialect(&self) -> Result<CsvDialect> {
        let defaults = CsvDialect::default();
        let delimiter = match &self.delimiter {
            Some(value) => validate_csv_char("delimiter", value)?,
            None => defaults.delimiter,
        };
        let quote = match &self.quotechar {
            Some(value) => validate_csv_char("quotechar", value)?,
            None => defaults.quote,
        };
        validate_distinct("delimiter", delimiter, "quotechar", quote)?;

        Ok(CsvDialect { delimiter, quote })
    }
}

impl Validate for TargetConfig {
    fn validate(&self) -> Result<()> {
        self.dialect()?;
        if let Some(filename) = &self.filename {
            validate_path("filename", filename)?;
        }
        if let Some(destination) = &self.destination_path {
            validate_path("destination_path", destination)?;
        }
        Ok(())
    }
}

/// 合併命令列與設定檔後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSettings {
    pub output_file: Option<PathBuf>,
    pub destination_path: PathBuf,
    pub dialect: CsvDialect,
}

impl TargetSettings {
    /// 命令列的 `--output` 優先於設定檔的 `filename`
    pub fn resolve(config: &TargetConfig, output_override: Option<&str>) -> Result<Self> {
        config.validate()?;
        if let Some(output) = output_override {
            validate_path("output", output)?;
        }

        let output_file = output_override
            .or(config.filename.as_deref())
            .map(PathBuf::from);
        let destination_path = config
            .destination_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            output_file,
            destination_path,
            dialect: config.dialect()?,
        })
    }

    pub fn sink(&self) -> CsvFileSink {
        let sink = CsvFileSink::new(self.destination_path.clone(), self.dialect);
        match &self.output_file {
            Some(path) => sink.with_output_file(path.clone()),
            None => sink,
        }
    }
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            output_file: None,
            destination_path: PathBuf::from("."),
            dialect: CsvDialect::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_singer_json_config() {
        let config = TargetConfig::from_json_str(
            r#"{"delimiter": "\t", "quotechar": "'", "disable_collection": true}"#,
        )
        .unwrap();

        assert_eq!(config.delimiter.as_deref(), Some("\t"));
        assert_eq!(
            config.dialect().unwrap(),
            CsvDialect {
                delimiter: b'\t',
                quote: b'\''
            }
        );
    }

    #[test]
    fn test_defaults() {
        let config = TargetConfig::from_json_str("{}").unwrap();
        let settings = TargetSettings::resolve(&config, None).unwrap();
        assert_eq!(settings, TargetSettings::default());
    }

    #[test]
    fn test_output_override_beats_filename() {
        let config = TargetConfig {
            filename: Some("from_config.csv".to_string()),
            ..Default::default()
        };

        let settings = TargetSettings::resolve(&config, Some("from_cli.csv")).unwrap();
        assert_eq!(settings.output_file, Some(PathBuf::from("from_cli.csv")));

        let settings = TargetSettings::resolve(&config, None).unwrap();
        assert_eq!(settings.output_file, Some(PathBuf::from("from_config.csv")));
        assert_eq!(settings.sink().resolve_path("any"), PathBuf::from("from_config.csv"));
    }

    #[test]
    fn test_invalid_dialect_is_rejected() {
        let config = TargetConfig {
            delimiter: Some("||".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TargetConfig {
            delimiter: Some("'".to_string()),
            quotechar: Some("'".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TargetSettings::resolve(&config, None),
            Err(TargetError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TARGET_CSV_TEST_DEST", "/tmp/exports");

        let config =
            TargetConfig::from_toml_str("destination_path = \"${TARGET_CSV_TEST_DEST}\"\n").unwrap();
        assert_eq!(config.destination_path.as_deref(), Some("/tmp/exports"));

        std::env::remove_var("TARGET_CSV_TEST_DEST");
    }

    #[test]
    fn test_config_from_toml_file() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        temp_file
            .write_all(b"delimiter = \";\"\nfilename = \"out.csv\"\n")
            .unwrap();

        let config = TargetConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.dialect().unwrap().delimiter, b';');
        assert_eq!(config.filename.as_deref(), Some("out.csv"));
    }

    #[test]
    fn test_config_from_json_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(br#"{"quotechar": "|"}"#).unwrap();

        let config = TargetConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.dialect().unwrap().quote, b'|');
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            TargetConfig::from_json_str("{"),
            Err(TargetError::ConfigValidationError { .. })
        ));
    }
}
