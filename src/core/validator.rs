use crate::domain::ports::{RecordValidator, ValidatorFactory};
use crate::utils::error::{Result, TargetError};
use serde_json::Value;

/// 以 JSON Schema Draft 4 編譯 stream schema
#[derive(Debug, Clone, Copy, Default)]
pub struct Draft4ValidatorFactory;

pub struct Draft4Validator {
    stream: String,
    inner: jsonschema::Validator,
}

impl ValidatorFactory for Draft4ValidatorFactory {
    type Validator = Draft4Validator;

    fn compile(&self, stream: &str, schema: &Value) -> Result<Draft4Validator> {
        let inner = jsonschema::draft4::new(schema).map_err(|e| TargetError::InvalidSchema {
            stream: stream.to_string(),
            message: e.to_string(),
        })?;

        Ok(Draft4Validator {
            stream: stream.to_string(),
            inner,
        })
    }
}

impl RecordValidator for Draft4Validator {
    fn validate(&self, record: &Value) -> Result<()> {
        self.inner
            .validate(record)
            .map_err(|error| TargetError::ValidationError {
                stream: self.stream.clone(),
                message: format_validation_error(&error),
            })
    }
}

fn format_validation_error(error: &jsonschema::ValidationError) -> String {
    let path = error.instance_path().to_string();
    let path = if path.is_empty() || path == "/" {
        "root".to_string()
    } else {
        path
    };
    format!("{} (at {})", error, path)
}

/// 不做任何檢查；上游已驗證過資料時使用
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveValidatorFactory;

#[derive(Debug, Clone, Copy)]
pub struct AcceptAll;

impl ValidatorFactory for PermissiveValidatorFactory {
    type Validator = AcceptAll;

    fn compile(&self, _stream: &str, _schema: &Value) -> Result<AcceptAll> {
        Ok(AcceptAll)
    }
}

impl RecordValidator for AcceptAll {
    fn validate(&self, _record: &Value) -> Result<()> {
        Ok(())
    }
}
