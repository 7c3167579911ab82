use crate::utils::error::{TargetError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TargetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TargetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// CSV 的分隔符號與引號字元必須是單一 ASCII 字元，且不能是換行
pub fn validate_csv_char(field_name: &str, value: &str) -> Result<u8> {
    let mut chars = value.chars();
    let ch = match (chars.next(), chars.next()) {
        (Some(ch), None) => ch,
        _ => {
            return Err(TargetError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Value must be exactly one character".to_string(),
            })
        }
    };

    if !ch.is_ascii() {
        return Err(TargetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Only single-byte ASCII characters are supported; non-ASCII delimiters and quote characters such as '§' cannot be used".to_string(),
        });
    }

    if ch == '\n' || ch == '\r' {
        return Err(TargetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.escape_default().to_string(),
            reason: "Line terminators cannot be used".to_string(),
        });
    }

    Ok(ch as u8)
}

pub fn validate_distinct(field_a: &str, a: u8, field_b: &str, b: u8) -> Result<()> {
    if a == b {
        return Err(TargetError::ConfigValidationError {
            field: format!("{}/{}", field_a, field_b),
            message: format!("'{}' cannot be used for both", a as char),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("filename", "out.csv").is_ok());
        assert!(validate_path("filename", "").is_err());
        assert!(validate_path("filename", "bad\0name").is_err());
    }

    #[test]
    fn test_validate_csv_char() {
        assert_eq!(validate_csv_char("delimiter", ",").unwrap(), b',');
        assert_eq!(validate_csv_char("delimiter", "\t").unwrap(), b'\t');
        assert!(validate_csv_char("delimiter", "").is_err());
        assert!(validate_csv_char("delimiter", ";;").is_err());
        assert!(validate_csv_char("delimiter", "\n").is_err());
        let err = validate_csv_char("delimiter", "§").unwrap_err();
        assert!(err.to_string().contains("single-byte ASCII"));
        assert!(validate_csv_char("quotechar", "“").is_err());
    }

    #[test]
    fn test_validate_distinct() {
        assert!(validate_distinct("delimiter", b',', "quotechar", b'"').is_ok());
        assert!(validate_distinct("delimiter", b',', "quotechar", b',').is_err());
    }
}
