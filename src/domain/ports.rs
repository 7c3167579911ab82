use crate::domain::model::FlatRecord;
use crate::utils::error::Result;
use serde_json::Value;

/// 對單一 stream 已編譯好的驗證器
pub trait RecordValidator {
    fn validate(&self, record: &Value) -> Result<()>;
}

/// 由 SCHEMA 訊息建立驗證器
pub trait ValidatorFactory {
    type Validator: RecordValidator;

    fn compile(&self, stream: &str, schema: &Value) -> Result<Self::Validator>;
}

/// 記錄的輸出端，每次呼叫寫入一列
pub trait RecordSink {
    fn write_record(&mut self, stream: &str, record: &FlatRecord) -> Result<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, stream: &str, record: &FlatRecord) -> Result<()> {
        (**self).write_record(stream, record)
    }
}
