use crate::core::flatten::flatten;
use crate::domain::model::{Message, StreamSchema};
use crate::domain::ports::{RecordSink, RecordValidator, ValidatorFactory};
use crate::utils::error::{Result, TargetError};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;

/// 一次執行期間累積的狀態
#[derive(Debug)]
pub struct RunState<V> {
    pub schemas: HashMap<String, StreamSchema>,
    pub validators: HashMap<String, V>,
    /// 尚未被後續 RECORD 消耗的 STATE 值
    pub checkpoint: Option<Value>,
    pub summary: RunSummary,
}

impl<V> Default for RunState<V> {
    fn default() -> Self {
        Self {
            schemas: HashMap::new(),
            validators: HashMap::new(),
            checkpoint: None,
            summary: RunSummary::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub schema_messages: usize,
    pub record_messages: usize,
    pub state_messages: usize,
    pub records_per_stream: BTreeMap<String, usize>,
}

/// 逐行讀取 Singer 訊息並分派到 schema 註冊、記錄寫入、checkpoint 追蹤
pub struct LineDispatcher<F: ValidatorFactory, S: RecordSink> {
    factory: F,
    sink: S,
    state: RunState<F::Validator>,
}

impl<F: ValidatorFactory, S: RecordSink> LineDispatcher<F, S> {
    pub fn new(factory: F, sink: S) -> Self {
        Self {
            factory,
            sink,
            state: RunState::default(),
        }
    }

    pub fn state(&self) -> &RunState<F::Validator> {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (S, RunState<F::Validator>) {
        (self.sink, self.state)
    }

    /// 處理全部輸入，回傳最後的 checkpoint
    pub fn persist_lines<R: BufRead>(&mut self, input: R) -> Result<Option<Value>> {
        for line in input.lines() {
            let line = line?;
            self.process_line(&line)?;
        }
        Ok(self.state.checkpoint.clone())
    }

    pub fn process_line(&mut self, line: &str) -> Result<()> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(source) => {
                tracing::error!("Unable to parse:\n{}", line);
                return Err(TargetError::MalformedInput {
                    line: line.to_string(),
                    source,
                });
            }
        };

        let message = Message::from_value(value, line)?;
        self.dispatch(message)
    }

    pub fn dispatch(&mut self, message: Message) -> Result<()> {
        tracing::trace!("Dispatching {} message", message.kind());
        match message {
            Message::Schema {
                stream,
                schema,
                key_properties,
            } => self.register_schema(stream, schema, key_properties),
            Message::Record { stream, record } => self.persist_record(&stream, record),
            Message::State { value } => {
                let shown = value
                    .as_ref()
                    .map_or_else(|| "null".to_string(), |v| v.to_string());
                tracing::debug!("Setting state to {}", shown);
                self.state.summary.state_messages += 1;
                self.state.checkpoint = value;
                Ok(())
            }
        }
    }

    fn register_schema(
        &mut self,
        stream: String,
        schema: Value,
        key_properties: Vec<String>,
    ) -> Result<()> {
        let validator = self.factory.compile(&stream, &schema)?;

        if self.state.schemas.contains_key(&stream) {
            tracing::debug!("Replacing schema for stream '{}'", stream);
        } else {
            tracing::info!(
                "📋 Registered schema for stream '{}' (key properties: {:?})",
                stream,
                key_properties
            );
        }

        self.state.validators.insert(stream.clone(), validator);
        self.state.schemas.insert(
            stream,
            StreamSchema {
                schema,
                key_properties,
            },
        );
        self.state.summary.schema_messages += 1;
        Ok(())
    }

    fn persist_record(&mut self, stream: &str, record: Map<String, Value>) -> Result<()> {
        let validator = self.state.validators.get(stream).ok_or_else(|| {
            TargetError::protocol(format!(
                "A record for stream {} was encountered before a corresponding schema",
                stream
            ))
        })?;

        let flattened = flatten(&record);
        validator.validate(&Value::Object(record))?;
        self.sink.write_record(stream, &flattened)?;

        self.state.checkpoint = None;
        self.state.summary.record_messages += 1;
        *self
            .state
            .summary
            .records_per_stream
            .entry(stream.to_string())
            .or_insert(0) += 1;
        Ok(())
    }
}
