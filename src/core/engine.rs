use crate::core::dispatcher::{LineDispatcher, RunSummary};
use crate::domain::ports::{RecordSink, ValidatorFactory};
use crate::utils::error::Result;
use serde_json::Value;
use std::io::{BufRead, Write};

pub struct TargetEngine<F: ValidatorFactory, S: RecordSink> {
    dispatcher: LineDispatcher<F, S>,
}

impl<F: ValidatorFactory, S: RecordSink> TargetEngine<F, S> {
    pub fn new(factory: F, sink: S) -> Self {
        Self {
            dispatcher: LineDispatcher::new(factory, sink),
        }
    }

    /// 讀完所有輸入後，若 checkpoint 非 null 則輸出一行 JSON
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<Option<Value>> {
        tracing::info!("Starting target-csv");

        let checkpoint = self.dispatcher.persist_lines(input)?;
        log_summary(&self.dispatcher.state().summary);

        emit_state(checkpoint.as_ref(), output)?;
        tracing::debug!("Exiting normally");
        Ok(checkpoint)
    }

    pub fn summary(&self) -> &RunSummary {
        &self.dispatcher.state().summary
    }

    pub fn into_sink(self) -> S {
        self.dispatcher.into_parts().0
    }
}

pub fn emit_state<W: Write>(state: Option<&Value>, output: &mut W) -> Result<()> {
    if let Some(state) = state {
        let line = serde_json::to_string(state)?;
        tracing::debug!("Emitting state {}", line);
        writeln!(output, "{}", line)?;
        output.flush()?;
    }
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        "✅ Processed {} SCHEMA, {} RECORD, {} STATE messages",
        summary.schema_messages,
        summary.record_messages,
        summary.state_messages
    );
    for (stream, count) in &summary.records_per_stream {
        tracing::info!("📁 {}: {} records", stream, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_state_writes_single_line() {
        let mut out = Vec::new();
        emit_state(Some(&json!({"bookmarks": {"users": 10}})), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"bookmarks\":{\"users\":10}}\n"
        );
    }

    #[test]
    fn test_emit_nothing_for_null_state() {
        let mut out = Vec::new();
        emit_state(None, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
