use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// A recorder that aggregates stored records and prints them with [`log`].
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        let mut items = record
            .iter()
            .map(|(k, v)| format!("{} = {}", k, fmt_value(v)))
            .collect::<Vec<_>>();
        items.sort();
        info!("{}", items.join(", "));
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let mut record = self.storage.aggregate();
        record.insert("step", RecordValue::Scalar(step as f32));
        self.write(record);
    }
}

fn fmt_value(v: &RecordValue) -> String {
    match v {
        RecordValue::Scalar(v) => format!("{:.4}", v),
        RecordValue::Array1(v) => format!("{:?}", v),
        RecordValue::String(s) => s.clone(),
    }
}
