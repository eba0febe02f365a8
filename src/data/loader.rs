use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::data::record::PushRecord;
use crate::error::StoreError;

/// Accepted file layouts: a bare array, or an object wrapping the array
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    List(Vec<PushRecord>),
    Wrapped { pushes: Vec<PushRecord> },
}

impl RecordFile {
    fn into_records(self) -> Vec<PushRecord> {
        match self {
            RecordFile::List(records) => records,
            RecordFile::Wrapped { pushes } => pushes,
        }
    }
}

pub fn load_records_from_reader(reader: impl Read) -> Result<Vec<PushRecord>, StoreError> {
    let file: RecordFile = serde_json::from_reader(reader)?;
    Ok(file.into_records())
}

/// Load decoded push records from a JSON file
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<PushRecord>, StoreError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = load_records_from_reader(BufReader::new(file))?;
    tracing::info!(path = %path.display(), count = records.len(), "Loaded push records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_layouts() {
        let bare = r#"[{"id":"a","push_def":"web","states":[]}]"#;
        let wrapped = r#"{"pushes":[{"id":"a","states":[{"stage":"s","state":2,"start_time_nsec":1}]}]}"#;

        let a = load_records_from_reader(bare.as_bytes()).unwrap();
        let b = load_records_from_reader(wrapped.as_bytes()).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b[0].states.len(), 1);
        assert_eq!(b[0].push_def, "");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            load_records_from_reader("{not json".as_bytes()),
            Err(StoreError::Json(_))
        ));
    }
}
