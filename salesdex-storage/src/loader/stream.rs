//! Incremental decoding of a top-level JSON array.
//!
//! The decoder pulls bytes from the reader as it goes and hands each element
//! to the caller as soon as it is materialized. Only one record is alive at a
//! time on top of whatever the caller keeps.

use std::fmt;
use std::io::Read;
use std::marker::PhantomData;

use serde::de::{DeserializeOwned, Error as _, SeqAccess, Visitor};
use serde::Deserializer as _;
use serde_json::error::Category;

use salesdex_core::{DatasetKind, LoadError, RecordPosition, SalesdexError, SalesdexResult};

struct StreamState<F> {
    on_record: F,
    index: usize,
    failure: Option<SalesdexError>,
}

struct RecordSeq<'a, T, F> {
    state: &'a mut StreamState<F>,
    record: PhantomData<fn() -> T>,
}

impl<'de, T, F> Visitor<'de> for RecordSeq<'_, T, F>
where
    T: DeserializeOwned,
    F: FnMut(RecordPosition, T) -> SalesdexResult<()>,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON array of records")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(record) = seq.next_element::<T>()? {
            let position = RecordPosition::at_index(self.state.index);
            if let Err(err) = (self.state.on_record)(position, record) {
                self.state.failure = Some(err);
                return Err(A::Error::custom("record rejected"));
            }
            self.state.index += 1;
        }
        Ok(())
    }
}

/// Decode `reader` as a JSON array, calling `on_record` once per element.
///
/// Returns the number of records visited. A decode failure is reported as
/// `DatasetMalformed` at the index of the record being decoded, with the
/// decoder's line and column. An error returned by `on_record` stops the
/// stream and is returned unchanged.
pub(crate) fn for_each_record<R, T, F>(
    reader: R,
    dataset: DatasetKind,
    on_record: F,
) -> SalesdexResult<usize>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(RecordPosition, T) -> SalesdexResult<()>,
{
    let mut de = serde_json::Deserializer::from_reader(reader);
    let mut state = StreamState {
        on_record,
        index: 0,
        failure: None,
    };

    let outcome = (&mut de)
        .deserialize_seq(RecordSeq::<T, F> {
            state: &mut state,
            record: PhantomData,
        })
        .and_then(|()| de.end());

    match outcome {
        Ok(()) => Ok(state.index),
        Err(err) => match state.failure.take() {
            Some(failure) => Err(failure),
            None => Err(decode_error(dataset, state.index, &err)),
        },
    }
}

fn decode_error(dataset: DatasetKind, index: usize, err: &serde_json::Error) -> SalesdexError {
    if err.classify() == Category::Io {
        return LoadError::SourceUnavailable {
            dataset,
            location: "input stream".to_string(),
            reason: err.to_string(),
        }
        .into();
    }
    let position = if err.line() > 0 {
        RecordPosition::at_index(index).with_location(err.line(), err.column())
    } else {
        RecordPosition::at_index(index)
    };
    LoadError::DatasetMalformed {
        dataset,
        position,
        reason: strip_location(err),
    }
    .into()
}

/// serde_json appends " at line L column C" to its messages; the position
/// already carries that.
fn strip_location(err: &serde_json::Error) -> String {
    let message = err.to_string();
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    message
        .strip_suffix(&suffix)
        .map(str::to_string)
        .unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdex_core::QueryError;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Deserialize)]
    struct Row {
        id: i64,
    }

    fn collect(json: &str) -> SalesdexResult<Vec<i64>> {
        let mut ids = Vec::new();
        for_each_record(Cursor::new(json), DatasetKind::Products, |_, row: Row| {
            ids.push(row.id);
            Ok(())
        })?;
        Ok(ids)
    }

    fn malformed_position(err: SalesdexError) -> RecordPosition {
        match err {
            SalesdexError::Load(LoadError::DatasetMalformed { position, .. }) => position,
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_visits_every_record_in_order() {
        assert_eq!(collect(r#"[{"id": 1}, {"id": 2}, {"id": 3}]"#).unwrap(), vec![1, 2, 3]);
        assert_eq!(collect("[]").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_bad_record_reports_its_index_and_location() {
        let err = collect("[{\"id\": 1},\n {\"id\": \"two\"}]").unwrap_err();
        let position = malformed_position(err.clone());
        assert_eq!(position.index, 1);
        assert_eq!(position.line, Some(2));
        assert!(err.to_string().contains("invalid type"));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let position = malformed_position(collect(r#"[{"id": 1}, {}]"#).unwrap_err());
        assert_eq!(position.index, 1);
    }

    #[test]
    fn test_non_array_and_trailing_garbage() {
        assert!(collect(r#"{"id": 1}"#).unwrap_err().is_malformed());
        assert!(collect(r#"[{"id": 1}] [ ]"#).unwrap_err().is_malformed());
        assert!(collect("").unwrap_err().is_malformed());
        assert!(collect(r#"[{"id": 1},"#).unwrap_err().is_malformed());
    }

    #[test]
    fn test_callback_error_stops_the_stream() {
        let mut seen = 0;
        let err = for_each_record(
            Cursor::new(r#"[{"id": 1}, {"id": 2}, {"id": 3}]"#),
            DatasetKind::Sales,
            |position, _: Row| {
                seen += 1;
                if position.index == 1 {
                    return Err(QueryError::EmptyResult {
                        operation: "stop_early".to_string(),
                        key: "1".to_string(),
                    }
                    .into());
                }
                Ok(())
            },
        )
        .unwrap_err();
        assert!(err.is_empty_result());
        assert_eq!(seen, 2);
    }
}
