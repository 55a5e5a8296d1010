//! HAR (HTTP Archive) loading: read a document, check the `log` envelope,
//! and resolve every entry through a [`SchemaRegistry`](crate::SchemaRegistry).

mod error;
mod load;

pub use error::LoadError;
pub use load::{parse_path, parse_reader, parse_slice, validate_value};

use crate::model::{Browser, Creator, Page};
use crate::schema::ResolvedRecord;
use crate::Record;

/// A loaded HAR document with validated entries in file order.
#[derive(Debug)]
pub struct HarLog {
    pub version: String,
    pub creator: Creator,
    pub browser: Option<Browser>,
    pub pages: Vec<Page>,
    pub entries: Vec<ResolvedRecord>,
    /// Unrecognised keys of `log`, kept verbatim.
    pub extra: Record,
}

impl HarLog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dump every entry back to a plain record under its wire names.
    pub fn entry_records(&self) -> Result<Vec<Record>, serde_json::Error> {
        self.entries.iter().map(ResolvedRecord::to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DevToolsEntry;
    use crate::schema::{Problem, SchemaError, SchemaRegistry, CHROME_DEVTOOLS, HAR_1_2};
    use serde_json::{json, Value};
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn entry(url: &str) -> Value {
        json!({
            "startedDateTime": "2025-06-05T16:29:35.173Z",
            "time": 12.5,
            "request": {"method": "GET", "url": url, "httpVersion": "HTTP/1.1", "headers": [],
                        "queryString": [], "cookies": [], "headersSize": -1, "bodySize": 0},
            "response": {"status": 200, "statusText": "OK", "httpVersion": "HTTP/1.1", "headers": [],
                         "cookies": [], "content": {"size": 10, "mimeType": "text/plain"},
                         "redirectURL": "", "headersSize": -1, "bodySize": 10},
            "cache": {},
            "timings": {"send": 1, "wait": 10, "receive": 1.5}
        })
    }

    fn document(entries: Vec<Value>) -> Value {
        json!({
            "log": {
                "version": "1.2",
                "creator": {"name": "WebInspector", "version": "537.36"},
                "pages": [{"startedDateTime": "2025-06-05T16:29:35.000Z", "id": "page_1",
                           "title": "https://test.test/", "pageTimings": {"onLoad": 120.0}}],
                "entries": entries,
                "comment": "exported"
            }
        })
    }

    #[test]
    fn parse_path_reads_and_resolves_entries() {
        let mut devtools = entry("https://test.test/app.js");
        devtools["_resourceType"] = json!("script");
        devtools["_connectionId"] = json!("4211");
        let doc = document(vec![entry("https://test.test/"), devtools]);

        let mut f = NamedTempFile::new().unwrap();
        f.write_all(doc.to_string().as_bytes()).unwrap();
        f.flush().unwrap();

        let log = parse_path(f.path(), &SchemaRegistry::standard()).unwrap();
        assert_eq!(log.version, "1.2");
        assert_eq!(log.creator.name, "WebInspector");
        assert_eq!(log.pages[0].id, "page_1");
        assert_eq!(log.extra["comment"], "exported");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries[0].schema().name(), HAR_1_2);
        assert_eq!(log.entries[1].schema().name(), CHROME_DEVTOOLS);
        let dt = log.entries[1].downcast_ref::<DevToolsEntry>().unwrap();
        assert_eq!(dt.resource_type.as_deref(), Some("script"));
    }

    #[test]
    fn empty_entries_is_a_valid_log() {
        let log = parse_slice(document(vec![]).to_string().as_bytes(), &SchemaRegistry::standard()).unwrap();
        assert!(log.is_empty());
        assert!(log.entry_records().unwrap().is_empty());
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let err = parse_path(Path::new("/nonexistent/capture.har"), &SchemaRegistry::standard()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "{err}");
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = parse_reader(&b"{\"log\": "[..], &SchemaRegistry::standard()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)), "{err}");
    }

    #[test]
    fn envelope_problems_name_the_path() {
        let registry = SchemaRegistry::standard();

        let err = validate_value(json!([]), &registry).unwrap_err();
        assert!(matches!(&err, LoadError::Envelope(e) if e.has_path("")), "{err}");

        let err = validate_value(json!({"version": "1.2"}), &registry).unwrap_err();
        match err {
            LoadError::Envelope(e) => assert_eq!(e.issues[0].problem, Problem::Missing),
            other => panic!("unexpected {other}"),
        }

        let err = validate_value(json!({"log": {"creator": {"name": "x", "version": "1"}, "entries": null}}), &registry)
            .unwrap_err();
        match err {
            LoadError::Envelope(e) => {
                assert!(e.has_path("log.version"), "{e}");
                assert!(e.has_path("log.entries"), "{e}");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn bad_entry_carries_its_index() {
        let mut broken = entry("https://test.test/b");
        broken.as_object_mut().unwrap().remove("timings");
        let doc = document(vec![entry("https://test.test/a"), broken]);

        let err = validate_value(doc, &SchemaRegistry::standard()).unwrap_err();
        assert_eq!(err.entry_index(), Some(1));
        match err {
            LoadError::Entry {
                source: SchemaError::Validation(e),
                ..
            } => assert!(e.has_path("timings")),
            other => panic!("unexpected {other}"),
        }

        let err = validate_value(document(vec![json!("nope")]), &SchemaRegistry::standard()).unwrap_err();
        assert_eq!(err.entry_index(), Some(0));
    }

    #[test]
    fn entry_records_use_wire_names() {
        let log = validate_value(document(vec![entry("https://test.test/")]), &SchemaRegistry::standard()).unwrap();
        let records = log.entry_records().unwrap();
        assert_eq!(records[0]["request"]["url"], "https://test.test/");
        assert_eq!(records[0]["response"]["redirectURL"], "");
        assert!(records[0].contains_key("startedDateTime"));
    }
}
