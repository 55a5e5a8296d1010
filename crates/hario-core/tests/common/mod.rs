//! Shared HAR samples for integration tests: one cleaned HAR 1.2 capture and
//! one Chrome DevTools export of the same request.

#![allow(dead_code)]

use hario_core::Record;
use serde_json::{json, Value};

pub const ASSET_URL: &str = "https://test.test/assets/css/f2aaccf1.css";

fn request() -> Value {
    json!({
        "method": "GET",
        "url": ASSET_URL,
        "httpVersion": "http/2.0",
        "headers": [
            {"name": ":authority", "value": "test.test"},
            {"name": ":method", "value": "GET"},
            {"name": "accept", "value": "text/css,*/*;q=0.1"},
            {"name": "referer", "value": "https://test.test/?param1=19704cee&param2=false"}
        ],
        "queryString": [],
        "cookies": [],
        "headersSize": -1,
        "bodySize": 0
    })
}

fn response() -> Value {
    json!({
        "status": 200,
        "statusText": "",
        "httpVersion": "http/2.0",
        "headers": [
            {"name": "content-type", "value": "text/css"},
            {"name": "server", "value": "nginx"}
        ],
        "cookies": [],
        "content": {"size": 535852, "mimeType": "text/css"},
        "redirectURL": "",
        "headersSize": -1,
        "bodySize": -1
    })
}

pub fn cleaned_entry() -> Value {
    json!({
        "cache": {},
        "connection": "443",
        "request": request(),
        "response": response(),
        "serverIPAddress": "111.111.111.111",
        "startedDateTime": "2025-06-05T16:29:09.173Z",
        "time": 1142.6669999491423,
        "timings": {
            "blocked": 30.817999938607215,
            "dns": -1,
            "ssl": -1,
            "connect": -1,
            "send": 3.2020000000000017,
            "wait": 1061.3869999893382,
            "receive": 47.2600000211969
        }
    })
}

pub fn devtools_entry() -> Value {
    let mut entry = cleaned_entry();
    let map = entry.as_object_mut().expect("entry is a mapping");
    map.insert("_connectionId".into(), json!("1270162"));
    map.insert(
        "_initiator".into(),
        json!({"type": "parser", "url": "https://test.test/?param1=19704cee&param2=false", "lineNumber": 11}),
    );
    map.insert("_priority".into(), json!("VeryHigh"));
    map.insert("_resourceType".into(), json!("stylesheet"));
    map.insert("pageref".into(), json!("page_1"));
    let response = map["response"].as_object_mut().expect("response is a mapping");
    response.insert("_transferSize".into(), json!(116558));
    response.insert("_error".into(), Value::Null);
    response.insert("_fetchedViaServiceWorker".into(), json!(false));
    let timings = map["timings"].as_object_mut().expect("timings is a mapping");
    timings.insert("_blocked_queueing".into(), json!(14.454999938607216));
    timings.insert("_workerStart".into(), json!(-12.923));
    entry
}

pub fn pages() -> Value {
    json!([
        {
            "startedDateTime": "2025-06-05T19:27:27.514Z",
            "id": "page_1",
            "title": "https://test.test/2",
            "pageTimings": {"onContentLoad": 501.66700000409037, "onLoad": 1302.6639999588951}
        }
    ])
}

pub fn har_document(entries: Vec<Value>) -> Value {
    json!({
        "log": {
            "version": "1.2",
            "creator": {"name": "WebInspector", "version": "537.36"},
            "pages": pages(),
            "entries": entries
        }
    })
}

pub fn cleaned_har() -> Value {
    har_document(vec![cleaned_entry()])
}

pub fn chrome_devtools_har() -> Value {
    har_document(vec![devtools_entry()])
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a mapping, got {other}"),
    }
}

/// `n` distinct cleaned entries, each tagged with its position under `seq`.
pub fn numbered_entries(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let mut entry = cleaned_entry();
            entry["request"]["url"] = json!(format!("{ASSET_URL}?v={i}"));
            entry["seq"] = json!(i);
            record(entry)
        })
        .collect()
}
