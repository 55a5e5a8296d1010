//! Built-in HAR 1.2 and Chrome DevTools schemas.

use serde_json::Value;

use super::definition::Schema;
use super::shape::{FieldKind, FieldSpec, Presence, Shape};
use crate::model::{DevToolsEntry, Entry};
use crate::RawRecord;

pub const HAR_1_2: &str = "har-1.2";
pub const CHROME_DEVTOOLS: &str = "chrome-devtools";

/// Top-level keys only Chrome DevTools exports put on an entry.
const DEVTOOLS_MARKERS: [&str; 4] = ["_connectionId", "_initiator", "_resourceType", "_priority"];

pub fn har_1_2() -> Schema {
    Schema::of::<Entry>(HAR_1_2, "1.2", entry_shape())
}

pub fn devtools() -> Schema {
    Schema::of::<DevToolsEntry>(CHROME_DEVTOOLS, "1.2", devtools_entry_shape())
        .with_prepare(prepare_devtools)
}

pub fn is_devtools_entry(raw: &RawRecord) -> bool {
    DEVTOOLS_MARKERS.iter().any(|key| raw.contains_key(*key))
}

/// DevTools may ship `request`/`response` as JSON text and uses `""` for
/// unset values of any optional top-level field.
fn prepare_devtools(shape: &Shape, raw: &mut RawRecord) {
    for key in ["request", "response"] {
        let decoded = match raw.get(key) {
            Some(Value::String(text)) => serde_json::from_str::<Value>(text).ok(),
            _ => None,
        };
        if let Some(value) = decoded {
            raw.insert(key.to_string(), value);
        }
    }
    for spec in shape.fields() {
        if spec.presence != Presence::Optional {
            continue;
        }
        if let Some(value) = raw.get_mut(&spec.name) {
            if value.as_str() == Some("") {
                *value = Value::Null;
            }
        }
    }
}

fn string(name: &str) -> FieldSpec {
    FieldSpec::required(name, FieldKind::String)
}

fn opt(name: &str, kind: FieldKind) -> FieldSpec {
    FieldSpec::optional(name, kind)
}

fn name_value_shape(name: &str) -> Shape {
    Shape::new(name, [string("name"), string("value")])
}

fn cookie_shape() -> Shape {
    Shape::new(
        "cookie",
        [
            string("name"),
            string("value"),
            opt("path", FieldKind::String),
            opt("domain", FieldKind::String),
            opt("expires", FieldKind::String),
            opt("httpOnly", FieldKind::Boolean),
            opt("secure", FieldKind::Boolean),
            opt("sameSite", FieldKind::String),
        ],
    )
}

fn list_of(shape: Shape) -> FieldKind {
    FieldKind::list_of(FieldKind::nested(shape))
}

pub fn request_shape() -> Shape {
    Shape::new(
        "request",
        [
            string("method"),
            string("url"),
            opt("httpVersion", FieldKind::String),
            FieldSpec::defaulted("headers", list_of(name_value_shape("header"))),
            FieldSpec::defaulted("queryString", list_of(name_value_shape("query-param"))),
            FieldSpec::defaulted("cookies", list_of(cookie_shape())),
            opt("headersSize", FieldKind::Integer),
            opt("bodySize", FieldKind::Integer),
            opt("postData", FieldKind::Mapping),
        ],
    )
}

fn content_shape() -> Shape {
    Shape::new(
        "content",
        [
            FieldSpec::required("size", FieldKind::Integer),
            FieldSpec::defaulted("mimeType", FieldKind::String),
            opt("text", FieldKind::String),
            opt("encoding", FieldKind::String),
        ],
    )
}

pub fn response_shape() -> Shape {
    Shape::new(
        "response",
        [
            FieldSpec::required("status", FieldKind::Integer),
            FieldSpec::defaulted("statusText", FieldKind::String),
            opt("httpVersion", FieldKind::String),
            FieldSpec::defaulted("headers", list_of(name_value_shape("header"))),
            FieldSpec::defaulted("cookies", list_of(cookie_shape())),
            FieldSpec::required("content", FieldKind::nested(content_shape())),
            FieldSpec::defaulted("redirectURL", FieldKind::String),
            opt("headersSize", FieldKind::Integer),
            opt("bodySize", FieldKind::Integer),
        ],
    )
}

pub fn timings_shape() -> Shape {
    Shape::new(
        "timings",
        [
            opt("blocked", FieldKind::Number),
            opt("dns", FieldKind::Number),
            opt("connect", FieldKind::Number),
            FieldSpec::required("send", FieldKind::Number),
            FieldSpec::required("wait", FieldKind::Number),
            FieldSpec::required("receive", FieldKind::Number),
            opt("ssl", FieldKind::Number),
        ],
    )
}

pub fn entry_shape() -> Shape {
    Shape::new(
        "entry",
        [
            string("startedDateTime"),
            FieldSpec::required("time", FieldKind::Number),
            FieldSpec::required("request", FieldKind::nested(request_shape())),
            FieldSpec::required("response", FieldKind::nested(response_shape())),
            FieldSpec::required("cache", FieldKind::Mapping),
            FieldSpec::required("timings", FieldKind::nested(timings_shape())),
            opt("serverIPAddress", FieldKind::String),
            opt("connection", FieldKind::String),
            opt("pageref", FieldKind::String),
        ],
    )
}

fn call_frame_shape() -> Shape {
    Shape::new(
        "call-frame",
        [
            string("functionName"),
            string("scriptId"),
            string("url"),
            FieldSpec::required("lineNumber", FieldKind::Integer),
            FieldSpec::required("columnNumber", FieldKind::Integer),
        ],
    )
}

fn stack_shape() -> Shape {
    Shape::new(
        "stack",
        [
            FieldSpec::required("callFrames", list_of(call_frame_shape())),
            opt("parent", FieldKind::Recursive),
        ],
    )
}

fn initiator_shape() -> Shape {
    Shape::new(
        "initiator",
        [
            opt("type", FieldKind::String),
            opt("url", FieldKind::String),
            opt("lineNumber", FieldKind::Integer),
            opt("stack", FieldKind::nested(stack_shape())),
        ],
    )
}

pub fn devtools_entry_shape() -> Shape {
    let request = request_shape().refine(
        "devtools-request",
        [opt("_requestId", FieldKind::String), opt("_priority", FieldKind::String)],
    );
    let response = response_shape().refine(
        "devtools-response",
        [
            opt("_transferSize", FieldKind::Integer),
            opt("_error", FieldKind::String),
            opt("_fetchedViaServiceWorker", FieldKind::Boolean),
            opt("_headersText", FieldKind::String),
            opt("_requestId", FieldKind::String),
        ],
    );
    let timings = timings_shape().refine(
        "devtools-timings",
        [
            opt("_blocked_queueing", FieldKind::Number),
            opt("_push_start", FieldKind::Number),
            opt("_push_end", FieldKind::Number),
        ],
    );
    entry_shape().refine(
        "devtools-entry",
        [
            FieldSpec::required("request", FieldKind::nested(request)),
            FieldSpec::required("response", FieldKind::nested(response)),
            FieldSpec::required("timings", FieldKind::nested(timings)),
            opt("_connectionId", FieldKind::String),
            opt("_resourceType", FieldKind::String),
            opt("_initiator", FieldKind::nested(initiator_shape())),
            opt("_priority", FieldKind::String),
        ],
    )
}
