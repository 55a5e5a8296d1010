//! Typed entry models and the capability trait shared by all of them.

mod devtools;
mod har;

pub use devtools::{
    DevToolsCallFrame, DevToolsEntry, DevToolsInitiator, DevToolsRequest, DevToolsResponse,
    DevToolsStack, DevToolsTimings,
};
pub use har::{
    Browser, Content, Cookie, Creator, Entry, Header, Page, PageTimings, QueryParam, Request,
    Response, Timings,
};

use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;

use crate::Record;

/// What every validated entry offers, whichever schema produced it.
///
/// Extended models expose their HAR 1.2 core through the accessors; the
/// concrete type is reachable with [`HarEntry::as_any`].
pub trait HarEntry: fmt::Debug + Send + Sync + 'static {
    fn started_date_time(&self) -> &str;
    fn time(&self) -> f64;
    fn request(&self) -> &Request;
    fn response(&self) -> &Response;
    fn timings(&self) -> &Timings;

    /// Encode back to a plain mapping using the wire field names.
    fn to_record(&self) -> Result<Record, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;
}

impl<Rq, Rs, Tm> HarEntry for Entry<Rq, Rs, Tm>
where
    Rq: AsRef<Request> + Serialize + fmt::Debug + Send + Sync + 'static,
    Rs: AsRef<Response> + Serialize + fmt::Debug + Send + Sync + 'static,
    Tm: AsRef<Timings> + Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn started_date_time(&self) -> &str {
        &self.started_date_time
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn request(&self) -> &Request {
        self.request.as_ref()
    }

    fn response(&self) -> &Response {
        self.response.as_ref()
    }

    fn timings(&self) -> &Timings {
        self.timings.as_ref()
    }

    fn to_record(&self) -> Result<Record, serde_json::Error> {
        encode_record(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl HarEntry for DevToolsEntry {
    fn started_date_time(&self) -> &str {
        &self.base.started_date_time
    }

    fn time(&self) -> f64 {
        self.base.time
    }

    fn request(&self) -> &Request {
        &self.base.request.base
    }

    fn response(&self) -> &Response {
        &self.base.response.base
    }

    fn timings(&self) -> &Timings {
        &self.base.timings.base
    }

    fn to_record(&self) -> Result<Record, serde_json::Error> {
        encode_record(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn encode_record<T: Serialize>(value: &T) -> Result<Record, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "entry encoded to {other} instead of a mapping"
        ))),
    }
}
