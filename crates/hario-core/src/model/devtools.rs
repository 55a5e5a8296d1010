//! Chrome DevTools extensions to the HAR entry.
//!
//! DevTools exports add underscore-prefixed keys to entries, requests,
//! responses and timings. Each extended struct wraps its HAR 1.2 base and
//! adds only the extension fields; the wire names are preserved on encode.

use serde::{Deserialize, Serialize};

use super::har::{Entry, Request, Response, Timings};
use crate::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevToolsCallFrame {
    pub function_name: String,
    pub script_id: String,
    pub url: String,
    pub line_number: i64,
    pub column_number: i64,
    #[serde(flatten)]
    pub extra: Record,
}

/// A JavaScript stack; async stacks chain through `parent` to any depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevToolsStack {
    pub call_frames: Vec<DevToolsCallFrame>,
    pub parent: Option<Box<DevToolsStack>>,
    #[serde(flatten)]
    pub extra: Record,
}

impl DevToolsStack {
    /// Number of stacks in the `parent` chain, this one included.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent.as_deref();
        while let Some(stack) = current {
            depth += 1;
            current = stack.parent.as_deref();
        }
        depth
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevToolsInitiator {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub line_number: Option<i64>,
    pub stack: Option<DevToolsStack>,
    #[serde(flatten)]
    pub extra: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevToolsRequest {
    #[serde(flatten)]
    pub base: Request,
    #[serde(rename = "_requestId")]
    pub request_id: Option<String>,
    #[serde(rename = "_priority")]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevToolsResponse {
    #[serde(flatten)]
    pub base: Response,
    #[serde(rename = "_transferSize")]
    pub transfer_size: Option<i64>,
    #[serde(rename = "_error")]
    pub error: Option<String>,
    #[serde(rename = "_fetchedViaServiceWorker")]
    pub fetched_via_service_worker: Option<bool>,
    #[serde(rename = "_headersText")]
    pub headers_text: Option<String>,
    #[serde(rename = "_requestId")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevToolsTimings {
    #[serde(flatten)]
    pub base: Timings,
    #[serde(rename = "_blocked_queueing")]
    pub blocked_queueing: Option<f64>,
    #[serde(rename = "_push_start")]
    pub push_start: Option<f64>,
    #[serde(rename = "_push_end")]
    pub push_end: Option<f64>,
}

/// A HAR entry as exported by Chrome DevTools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevToolsEntry {
    #[serde(flatten)]
    pub base: Entry<DevToolsRequest, DevToolsResponse, DevToolsTimings>,
    #[serde(rename = "_connectionId")]
    pub connection_id: Option<String>,
    #[serde(rename = "_resourceType")]
    pub resource_type: Option<String>,
    #[serde(rename = "_initiator")]
    pub initiator: Option<DevToolsInitiator>,
    #[serde(rename = "_priority")]
    pub priority: Option<String>,
}

impl AsRef<Request> for DevToolsRequest {
    fn as_ref(&self) -> &Request {
        &self.base
    }
}

impl AsRef<Response> for DevToolsResponse {
    fn as_ref(&self) -> &Response {
        &self.base
    }
}

impl AsRef<Timings> for DevToolsTimings {
    fn as_ref(&self) -> &Timings {
        &self.base
    }
}
