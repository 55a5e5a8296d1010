//! HAR 1.2 structures.
//!
//! Every struct keeps the keys it does not declare in `extra`, so vendor
//! extensions (`_workerStart`, `comment`, ...) survive a decode/encode cycle.
//! Optional fields encode as `null` when absent.

use serde::{Deserialize, Serialize};

use crate::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
    #[serde(flatten)]
    pub extra: Record,
}

/// Query-string parameters share the header layout.
pub type QueryParam = Header;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub expires: Option<String>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    pub same_site: Option<String>,
    #[serde(flatten)]
    pub extra: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    pub url: String,
    pub http_version: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub query_string: Vec<QueryParam>,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    pub headers_size: Option<i64>,
    pub body_size: Option<i64>,
    pub post_data: Option<Record>,
    #[serde(flatten)]
    pub extra: Record,
}

impl Request {
    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub size: i64,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    pub text: Option<String>,
    pub encoding: Option<String>,
    #[serde(flatten)]
    pub extra: Record,
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: i64,
    #[serde(default)]
    pub status_text: String,
    pub http_version: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    pub content: Content,
    #[serde(default, rename = "redirectURL")]
    pub redirect_url: String,
    pub headers_size: Option<i64>,
    pub body_size: Option<i64>,
    #[serde(flatten)]
    pub extra: Record,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Phase timings in milliseconds; `-1` marks a phase that does not apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    pub blocked: Option<f64>,
    pub dns: Option<f64>,
    pub connect: Option<f64>,
    pub send: f64,
    pub wait: f64,
    pub receive: f64,
    pub ssl: Option<f64>,
    #[serde(flatten)]
    pub extra: Record,
}

/// One request/response exchange.
///
/// The request, response and timings types are parameters so that
/// extended entry models (see [`crate::model::DevToolsEntry`]) reuse this
/// layout with richer sub-structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry<Rq = Request, Rs = Response, Tm = Timings> {
    pub started_date_time: String,
    pub time: f64,
    pub request: Rq,
    pub response: Rs,
    pub cache: Record,
    pub timings: Tm,
    #[serde(rename = "serverIPAddress")]
    pub server_ip_address: Option<String>,
    pub connection: Option<String>,
    pub pageref: Option<String>,
    #[serde(flatten)]
    pub extra: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub extra: Record,
}

/// The optional `browser` block has the same layout as `creator`.
pub type Browser = Creator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTimings {
    pub on_content_load: Option<f64>,
    pub on_load: Option<f64>,
    #[serde(flatten)]
    pub extra: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub started_date_time: String,
    pub id: String,
    pub title: String,
    pub page_timings: PageTimings,
    #[serde(flatten)]
    pub extra: Record,
}

impl AsRef<Request> for Request {
    fn as_ref(&self) -> &Request {
        self
    }
}

impl AsRef<Response> for Response {
    fn as_ref(&self) -> &Response {
        self
    }
}

impl AsRef<Timings> for Timings {
    fn as_ref(&self) -> &Timings {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_value() -> serde_json::Value {
        json!({
            "method": "GET",
            "url": "https://example.com/a",
            "headers": [
                {"name": "Accept", "value": "*/*"},
                {"name": "X-Trace", "value": "abc"}
            ],
            "headersSize": -1,
            "bodySize": 0,
            "_vendor": {"k": 1}
        })
    }

    #[test]
    fn request_defaults_and_extras() {
        let req: Request = serde_json::from_value(request_value()).unwrap();
        assert_eq!(req.method, "GET");
        assert!(req.cookies.is_empty());
        assert!(req.query_string.is_empty());
        assert_eq!(req.headers_size, Some(-1));
        assert_eq!(req.extra.get("_vendor"), Some(&json!({"k": 1})));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req: Request = serde_json::from_value(request_value()).unwrap();
        assert_eq!(req.header("accept"), Some("*/*"));
        assert_eq!(req.header("x-trace"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn response_defaults() {
        let resp: Response = serde_json::from_value(json!({
            "status": 204,
            "content": {"size": 0}
        }))
        .unwrap();
        assert_eq!(resp.status_text, "");
        assert_eq!(resp.redirect_url, "");
        assert_eq!(resp.content.mime_type, "application/octet-stream");
    }

    #[test]
    fn wire_names_survive_encoding() {
        let resp: Response = serde_json::from_value(json!({
            "status": 301,
            "statusText": "Moved",
            "redirectURL": "https://example.com/b",
            "content": {"size": 0, "mimeType": "text/html"}
        }))
        .unwrap();
        let back = serde_json::to_value(&resp).unwrap();
        assert_eq!(back["redirectURL"], "https://example.com/b");
        assert_eq!(back["statusText"], "Moved");
        assert_eq!(back["content"]["mimeType"], "text/html");
        assert!(back.get("redirect_url").is_none());
    }

    #[test]
    fn timings_accept_integer_values() {
        let t: Timings = serde_json::from_value(json!({
            "send": 1, "wait": 2, "receive": 3, "dns": -1, "_workerStart": 4
        }))
        .unwrap();
        assert_eq!(t.send, 1.0);
        assert_eq!(t.dns, Some(-1.0));
        assert_eq!(t.blocked, None);
        assert_eq!(t.extra.get("_workerStart"), Some(&json!(4)));
    }
}
