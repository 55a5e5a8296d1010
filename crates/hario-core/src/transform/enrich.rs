use serde_json::Value;
use url::Url;

use super::error::TransformError;
use super::{Transformer, TransformerSpec};
use crate::Record;

/// Stores the network location of `request.url` under `field`: the
/// authority exactly as written, userinfo and port included.
/// Records without a parseable absolute URL pass through unchanged.
#[derive(Debug, Clone)]
pub struct Domain {
    field: String,
}

pub fn domain(field: impl Into<String>) -> Domain {
    Domain {
        field: field.into(),
    }
}

impl Transformer for Domain {
    fn name(&self) -> &str {
        "domain"
    }

    fn transform(&self, mut record: Record) -> Result<Record, TransformError> {
        let host = record
            .get("request")
            .and_then(|r| r.get("url"))
            .and_then(Value::as_str)
            .and_then(netloc);
        if let Some(host) = host {
            record.insert(self.field.clone(), Value::String(host));
        }
        Ok(record)
    }

    fn spec(&self) -> Option<TransformerSpec> {
        Some(TransformerSpec::Domain {
            field: self.field.clone(),
        })
    }
}

fn netloc(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    url.host_str()?;
    let (_, rest) = raw.trim_start().split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(rest[..end].to_string())
}
