//! Callback delivery after a request has been resolved and signed.
//!
//! The callback URL may embed `{{key}}` tokens which are substituted with
//! the values below. Background callbacks additionally deliver the whole
//! payload as a JSON object.

use serde_json::{Map, Value};

use crate::Error;

/// Keys a caller may not override with extra payload entries.
const RESERVED_KEYS: &[&str] = &["sig", "tx", "bn", "sa", "sp", "ex", "rbn", "rid", "req"];

/// The template values for one signed request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackPayload {
    /// Every signature on the transaction; the first one doubles as `sig`.
    pub signatures: Vec<String>,
    /// Transaction id, lowercase hex.
    pub tx: String,
    /// Block number the callback reporter saw the transaction in, if any.
    pub bn: String,
    /// Signer actor.
    pub sa: String,
    /// Signer permission.
    pub sp: String,
    /// Expiration of the resolved transaction.
    pub ex: String,
    /// Reference block number of the resolved transaction.
    pub rbn: String,
    /// Reference block prefix of the resolved transaction.
    pub rid: String,
    /// The originating request, re-encoded without the `//` prefix.
    pub req: String,
}

impl CallbackPayload {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "sig" => self.signatures.first().map(|s| s.as_str()),
            "tx" => Some(&self.tx),
            "bn" => Some(&self.bn),
            "sa" => Some(&self.sa),
            "sp" => Some(&self.sp),
            "ex" => Some(&self.ex),
            "rbn" => Some(&self.rbn),
            "rid" => Some(&self.rid),
            "req" => Some(&self.req),
            _ => key
                .strip_prefix("sig")
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| self.signatures.get(n))
                .map(|s| s.as_str()),
        }
    }

    /// Substitute every `{{key}}` token in the template.
    ///
    /// Unknown keys substitute to the empty string, same as known keys with
    /// no value.
    pub fn apply_template(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    out.push_str(self.get(key).unwrap_or(""));
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    return out;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// The JSON object a background callback posts: every non-empty key,
    /// plus `sig0..sigN` when there is more than one signature.
    ///
    /// Caller-supplied extras may not clash with the reserved keys.
    pub fn to_json(&self, extra: &Map<String, Value>) -> Result<Value, Error> {
        let mut out = Map::new();
        for key in RESERVED_KEYS {
            if let Some(value) = self.get(key) {
                if !value.is_empty() {
                    out.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
        }
        if self.signatures.len() > 1 {
            for (i, sig) in self.signatures.iter().enumerate() {
                out.insert(format!("sig{i}"), Value::String(sig.clone()));
            }
        }
        for (key, value) in extra {
            let reserved = RESERVED_KEYS.contains(&key.as_str())
                || key
                    .strip_prefix("sig")
                    .is_some_and(|n| n.parse::<usize>().is_ok());
            if reserved {
                return Err(Error::ReservedCallbackKey(key.clone()));
            }
            out.insert(key.clone(), value.clone());
        }
        Ok(Value::Object(out))
    }
}

/// Where and how to deliver the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Callback {
    /// The template-substituted URL.
    pub url: String,
    /// Deliver as a background POST instead of a browser redirect.
    pub background: bool,
    pub payload: CallbackPayload,
}
