//! Deterministic cache keys.
//!
//! The key is `"{op}_{sha256}"` where the digest covers a canonical JSON
//! document of the operation name, the positional arguments in call order
//! and the named arguments sorted by name.

use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Cache key for one operation invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Start a fingerprint for the named operation.
    pub fn builder(op: &str) -> FingerprintBuilder {
        FingerprintBuilder::new(op)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Operation name this key was built for.
    pub fn op(&self) -> &str {
        // The digest is fixed-width hex; everything before the last `_` is the op.
        match self.0.rfind('_') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collects arguments for a [`Fingerprint`].
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    op: String,
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl FingerprintBuilder {
    pub fn new(op: &str) -> Self {
        Self {
            op: op.to_string(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.args.push(to_value(value));
        self
    }

    /// Set a named argument. Order of calls does not matter.
    pub fn named<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Self {
        self.kwargs.insert(name.to_string(), to_value(value));
        self
    }

    pub fn finish(self) -> Fingerprint {
        let canonical = json!({
            "op": self.op,
            "args": self.args,
            "kwargs": self.kwargs,
        });
        let digest = Sha256::digest(canonical.to_string().as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Fingerprint(format!("{}_{}", self.op, hex))
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::warn!("Unserializable cache argument: {}", e);
        Value::Null
    })
}
