//! Serde helper storing a [`Duration`] as whole seconds, for config files.
//!
//! ```
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Limits {
//!     #[serde(with = "sitelens_protocol::duration_secs")]
//!     timeout: Duration,
//! }
//!
//! let limits: Limits = serde_json::from_str(r#"{"timeout": 30}"#).unwrap();
//! assert_eq!(limits.timeout, Duration::from_secs(30));
//! ```

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_secs())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}
