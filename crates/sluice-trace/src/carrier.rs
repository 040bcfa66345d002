//! Carrier - read-only view over a message's attribute map
//!
//! Brokers store headers in different shapes; the pipeline only ever needs
//! to list keys and read values. Any attribute map can act as a carrier by
//! implementing this trait.

use std::collections::HashMap;

/// Read access to a propagation carrier.
pub trait Carrier {
    /// Value for an exact key, if present and textual.
    fn get(&self, key: &str) -> Option<&str>;

    /// All keys present in the carrier.
    fn keys(&self) -> Vec<&str>;

    /// Case-insensitive lookup. Header keys survive broker round-trips
    /// with unpredictable casing, so an exact miss falls back to a scan.
    fn get_ignore_case(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.get(key) {
            return Some(value);
        }
        self.keys()
            .into_iter()
            .find(|k| k.eq_ignore_ascii_case(key))
            .and_then(|k| self.get(k))
    }
}

impl Carrier for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        HashMap::keys(self).map(String::as_str).collect()
    }
}
