use serde::{Deserialize, Serialize};

/// Literal the PPM SQL runner returns in place of SQL `NULL`.
pub const NULL_SENTINEL: &str = "null";

/// Whether a raw query value counts as present.
///
/// A value is present iff it is non-null, non-empty after trimming and not
/// case-insensitively equal to [`NULL_SENTINEL`]. Every conditional field in
/// the crate goes through this one predicate.
pub fn is_present(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let v = v.trim();
            !v.is_empty() && !v.eq_ignore_ascii_case(NULL_SENTINEL)
        }
        None => false,
    }
}

/// Ordered key → optional-string mapping for project, release and EPMO
/// metadata.
///
/// Entries keep their insertion order (the column order of the query that
/// produced them). Raw values are kept as-is; [`ValueMap::get`] and
/// [`ValueMap::has`] only ever expose values that pass [`is_present`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMap {
    entries: Vec<(String, Option<String>)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from parallel column-name / value slices.
    pub fn from_row(columns: &[String], values: &[Option<String>]) -> Self {
        let mut map = Self::new();
        for (column, value) in columns.iter().zip(values) {
            map.insert(column.clone(), value.clone());
        }
        map
    }

    /// Insert a value, replacing an existing entry for the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The value for `key`, only if it is present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw(key).filter(|v| is_present(Some(*v)))
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The stored value for `key`, without the presence check.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Present entries in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, v)| match v.as_deref() {
            Some(v) if is_present(Some(v)) => Some((k.as_str(), v)),
            _ => None,
        })
    }

    /// All keys in insertion order, present or not.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// True when at least one entry holds a present value.
    pub fn has_present_values(&self) -> bool {
        self.present().next().is_some()
    }

    /// Number of entries, present or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append every entry of `other`, later keys replacing earlier ones.
    pub fn merge(&mut self, other: ValueMap) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Option<V>)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v.map(Into::into));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_are_not_present() {
        for v in [None, Some(""), Some("   "), Some("null"), Some("NULL"), Some(" Null ")] {
            assert!(!is_present(v), "{:?} should not be present", v);
        }
    }

    #[test]
    fn falsy_looking_values_are_present() {
        for v in ["0", "false", "nullable", "N/A"] {
            assert!(is_present(Some(v)), "{:?} should be present", v);
        }
    }

    #[test]
    fn get_hides_sentinel_but_raw_keeps_it() {
        let map: ValueMap = [("PHASE", Some("null")), ("STATUS", Some("Active"))]
            .into_iter()
            .collect();

        assert_eq!(map.get("PHASE"), None);
        assert_eq!(map.raw("PHASE"), Some("null"));
        assert!(!map.has("PHASE"));
        assert_eq!(map.get("STATUS"), Some("Active"));
        assert!(!map.has("MISSING"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = ValueMap::new();
        map.insert("A", Some("1".to_string()));
        map.insert("B", Some("2".to_string()));
        map.insert("A", Some("3".to_string()));

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(map.get("A"), Some("3"));
    }

    #[test]
    fn map_of_only_nulls_has_no_present_values() {
        let map: ValueMap = [("A", None::<&str>), ("B", Some("null"))].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert!(!map.has_present_values());
        assert!(!ValueMap::new().has_present_values());

        let map: ValueMap = [("A", None), ("B", Some("0"))].into_iter().collect();
        assert!(map.has_present_values());
    }

    #[test]
    fn present_skips_blank_entries() {
        let map: ValueMap = [("A", Some("x")), ("B", Some(" ")), ("C", Some("y"))]
            .into_iter()
            .collect();
        let present: Vec<_> = map.present().collect();
        assert_eq!(present, vec![("A", "x"), ("C", "y")]);
    }
}
