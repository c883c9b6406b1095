//! Mutable view handed to preference edit transforms.

use super::Preferences;
use std::collections::BTreeSet;

/// Working copy of a namespace inside one edit transaction.
///
/// Tracks which keys were touched so only those rows are written back.
#[derive(Debug)]
pub struct PreferencesEdit {
    values: Preferences,
    touched: BTreeSet<String>,
}

impl PreferencesEdit {
    pub(crate) fn new(values: Preferences) -> Self {
        Self {
            values,
            touched: BTreeSet::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if self.values.get(key) == Some(&value) {
            return;
        }
        self.values.insert(key.to_string(), value);
        self.touched.insert(key.to_string());
    }

    /// Removes `key` entirely. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.touched.insert(key.to_string());
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        !self.touched.is_empty()
    }

    /// Splits into the final mapping and the keys that changed.
    pub(crate) fn into_parts(self) -> (Preferences, BTreeSet<String>) {
        (self.values, self.touched)
    }
}

#[cfg(test)]
mod tests {
    use super::PreferencesEdit;
    use crate::prefs::Preferences;

    fn seeded() -> PreferencesEdit {
        let mut values = Preferences::new();
        values.insert("wells".to_string(), "[]".to_string());
        PreferencesEdit::new(values)
    }

    #[test]
    fn rewriting_same_value_is_not_a_change() {
        let mut edit = seeded();
        edit.set("wells", "[]");
        assert!(!edit.is_dirty());
    }

    #[test]
    fn removing_absent_key_is_not_a_change() {
        let mut edit = seeded();
        edit.remove("well_list");
        assert!(!edit.is_dirty());
    }

    #[test]
    fn set_then_remove_tracks_key_once() {
        let mut edit = seeded();
        edit.set("well_list", "[1]");
        edit.remove("well_list");
        let (values, touched) = edit.into_parts();
        assert!(!values.contains_key("well_list"));
        assert_eq!(touched.len(), 1);
    }
}
