//! Deduplicated, index-addressed identifier table

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    index: HashMap<String, u16>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from strings read in file order
    pub fn from_strings(strings: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(strings.len());
        for (i, s) in strings.iter().enumerate() {
            index.entry(s.clone()).or_insert(i as u16);
        }
        Self { strings, index }
    }

    /// Index of `s`, adding it if new. Returns `None` once the table is full.
    pub fn intern(&mut self, s: &str) -> Option<u16> {
        if let Some(&i) = self.index.get(s) {
            return Some(i);
        }
        let i = u16::try_from(self.strings.len()).ok()?;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), i);
        Some(i)
    }

    pub fn get(&self, index: u16) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut table = StringTable::new();
        assert_eq!(table.intern("self"), Some(0));
        assert_eq!(table.intern("::nonevar"), Some(1));
        assert_eq!(table.intern("self"), Some(0));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("::nonevar"));
        assert_eq!(table.get(2), None);
    }
}
