use super::entry::Entry;
use std::collections::HashMap;

/// 仅在解锁期间存在的内存索引：id -> Entry
#[derive(Default)]
pub struct EntryIndex {
    entries: HashMap<String, Entry>,
}

impl EntryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index, rejecting duplicate ids.
    ///
    /// On error the offending id is returned.
    pub fn from_entries(entries: Vec<Entry>) -> Result<Self, String> {
        let mut index = Self::new();
        for entry in entries {
            if index.entries.contains_key(&entry.id) {
                return Err(entry.id.clone());
            }
            index.entries.insert(entry.id.clone(), entry);
        }
        Ok(index)
    }

    /// Inserts or replaces by id, returning the replaced entry.
    pub fn upsert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.id.clone(), entry)
    }

    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        self.entries.remove(id)
    }

    /// Puts `id` back the way it was before an `upsert` or `remove`.
    pub fn restore(&mut self, id: &str, previous: Option<Entry>) {
        match previous {
            Some(entry) => {
                self.entries.insert(entry.id.clone(), entry);
            }
            None => {
                self.entries.remove(id);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose `link` or `user` contains `filter`, ignoring case.
    ///
    /// Ordered by link, then user, then id.
    pub fn filter(&self, filter: &str) -> Vec<Entry> {
        let needle = filter.to_lowercase();
        let mut matched: Vec<&Entry> = self
            .entries
            .values()
            .filter(|entry| entry.matches(&needle))
            .collect();
        matched.sort_by_cached_key(|e| {
            (e.link.to_lowercase(), e.user.to_lowercase(), e.id.clone())
        });
        matched.into_iter().cloned().collect()
    }

    /// All entries ordered by id, the order they are serialized in.
    pub fn snapshot(&self) -> Vec<Entry> {
        let mut all: Vec<Entry> = self.entries.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, link: &str, user: &str) -> Entry {
        Entry::new(id, link, user, "pw", "")
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut index = EntryIndex::new();
        assert!(index.upsert(entry("a1", "example.com", "bob")).is_none());
        let previous = index.upsert(entry("a1", "example.org", "bob")).unwrap();

        assert_eq!(previous.link, "example.com");
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a1").unwrap().link, "example.org");
    }

    #[test]
    fn restore_undoes_upsert_and_remove() {
        let mut index = EntryIndex::new();
        index.upsert(entry("a1", "example.com", "bob"));

        let previous = index.upsert(entry("a1", "changed.com", "eve"));
        index.restore("a1", previous);
        assert_eq!(index.get("a1").unwrap().link, "example.com");

        let previous = index.upsert(entry("b2", "new.com", "amy"));
        index.restore("b2", previous);
        assert!(index.get("b2").is_none());

        let removed = index.remove("a1");
        index.restore("a1", removed);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn filter_matches_link_or_user_case_insensitively() {
        let index = EntryIndex::from_entries(vec![
            entry("1", "GitHub.com", "alice"),
            entry("2", "mail.example.com", "bob"),
            entry("3", "bank.test", "ALICE.smith"),
        ])
        .unwrap();

        assert_eq!(index.filter("").len(), 3);

        let ids: Vec<String> = index.filter("alice").iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["3", "1"]);

        let ids: Vec<String> = index.filter("EXAMPLE").iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["2"]);

        assert!(index.filter("nothing").is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = EntryIndex::from_entries(vec![entry("x", "a", "b"), entry("x", "c", "d")])
            .err()
            .unwrap();
        assert_eq!(err, "x");
    }

    #[test]
    fn snapshot_is_sorted_by_id() {
        let index =
            EntryIndex::from_entries(vec![entry("b", "z", "z"), entry("a", "y", "y")]).unwrap();
        let ids: Vec<String> = index.snapshot().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
