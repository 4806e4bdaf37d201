//! List transformations applied to cached list queries after a mutation.
//!
//! These never touch storage themselves; `CacheLayer` runs them inside a
//! storage transaction so readers never observe an intermediate list.

use super::traits::Cacheable;

/// Append a newly created entity to the end of a cached list.
///
/// Existing order is preserved. If an entity with the same key is already in
/// the list it is replaced in place, so the key appears exactly once.
pub fn append_created<T: Cacheable>(mut list: Vec<T>, created: T) -> Vec<T> {
  match list
    .iter_mut()
    .find(|existing| existing.cache_key() == created.cache_key())
  {
    Some(existing) => *existing = created,
    None => list.push(created),
  }
  list
}

/// Drop every entity whose key equals `deleted_key`.
///
/// An absent key leaves the list unchanged.
pub fn remove_deleted<T: Cacheable>(list: Vec<T>, deleted_key: &str) -> Vec<T> {
  list
    .into_iter()
    .filter(|entity| entity.cache_key() != deleted_key)
    .collect()
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  pub struct Item {
    pub id: String,
    pub name: String,
  }

  impl Item {
    pub fn new(id: &str, name: &str) -> Self {
      Self {
        id: id.to_string(),
        name: name.to_string(),
      }
    }
  }

  impl Cacheable for Item {
    fn cache_key(&self) -> &str {
      &self.id
    }

    fn entity_type() -> &'static str {
      "item"
    }
  }

  fn ids(list: &[Item]) -> Vec<&str> {
    list.iter().map(|i| i.id.as_str()).collect()
  }

  #[test]
  fn test_delete_present_key() {
    let list = vec![Item::new("1", "a"), Item::new("2", "b")];
    let result = remove_deleted(list, "2");
    assert_eq!(ids(&result), vec!["1"]);
  }

  #[test]
  fn test_delete_absent_key_is_noop() {
    let list = vec![Item::new("1", "a"), Item::new("2", "b")];
    let result = remove_deleted(list.clone(), "9");
    assert_eq!(result, list);
  }

  #[test]
  fn test_delete_compares_keys_not_values() {
    // Same name, different key: only the key match goes
    let list = vec![Item::new("1", "same"), Item::new("2", "same")];
    let result = remove_deleted(list, "1");
    assert_eq!(ids(&result), vec!["2"]);
  }

  #[test]
  fn test_create_appends_to_end() {
    let list = vec![Item::new("1", "a")];
    let result = append_created(list, Item::new("3", "c"));
    assert_eq!(ids(&result), vec!["1", "3"]);
  }

  #[test]
  fn test_create_preserves_order() {
    let list = vec![Item::new("5", "e"), Item::new("2", "b"), Item::new("9", "i")];
    let result = append_created(list, Item::new("1", "a"));
    assert_eq!(ids(&result), vec!["5", "2", "9", "1"]);
  }

  #[test]
  fn test_create_existing_key_replaces_in_place() {
    let list = vec![Item::new("1", "a"), Item::new("2", "b")];
    let result = append_created(list, Item::new("1", "renamed"));
    assert_eq!(ids(&result), vec!["1", "2"]);
    assert_eq!(result[0].name, "renamed");
  }

  #[test]
  fn test_create_into_empty_list() {
    let result = append_created(Vec::new(), Item::new("1", "a"));
    assert_eq!(ids(&result), vec!["1"]);
  }
}
