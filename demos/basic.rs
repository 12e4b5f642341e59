//! Examples of using the persistent trie
use persistent_trie::{ByteTrie, CharTrie, TrieStore};

fn main() {
    // Every edit returns a new snapshot
    let v0 = ByteTrie::new();
    let v1 = v0.put("hello", 1u32);
    let v2 = v1.put("help", String::from("two"));
    let v3 = v2.remove("hello");

    assert_eq!(v1.get::<u32>("hello"), Some(&1));
    assert_eq!(v2.get::<String>("help").map(String::as_str), Some("two"));
    assert_eq!(v3.get::<u32>("hello"), None);

    // Values must be read back as the type they were stored as
    assert_eq!(v2.get::<u64>("hello"), None);
    println!("{:?}", v2.get_checked::<u64>("hello"));

    // Keys can also be read as chars
    let words = CharTrie::new().put("straße", 6usize);
    assert_eq!(words.get::<usize>("straße"), Some(&6));

    // A store publishes successive versions to concurrent readers
    let store: TrieStore = TrieStore::from_trie(v2);
    let guard = store.get::<u32>("hello").unwrap();
    store.remove("hello");
    assert_eq!(*guard, 1);
    assert!(store.get::<u32>("hello").is_none());

    println!("snapshots: {} -> {} -> {} entries", v0.len(), v1.len(), v3.len());
}
