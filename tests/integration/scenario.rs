//! Integration test: three servers, three replicas each.
//!
//! Resolve a pair of keys, remove one server, and check that only the keys
//! it owned changed hands.

use spindle_integration_tests::{Snapshot, sample_keys, servers};
use spindle_ring::{Ring, RingConfig, RingError};

fn three_server_ring() -> Ring {
    let mut ring = Ring::new(3).unwrap();
    ring.add_node("server1");
    ring.add_node("server2");
    ring.add_node("server3");
    ring
}

#[test]
fn test_keys_resolve_to_a_known_server_and_stay_put() {
    let ring = three_server_ring();
    let names = servers(3);

    for key in ["key1", "key67890"] {
        let owner = ring.resolve(key).expect("ring is populated");
        assert!(names.iter().any(|n| n == owner), "{key} -> {owner}");
        for _ in 0..10 {
            assert_eq!(ring.resolve(key), Some(owner));
        }
    }
}

#[test]
fn test_removing_server1_moves_only_its_keys() {
    let mut ring = three_server_ring();
    let keys: Vec<String> = ["key1", "key67890"]
        .into_iter()
        .map(String::from)
        .chain(sample_keys(2000))
        .collect();

    let before = Snapshot::of(&ring, &keys);
    let successor: Vec<Option<String>> = keys
        .iter()
        .map(|k| {
            ring.owners(k, 3)
                .into_iter()
                .find(|n| *n != "server1")
                .map(str::to_string)
        })
        .collect();

    ring.remove_node("server1");
    let after = Snapshot::of(&ring, &keys);

    for (i, (key, was)) in before.iter().enumerate() {
        let now = after.owner(key);
        if was == Some("server1") {
            // Falls through to the next distinct server clockwise.
            assert_eq!(now, successor[i].as_deref(), "key {key}");
        } else {
            assert_eq!(now, was, "key {key} was not on server1 but moved");
        }
    }
    assert_eq!(after.count_for("server1"), 0);
}

#[test]
fn test_config_built_ring_matches_manual_ring() {
    let config: RingConfig = toml::from_str(
        r#"
replicas = 3
nodes = ["server1", "server2", "server3"]
"#,
    )
    .unwrap();

    let keys = sample_keys(500);
    assert_eq!(
        Snapshot::of(&config.build().unwrap(), &keys),
        Snapshot::of(&three_server_ring(), &keys)
    );
}

#[test]
fn test_zero_replicas_is_a_config_error() {
    let err = Ring::new(0).unwrap_err();
    assert!(matches!(err, RingError::InvalidConfig(_)));
    assert!(err.to_string().contains("replica"));
}

#[test]
fn test_empty_ring_routes_nothing() {
    let mut ring = Ring::new(3).unwrap();
    assert_eq!(ring.resolve("key1"), None);

    ring.add_node("server1");
    ring.remove_node("server1");
    assert!(ring.is_empty());
    assert_eq!(ring.resolve("key1"), None);
}
