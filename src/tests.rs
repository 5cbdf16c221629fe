extern crate std;

use std::{ops::Range, prelude::v1::*, time::Duration};

use proptest::prelude::*;
use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::model;

use super::*;

fn insert_find_all(keys: &[i32]) {
    let mut tree = AvlTree::new();

    for &key in keys {
        tree.insert(key).expect("keys are unique");
        tree.assert_invariants();
    }

    for &key in keys {
        let node = tree.find(key).expect("item not found");
        assert_eq!(node.key(), key);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

// Visits every permutation of `keys` by Heap's algorithm.
fn for_each_permutation(keys: &mut [i32], k: usize, f: &mut impl FnMut(&[i32])) {
    if k <= 1 {
        f(keys);
        return;
    }

    for i in 0..k - 1 {
        for_each_permutation(keys, k - 1, f);

        if k % 2 == 0 {
            keys.swap(i, k - 1);
        } else {
            keys.swap(0, k - 1);
        }
    }

    for_each_permutation(keys, k - 1, f);
}

#[test]
fn five_elems_find() {
    let mut keys = [0, 1, 2, 3, 4];
    let mut seen = 0;

    for_each_permutation(&mut keys, 5, &mut |perm| {
        insert_find_all(perm);
        seen += 1;
    });

    assert_eq!(seen, 120);
}

fn insert_delete_all(keys: &[i32]) {
    let mut tree = AvlTree::new();

    for &key in keys {
        tree.insert(key).expect("keys are unique");
        tree.assert_invariants();
    }

    for &key in keys {
        assert!(tree.delete(key), "item not found");
        tree.assert_invariants();
        assert!(tree.find(key).is_none());
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(key).expect("keys are unique");
        tree.assert_invariants();
    }

    for &key in keys.iter().rev() {
        assert!(tree.delete(key), "item not found");
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
    assert!(tree.root().is_none());
}

#[test]
fn delete_one() {
    insert_delete_all(&[0]);
}

#[test]
fn delete_two() {
    insert_delete_all(&[0, 1]);
    insert_delete_all(&[1, 0]);
}

#[test]
fn delete_three() {
    insert_delete_all(&[0, 1, 2]);
    insert_delete_all(&[0, 2, 1]);
    insert_delete_all(&[1, 0, 2]);
    insert_delete_all(&[1, 2, 0]);
    insert_delete_all(&[2, 0, 1]);
    insert_delete_all(&[2, 1, 0]);
}

#[test]
fn delete_six() {
    let mut keys = [0, 1, 2, 3, 4, 5];

    for_each_permutation(&mut keys, 6, &mut |perm| insert_delete_all(perm));
}

#[test]
fn ascending_triple_rotates_left() {
    let mut tree = AvlTree::new();
    for key in [10, 20, 30] {
        tree.insert(key).unwrap();
    }

    let root = tree.root().unwrap();
    assert_eq!(root.key(), 20);
    assert_eq!(root.height(), 1);

    let left = root.left().unwrap();
    let right = root.right().unwrap();
    assert_eq!((left.key(), left.height()), (10, 0));
    assert_eq!((right.key(), right.height()), (30, 0));

    assert_eq!(tree.assert_invariants(), [10, 20, 30]);
}

#[test]
fn descending_inserts_rotate_right() {
    let mut tree = AvlTree::new();
    for key in [30, 20, 10, 5] {
        tree.insert(key).unwrap();
        tree.assert_invariants();
    }

    let root = tree.root().unwrap();
    assert_eq!(root.key(), 20);
    assert_eq!(root.height(), 2);
    assert_eq!(root.left().map(Node::key), Some(10));
    assert_eq!(root.right().map(Node::key), Some(30));
    assert_eq!(root.left().and_then(Node::left).map(Node::key), Some(5));

    assert_eq!(tree.assert_invariants(), [5, 10, 20, 30]);
}

#[test]
fn delete_evens_from_shuffled_fifteen() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(15);

    for _ in 0..50 {
        let mut keys: Vec<i32> = (1..=15).collect();
        keys.shuffle(&mut rng);

        let mut tree = AvlTree::new();
        for &key in &keys {
            tree.insert(key).unwrap();
        }
        tree.assert_invariants();

        for even in (2..=14).step_by(2) {
            assert!(tree.delete(even));
            tree.assert_invariants();

            assert!(!tree.contains(even));
            for odd in (1..=15).step_by(2) {
                assert_eq!(tree.find(odd).map(Node::key), Some(odd));
            }
        }

        assert_eq!(tree.assert_invariants(), [1, 3, 5, 7, 9, 11, 13, 15]);
    }
}

#[test]
fn delete_node_with_two_children_promotes_successor() {
    let mut tree = AvlTree::new();
    for key in [20, 10, 30, 25, 40] {
        tree.insert(key).unwrap();
    }

    assert!(tree.delete(20));

    let root = tree.root().unwrap();
    assert_eq!(root.key(), 25);
    assert_eq!(tree.assert_invariants(), [10, 25, 30, 40]);
}

#[test]
fn duplicate_insert_is_rejected() {
    let mut tree = AvlTree::new();
    for key in [4, 2, 6, 1, 3] {
        tree.insert(key).unwrap();
    }

    let mut before = String::new();
    tree.dotgraph("before", &mut before).unwrap();

    assert_eq!(tree.insert(3), Err(DuplicateKey(3)));
    assert_eq!(tree.len(), 5);

    let mut after = String::new();
    tree.dotgraph("before", &mut after).unwrap();
    assert_eq!(before, after);
}

#[test]
fn deleting_absent_key_changes_nothing() {
    let mut tree = AvlTree::new();
    for key in [8, 4, 12, 2, 6, 10, 14, 1] {
        tree.insert(key).unwrap();
    }

    let mut before = String::new();
    tree.dotgraph("t", &mut before).unwrap();

    assert!(!tree.delete(7));
    assert!(!tree.delete(100));
    assert_eq!(tree.len(), 8);

    let mut after = String::new();
    tree.dotgraph("t", &mut after).unwrap();
    assert_eq!(before, after);
}

#[test]
fn empty_tree() {
    let mut tree = AvlTree::new();

    assert!(tree.is_empty());
    assert_eq!(tree.height(), -1);
    assert!(tree.find(1).is_none());
    assert!(!tree.delete(1));

    tree.insert(1).unwrap();
    tree.clear();
    assert!(tree.is_empty());
    assert!(tree.assert_invariants().is_empty());
}

#[test]
fn dotgraph_labels_heights() {
    let mut tree = AvlTree::new();

    let mut empty = String::new();
    tree.dotgraph("e", &mut empty).unwrap();
    assert_eq!(empty, "digraph \"graph-e\" {}");

    for key in [2, 1, 3] {
        tree.insert(key).unwrap();
    }

    let mut out = String::new();
    tree.dotgraph("g", &mut out).unwrap();

    assert!(out.contains("\"graphg-2\" [label=\"2:1\"]"));
    assert!(out.contains("\"graphg-1\" [label=\"1:0\"]"));
    assert!(out.contains("\"graphg-2\" -> \"graphg-3\";"));
    assert!(out.contains("[shape=point]"));
}

#[test]
fn visits_count_examined_nodes() {
    let mut tree = InstrumentedTree::new();

    // Inserting into an empty tree examines nothing.
    tree.insert(10).unwrap();
    tree.insert(20).unwrap();
    tree.insert(30).unwrap();
    tree.insert(40).unwrap();

    let visits: Vec<usize> = tree
        .stats(OpKind::Insert)
        .samples()
        .iter()
        .map(|s| s.visits)
        .collect();
    assert_eq!(visits, [0, 1, 2, 2]);

    assert_eq!(tree.find(30).map(Node::key), Some(30));
    assert!(tree.find(35).is_none());
    assert_eq!(tree.stats(OpKind::Find).mean_visits(), Some(2.5));

    // 20 has two children; its successor 30 is the right child.
    assert!(tree.delete(20));
    assert!(!tree.delete(20));
    let delete = tree.stats(OpKind::Delete);
    assert_eq!(delete.len(), 2);
    assert_eq!(delete.samples()[0].visits, 2);

    assert_eq!(tree.tree().assert_invariants(), [10, 30, 40]);
}

#[test]
fn op_stats_means() {
    let mut stats = OpStats::new();
    assert_eq!(stats.mean_elapsed(), None);
    assert_eq!(stats.mean_visits(), None);

    stats.record(Sample {
        elapsed: Duration::from_micros(10),
        visits: 3,
    });
    stats.record(Sample {
        elapsed: Duration::from_micros(30),
        visits: 4,
    });

    assert_eq!(stats.mean_elapsed(), Some(Duration::from_micros(20)));
    assert_eq!(stats.mean_visits(), Some(3.5));

    stats.clear();
    assert!(stats.is_empty());
}

#[test]
fn report_lists_every_operation() {
    let mut tree = InstrumentedTree::new();
    tree.insert(1).unwrap();
    tree.find(1);

    let report = tree.report();
    assert_eq!(report.insert.calls, 1);
    assert_eq!(report.delete.mean_visits, None);

    let text = report.to_string();
    assert!(text.contains("Avg inserting time"));
    assert!(text.contains("Avg searching iteration 1.00"));
    assert!(text.contains("No deleting calls recorded"));

    tree.reset_stats();
    assert!(tree.stats(OpKind::Insert).is_empty());
    assert_eq!(tree.into_inner().len(), 1);
}

fn args(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
}

#[test]
fn config_defaults() {
    let config = WorkloadConfig::from_args(Vec::new()).unwrap();
    assert_eq!(config, WorkloadConfig::default());
    assert_eq!(config.count, 10_000);
    assert_eq!(config.searches, 100);
    assert_eq!(config.deletes, 1_000);
}

#[test]
fn config_parses_flags() {
    let config =
        WorkloadConfig::from_args(args("--count 50 --max-key 20 --seed 7 --dot -vv")).unwrap();

    assert_eq!(config.count, 50);
    assert_eq!(config.max_key, 20);
    assert_eq!(config.seed, Some(7));
    assert!(config.dot);
    assert_eq!(config.log_level, log::LevelFilter::Debug);
}

#[test]
fn config_errors() {
    assert_eq!(
        WorkloadConfig::from_args(args("--bogus")),
        Err(ConfigError::UnknownArgument("--bogus".into()))
    );
    assert_eq!(
        WorkloadConfig::from_args(args("--count")),
        Err(ConfigError::MissingValue("--count"))
    );
    assert_eq!(
        WorkloadConfig::from_args(args("--deletes many")),
        Err(ConfigError::InvalidValue {
            flag: "--deletes",
            value: "many".into()
        })
    );
    assert_eq!(
        WorkloadConfig::from_args(args("--max-key 0")),
        Err(ConfigError::EmptyKeyRange(0))
    );
}

#[test]
fn workload_is_reproducible() {
    let config = WorkloadConfig {
        count: 200,
        max_key: 100,
        searches: 10,
        deletes: 20,
        seed: Some(42),
        ..WorkloadConfig::default()
    };

    let a = Workload::generate(&config).unwrap();
    let b = Workload::generate(&config).unwrap();
    assert_eq!(a, b);

    assert_eq!(a.keys.len(), 200);
    assert!(a.keys.iter().all(|k| (1..=100).contains(k)));
    assert!(a.searches.iter().all(|k| a.keys.contains(k)));
    assert_eq!(a.deletes.len(), 20);
}

#[test]
fn workload_needs_keys_to_sample() {
    let config = WorkloadConfig {
        count: 0,
        searches: 5,
        seed: Some(1),
        ..WorkloadConfig::default()
    };

    assert_eq!(
        Workload::generate(&config),
        Err(WorkloadError::EmptySample { requested: 5 })
    );

    let config = WorkloadConfig {
        max_key: -3,
        ..WorkloadConfig::default()
    };
    assert_eq!(
        Workload::generate(&config),
        Err(WorkloadError::EmptyKeyRange(-3))
    );
}

#[test]
fn workload_run_accounts_for_every_key() {
    let workload = Workload {
        seed: 0,
        keys: vec![5, 3, 8, 3, 1, 5],
        searches: vec![3, 4],
        deletes: vec![8, 8, 1],
    };

    let outcome = workload.run();
    assert_eq!(outcome.duplicates, 2);
    assert_eq!(outcome.found, 1);
    assert_eq!(outcome.deleted, 2);

    let tree = outcome.tree;
    assert_eq!(tree.stats(OpKind::Insert).len(), 6);
    assert_eq!(tree.stats(OpKind::Find).len(), 2);
    assert_eq!(tree.stats(OpKind::Delete).len(), 3);
    assert_eq!(tree.tree().assert_invariants(), [3, 5]);
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn height_is_logarithmic(
        keys in proptest::collection::hash_set(any::<i32>(), 0..2000)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    ) {
        let mut tree = AvlTree::new();
        for &key in &keys {
            prop_assert!(tree.insert(key).is_ok());
        }

        let keys = tree.assert_invariants();
        prop_assert_eq!(keys.len(), tree.len());

        let n = tree.len() as f64;
        let bound = 1.44 * (n + 2.0).log2() - 0.328;
        prop_assert!(
            f64::from(tree.height()) <= bound,
            "height {} exceeds {bound} for {} keys",
            tree.height(),
            tree.len()
        );
    }
}
