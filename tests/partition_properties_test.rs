//! Partitioning properties over a generated document list

use covharvest::config::{PartitionStrategy, ShardConfig};
use covharvest::core::partition::{hash_bucket, partition, WorkSelection};
use covharvest::domain::{DocumentFamily, DocumentRef};
use std::collections::HashSet;
use test_case::test_case;

fn documents(count: usize) -> Vec<DocumentRef> {
    (0..count)
        .map(|i| {
            let (family, prefix) = if i % 3 == 0 {
                (DocumentFamily::Determination, 'L')
            } else {
                (DocumentFamily::Article, 'A')
            };
            let id = 30000 + i;
            DocumentRef::new(family, Some(&id.to_string()), Some(&format!("{prefix}{id}"))).unwrap()
        })
        .collect()
}

fn keys(docs: &[DocumentRef]) -> Vec<String> {
    docs.iter().map(DocumentRef::canonical_key).collect()
}

#[test_case(1, PartitionStrategy::Hash ; "single shard hash")]
#[test_case(2, PartitionStrategy::Hash ; "two shards hash")]
#[test_case(7, PartitionStrategy::Hash ; "seven shards hash")]
#[test_case(3, PartitionStrategy::RoundRobin ; "three shards round robin")]
#[test_case(16, PartitionStrategy::RoundRobin ; "more shards than half the documents")]
fn test_shards_are_disjoint_and_complete(count: usize, strategy: PartitionStrategy) {
    let docs = documents(25);

    let mut seen: Vec<String> = Vec::new();
    for index in 0..count {
        seen.extend(keys(&partition(&docs, index, count, strategy)));
    }

    assert_eq!(seen.len(), docs.len(), "no document is assigned twice");
    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(unique.len(), docs.len());
    for key in keys(&docs) {
        assert!(unique.contains(&key));
    }
}

#[test]
fn test_shard_preserves_discovery_order() {
    let docs = documents(40);
    let all_keys = keys(&docs);
    for index in 0..4 {
        let shard = keys(&partition(&docs, index, 4, PartitionStrategy::Hash));
        let positions: Vec<usize> = shard
            .iter()
            .map(|k| all_keys.iter().position(|a| a == k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_hash_assignment_survives_list_changes() {
    let docs = documents(30);
    let before: Vec<usize> = docs
        .iter()
        .map(|d| hash_bucket(&d.canonical_key(), 5))
        .collect();

    // dropping and reordering documents does not move the others
    let mut changed: Vec<DocumentRef> = docs.iter().skip(3).cloned().collect();
    changed.reverse();
    for (index, doc) in docs.iter().enumerate().skip(3) {
        let shard = (0..5)
            .find(|s| {
                partition(&changed, *s, 5, PartitionStrategy::Hash)
                    .iter()
                    .any(|d| d.canonical_key() == doc.canonical_key())
            })
            .unwrap();
        assert_eq!(shard, before[index]);
    }
}

#[test]
fn test_capped_selection_takes_prefix_of_shard() {
    let docs = documents(50);
    let shard = ShardConfig {
        index: 1,
        count: 3,
        strategy: PartitionStrategy::Hash,
    };

    let full = WorkSelection::from_parts(&shard, None, 0).unwrap().plan(&docs);
    let capped = WorkSelection::from_parts(&shard, None, 4).unwrap().plan(&docs);

    assert_eq!(capped.len(), 4.min(full.len()));
    assert_eq!(keys(&capped.assigned), keys(&full.assigned[..capped.len()]));
    assert_eq!(capped.shard_index, 1);
    assert_eq!(capped.shard_count, 3);
}
