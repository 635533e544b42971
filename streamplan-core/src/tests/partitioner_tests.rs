use super::*;

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct Record {
    user_id: String,
    value: i32,
}

fn record(user_id: &str, value: i32) -> Record {
    Record {
        user_id: user_id.to_string(),
        value,
    }
}

fn user_selector() -> Arc<KeySelector<Record>> {
    Arc::new(KeySelector::new(|r: &Record| r.user_id.clone()))
}

#[test]
fn test_hash_partitioner_same_key_same_partition() {
    let partitioner = HashPartitioner::new(user_selector());

    let p1 = partitioner.partition(&record("user_1", 100), 4);
    let p2 = partitioner.partition(&record("user_1", 200), 4);

    // Same key should go to same partition
    assert_eq!(p1, p2);
    assert_eq!(p1.len(), 1);
}

#[test]
fn test_hash_partitioner_distribution() {
    let partitioner = HashPartitioner::new(user_selector());

    let mut counts = vec![0; 4];
    for i in 0..1000 {
        let targets = partitioner.partition(&record(&format!("user_{}", i), i), 4);
        counts[targets[0]] += 1;
    }

    // Each partition should get roughly 250 records (1000 / 4)
    for count in counts {
        assert!(count > 200 && count < 300, "Unbalanced distribution: {}", count);
    }
}

#[test]
fn test_hash_partitioner_within_bounds() {
    let partitioner = HashPartitioner::new(user_selector());

    for i in 0..100 {
        let targets = partitioner.partition(&record(&format!("user_{}", i), i), 8);
        assert!(targets[0] < 8);
    }
}

#[test]
fn test_round_robin_partitioner() {
    let partitioner = RoundRobinPartitioner::new();
    let rec = record("user_1", 100);

    // Should cycle through partitions
    assert_eq!(partitioner.partition(&rec, 4), vec![0]);
    assert_eq!(partitioner.partition(&rec, 4), vec![1]);
    assert_eq!(partitioner.partition(&rec, 4), vec![2]);
    assert_eq!(partitioner.partition(&rec, 4), vec![3]);
    assert_eq!(partitioner.partition(&rec, 4), vec![0]);
}

#[test]
fn test_broadcast_partitioner() {
    let partitioner = BroadcastPartitioner;
    assert_eq!(
        Partitioner::<Record>::partition(&partitioner, &record("a", 1), 3),
        vec![0, 1, 2]
    );
}

#[test]
fn test_zero_partitions_routes_nowhere() {
    let rec = record("user_1", 1);
    assert!(HashPartitioner::new(user_selector()).partition(&rec, 0).is_empty());
    assert!(RoundRobinPartitioner::new().partition(&rec, 0).is_empty());
    assert!(Partitioner::<Record>::partition(&BroadcastPartitioner, &rec, 0).is_empty());
}

#[test]
fn test_custom_partitioner_drops_out_of_range_targets() {
    let custom = Arc::new(CustomPartition::new(|r: &Record, n: usize| {
        vec![r.value as usize, n]
    }));
    let partitioner = CustomPartitioner::new(custom);

    assert_eq!(partitioner.partition(&record("a", 1), 4), vec![1]);
    assert!(partitioner.partition(&record("a", 9), 4).is_empty());
}
