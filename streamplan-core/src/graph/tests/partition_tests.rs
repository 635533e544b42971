use super::*;

#[test]
fn test_default_partition_per_language() {
    assert_eq!(Partition::default_for(Language::Native), Partition::RoundRobin);

    let foreign = Partition::default_for(Language::Foreign);
    assert_eq!(
        foreign,
        Partition::Foreign(FunctionDescriptor::new(
            FOREIGN_PARTITION_MODULE,
            "RoundRobinPartition"
        ))
    );
    assert_eq!(foreign.language(), Language::Foreign);
}

#[test]
fn test_key_based_shares_function_identity() {
    let key_fn = FunctionRef::native("by_len", KeySelector::new(|s: &String| s.len()));
    let partition = Partition::key_based_for(&key_fn);

    assert_eq!(partition.key_function(), Some(&key_fn));
    assert_eq!(partition.to_string(), "KeyBased(by_len)");
}

#[test]
fn test_foreign_key_by_uses_foreign_key_partition() {
    let key_fn: FunctionRef = FunctionDescriptor::new("udfs", "word").into();
    assert_eq!(
        Partition::key_based_for(&key_fn),
        Partition::Foreign(FunctionDescriptor::new(FOREIGN_PARTITION_MODULE, "KeyPartition"))
    );
}

#[test]
fn test_partitioner_from_key_based() {
    let key_fn = FunctionRef::native("word", KeySelector::new(|s: &String| s.clone()));
    let partitioner = Partition::key_based_for(&key_fn)
        .partitioner::<String>()
        .unwrap();

    let a = partitioner.partition(&"hello".to_string(), 4);
    let b = partitioner.partition(&"hello".to_string(), 4);
    assert_eq!(a, b);
    assert!(a[0] < 4);
}

#[test]
fn test_partitioner_from_custom() {
    let partition = Partition::custom("first", |_: &u32, _n: usize| vec![0]);
    let partitioner = partition.partitioner::<u32>().unwrap();
    assert_eq!(partitioner.partition(&7, 3), vec![0]);
}

#[test]
fn test_partitioner_type_mismatch() {
    let partition = Partition::custom("first", |_: &u32, _n: usize| vec![0]);
    let err = partition.partitioner::<String>().err().unwrap();
    assert_eq!(
        err,
        GraphError::PartitionTypeMismatch {
            partition: "Custom(first)".to_string()
        }
    );
}

#[test]
fn test_foreign_partition_has_no_native_partitioner() {
    let err = Partition::broadcast_for(Language::Foreign)
        .partitioner::<u32>()
        .err()
        .unwrap();
    assert!(matches!(err, GraphError::ForeignPartition { .. }));
}

#[test]
fn test_round_robin_and_broadcast_partitioners() {
    let rr = Partition::RoundRobin.partitioner::<u32>().unwrap();
    assert_eq!(rr.partition(&1, 2), vec![0]);
    assert_eq!(rr.partition(&1, 2), vec![1]);

    let bc = Partition::Broadcast.partitioner::<u32>().unwrap();
    assert_eq!(bc.partition(&1, 3), vec![0, 1, 2]);
}
