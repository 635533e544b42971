use streamplan_api::environment::StreamExecutionEnvironment;
use streamplan_core::error::GraphError;
use streamplan_core::graph::{FOREIGN_PARTITION_MODULE, Partition, VertexType};
use streamplan_core::operator::FunctionDescriptor;
use streamplan_core::types::Language;

fn udf(name: &str) -> FunctionDescriptor {
    FunctionDescriptor::new("udfs", name)
}

fn builtin(name: &str) -> Partition {
    Partition::Foreign(FunctionDescriptor::new(FOREIGN_PARTITION_MODULE, name))
}

#[test]
fn test_views_share_one_logical_stream() {
    let env = StreamExecutionEnvironment::new("views");
    let native = env.from_iter(vec![1i32, 2]).map(|x| x + 1);
    let foreign = native.as_foreign();
    let back = foreign.as_native::<i32>();

    assert_eq!(foreign.id(), native.id());
    assert_eq!(back.id(), native.id());
    assert_eq!(foreign.language(), Language::Foreign);
    assert_eq!(back.language(), Language::Native);
    assert!(foreign.node().same_node(native.node()));

    foreign.set_parallelism(3).unwrap();
    assert_eq!(native.parallelism(), 3);
    assert_eq!(back.parallelism(), 3);
}

#[test]
fn test_references_never_become_vertices() {
    let env = StreamExecutionEnvironment::new("mixed");
    let src = env.from_iter(vec!["a b".to_string()]);
    let split = src.as_foreign().flat_map(udf("split"));
    let upper = split.as_native::<String>().map(|w| w.to_uppercase());
    let sink = upper.sink(|_| {});

    let graph = env.build_job_graph().unwrap();
    assert_eq!(graph.vertex_count(), 4);
    assert_eq!(
        graph.topological_order(),
        vec![src.id(), split.id(), upper.id(), sink.id()]
    );
    assert_eq!(graph.upstream(split.id()), vec![src.id()]);
    assert_eq!(graph.upstream(upper.id()), vec![split.id()]);

    let split_vertex = graph.vertex(split.id()).unwrap();
    assert_eq!(split_vertex.operator.language(), Language::Foreign);
    assert_eq!(split_vertex.operator.name(), "FlatMap(udfs.split)");
}

#[test]
fn test_foreign_pipeline_defaults_to_foreign_round_robin() {
    let env = StreamExecutionEnvironment::new("foreign");
    let src = env.foreign_source(udf("read_lines"));
    let parsed = src.map(udf("parse"));
    let sink = parsed.sink(udf("write"));

    let graph = env.build_job_graph().unwrap();
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.vertex(src.id()).unwrap().vertex_type, VertexType::Source);
    assert_eq!(graph.vertex(sink.id()).unwrap().vertex_type, VertexType::Sink);
    for edge in graph.edges() {
        assert_eq!(edge.partition, builtin("RoundRobinPartition"));
    }
}

#[test]
fn test_foreign_key_by_installs_key_partition() {
    let env = StreamExecutionEnvironment::new("foreign-keys");
    let keyed = env
        .foreign_source(udf("read"))
        .map(udf("to_pair"))
        .key_by(udf("first"))
        .unwrap();
    let reduced = keyed.reduce(udf("sum"));
    reduced.sink(udf("write"));

    assert_eq!(keyed.partition(), builtin("KeyPartition"));
    let graph = env.build_job_graph().unwrap();
    let edge = graph
        .edges()
        .iter()
        .find(|e| e.target_vertex_id == reduced.id())
        .unwrap();
    assert_eq!(edge.src_vertex_id, keyed.id());
    assert_eq!(edge.partition, builtin("KeyPartition"));
}

#[test]
fn test_foreign_broadcast_and_custom_partition() {
    let env = StreamExecutionEnvironment::new("foreign-routing");
    let src = env.foreign_source(udf("read"));
    let a = src.map(udf("a"));
    a.broadcast().unwrap();
    a.broadcast().unwrap();
    assert_eq!(a.partition(), builtin("BroadcastPartition"));

    let b = src.map(udf("b"));
    b.partition_by(udf("by_region")).unwrap();
    assert_eq!(b.partition().to_string(), "Custom(udfs.by_region)");

    let err = b.partition().partitioner::<String>().err().unwrap();
    assert!(matches!(err, GraphError::ForeignPartition { .. }));
}

#[test]
fn test_partition_rejected_across_languages() {
    let env = StreamExecutionEnvironment::new("guard");
    let src = env.from_iter(vec![1i32]);
    let foreign_map = src.as_foreign().map(udf("inc"));

    let err = foreign_map.key_by(udf("identity")).unwrap_err();
    assert_eq!(
        err,
        GraphError::CrossLanguagePartition {
            node: foreign_map.id(),
            language: Language::Foreign,
            input: src.id(),
            input_language: Language::Native,
        }
    );
    assert!(foreign_map.broadcast().is_err());
    assert!(foreign_map.partition_by(udf("route")).is_err());
    assert_eq!(foreign_map.partition(), builtin("RoundRobinPartition"));
}

#[test]
fn test_guard_sees_through_references() {
    let env = StreamExecutionEnvironment::new("guard-native");
    let src = env.foreign_source(udf("read"));
    let native_map = src.as_native::<i32>().map(|x| x * 2);

    let err = native_map.key_by(|x: &i32| *x).unwrap_err();
    assert!(matches!(
        err,
        GraphError::CrossLanguagePartition {
            input_language: Language::Foreign,
            ..
        }
    ));
    assert!(native_map.broadcast().is_err());
    assert!(native_map.partition_with(|_: &i32, _| vec![0]).is_err());
    assert_eq!(native_map.partition(), Partition::RoundRobin);

    let doubled = native_map.map(|x| x + 1);
    assert_eq!(doubled.language(), Language::Native);
}

#[test]
fn test_same_language_partition_after_bridge_succeeds() {
    let env = StreamExecutionEnvironment::new("bridge-ok");
    let src = env.from_iter(vec![1i32]);
    let mapped = src.as_foreign().map(udf("inc"));
    let again = mapped.map(udf("dec"));

    again.broadcast().unwrap();
    assert_eq!(again.partition(), builtin("BroadcastPartition"));
}

#[test]
fn test_keyed_stream_bridges_both_ways() {
    let env = StreamExecutionEnvironment::new("keyed-bridge");
    let keyed = env
        .from_iter(vec![("a".to_string(), 1i32)])
        .key_by(|(k, _): &(String, i32)| k.clone())
        .unwrap();
    let reduced = keyed.as_foreign().reduce(udf("sum"));
    let sink = reduced.sink(udf("write"));

    let graph = env.build_job_graph().unwrap();
    assert_eq!(graph.vertex_count(), 4);
    let edge = graph
        .edges()
        .iter()
        .find(|e| e.target_vertex_id == reduced.id())
        .unwrap();
    assert!(matches!(edge.partition, Partition::KeyBased(_)));
    assert_eq!(graph.upstream(sink.id()), vec![reduced.id()]);

    let foreign_keyed = env
        .foreign_source(udf("read"))
        .key_by(udf("first"))
        .unwrap();
    let native_keyed = foreign_keyed.as_native::<(String, i32), String>();
    assert_eq!(native_keyed.id(), foreign_keyed.id());
    assert_eq!(native_keyed.language(), Language::Native);
}

#[test]
fn test_foreign_union_consumes_inputs_in_order() {
    let env = StreamExecutionEnvironment::new("foreign-union");
    let a = env.foreign_source(udf("a"));
    let b = env.foreign_source(udf("b"));
    let c = env.foreign_source(udf("c"));
    let merged = a.union(&[&b, &c]);
    merged.sink(udf("write"));

    let graph = env.build_job_graph().unwrap();
    assert_eq!(graph.vertex_count(), 5);
    assert_eq!(graph.upstream(merged.id()), vec![a.id(), b.id(), c.id()]);
    assert_eq!(graph.vertex(merged.id()).unwrap().operator.name(), "Union");
}

#[test]
fn test_sink_behind_reference_is_compiled() {
    let env = StreamExecutionEnvironment::new("sink-ref");
    let src = env.foreign_source(udf("read"));
    let sink = src.as_native::<String>().sink(|_| {});

    let graph = env.build_job_graph().unwrap();
    assert_eq!(graph.sinks(), vec![sink.id()]);
    assert_eq!(graph.upstream(sink.id()), vec![src.id()]);
    assert_eq!(graph.edges()[0].partition, builtin("RoundRobinPartition"));
}

#[test]
fn test_repeated_bridging_still_compiles() {
    let env = StreamExecutionEnvironment::new("round-trips");
    let src = env.from_iter(vec![1i32, 2, 3]);
    let mut stream = src.clone();
    for _ in 0..100 {
        stream = stream.as_foreign().as_native::<i32>();
    }
    stream.set_parallelism(2).unwrap();
    let sink = stream.sink(|_| {});

    assert_eq!(stream.id(), src.id());
    let graph = env.build_job_graph().unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.vertex(src.id()).unwrap().parallelism, 2);
    assert_eq!(graph.upstream(sink.id()), vec![src.id()]);
}
