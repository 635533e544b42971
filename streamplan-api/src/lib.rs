//! # StreamPlan API
//!
//! User-facing DataStream API for describing stream processing pipelines and
//! compiling them into job graphs.
//!
//! ## Quick Start
//!
//! ```rust
//! use streamplan_api::environment::StreamExecutionEnvironment;
//!
//! let env = StreamExecutionEnvironment::new("wordcount");
//! env.from_iter(vec!["hello world".to_string(), "hello streamplan".to_string()])
//!     .flat_map(|line: String| {
//!         line.split_whitespace()
//!             .map(|w| (w.to_string(), 1i32))
//!             .collect::<Vec<_>>()
//!     })
//!     .key_by(|(w, _): &(String, i32)| w.clone())
//!     .unwrap()
//!     .reduce(|(w, c1), (_, c2)| (w, c1 + c2))
//!     .sink(|pair| println!("{pair:?}"));
//!
//! let job_graph = env.build_job_graph().unwrap();
//! assert_eq!(job_graph.vertex_count(), 5);
//! ```
//!
//! - [`environment`]: [`StreamExecutionEnvironment`](environment::StreamExecutionEnvironment),
//!   entry point for sources, compilation and execution.
//! - [`datastream`]: [`DataStream`](datastream::DataStream),
//!   [`KeyedStream`](datastream::KeyedStream) and
//!   [`DataStreamSink`](datastream::DataStreamSink): the native fluent API.
//! - [`foreign`]: [`ForeignStream`](foreign::ForeignStream) and friends, the
//!   same API over foreign function descriptors.
//! - [`function`]: typed bodies stored in native operators.

pub mod datastream;
pub mod environment;
pub mod foreign;
pub mod function;

pub use streamplan_core;
