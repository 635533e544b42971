//! StreamPlan command line: compile a demo pipeline and print its job graph.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use streamplan_api::environment::StreamExecutionEnvironment;
use streamplan_core::config::JobConfig;
use streamplan_core::graph::JobGraph;
use streamplan_core::operator::FunctionDescriptor;
use streamplan_core::scheduler::JobScheduler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "streamplan")]
#[command(about = "StreamPlan job graph CLI", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a pipeline and print the resulting job graph.
    Plan {
        #[arg(long, value_enum, default_value_t = Pipeline::Wordcount)]
        pipeline: Pipeline,
        #[arg(long)]
        name: Option<String>,
        /// Job configuration entry `key=value`; may be repeated.
        #[arg(long = "conf", value_parser = parse_conf)]
        conf: Vec<(String, String)>,
        /// JSON object of job configuration entries.
        #[arg(long)]
        conf_file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Pipeline {
    /// Native word count: flat_map, key_by, reduce.
    Wordcount,
    /// One source feeding two sinks.
    Fanout,
    /// Native source handed to foreign operators and back.
    Bridge,
    /// Foreign sources merged by a union.
    Union,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
    Dot,
}

/// Prints the job graph instead of deploying it.
struct PrintScheduler {
    format: Format,
}

impl JobScheduler for PrintScheduler {
    fn schedule(&mut self, job_graph: &JobGraph) -> anyhow::Result<()> {
        match self.format {
            Format::Text => print_text(job_graph),
            Format::Json => {
                let json = serde_json::to_string_pretty(&job_graph.plan())?;
                println!("{json}");
            }
            Format::Dot => print!("{}", job_graph.digraph()),
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Plan {
            pipeline,
            name,
            conf,
            conf_file,
            format,
        } => {
            let mut job_config = match conf_file {
                Some(path) => load_config(&path)?,
                None => JobConfig::new(),
            };
            job_config.merge(conf.into_iter().collect());

            let job_name = name.unwrap_or_else(|| default_name(pipeline).to_string());
            let env = StreamExecutionEnvironment::new(&job_name).with_config(job_config);
            build_pipeline(&env, pipeline)?;

            let mut scheduler = PrintScheduler { format };
            env.execute(&mut scheduler)?;
        }
    }
    Ok(())
}

fn parse_conf(entry: &str) -> Result<(String, String), String> {
    JobConfig::parse_entry(entry).map_err(|e| e.to_string())
}

fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("config file {} is not a JSON object of strings", path.display()))
}

fn default_name(pipeline: Pipeline) -> &'static str {
    match pipeline {
        Pipeline::Wordcount => "wordcount",
        Pipeline::Fanout => "fanout",
        Pipeline::Bridge => "bridge",
        Pipeline::Union => "union",
    }
}

fn udf(name: &str) -> FunctionDescriptor {
    FunctionDescriptor::new("udfs", name)
}

fn build_pipeline(env: &StreamExecutionEnvironment, pipeline: Pipeline) -> anyhow::Result<()> {
    match pipeline {
        Pipeline::Wordcount => {
            env.from_iter(vec![
                "hello world".to_string(),
                "hello streamplan".to_string(),
            ])
            .flat_map(|line: String| {
                line.split_whitespace()
                    .map(|w| (w.to_string(), 1i64))
                    .collect::<Vec<_>>()
            })
            .key_by(|(word, _): &(String, i64)| word.clone())?
            .reduce(|(w, c1), (_, c2)| (w, c1 + c2))
            .sink(|pair| println!("{pair:?}"));
        }
        Pipeline::Fanout => {
            let numbers = env.from_iter(1..=10i64).map(|x| x * 2);
            numbers.set_parallelism(4)?;
            numbers.filter(|x| x % 3 == 0).sink(|x| println!("{x}"));
            numbers.broadcast()?.sink(|x| println!("{x}"));
        }
        Pipeline::Bridge => {
            let lines = env.from_iter(vec!["a,1".to_string(), "b,2".to_string()]);
            let parsed = lines
                .as_foreign()
                .map(udf("parse_csv"))
                .filter(udf("non_empty"))
                .key_by(udf("first_field"))?
                .reduce(udf("sum"));
            parsed
                .as_native::<(String, i64)>()
                .map(|(k, v)| format!("{k}={v}"))
                .sink(|line| println!("{line}"));
        }
        Pipeline::Union => {
            let a = env.foreign_source(udf("read_a"));
            let b = env.foreign_source(udf("read_b"));
            let c = env.foreign_source(udf("read_c"));
            a.union(&[&b, &c]).sink(udf("write"));
        }
    }
    Ok(())
}

fn print_text(job_graph: &JobGraph) {
    println!("job: {}", job_graph.job_name());
    for (key, value) in job_graph.job_config().iter() {
        println!("  conf {key}={value}");
    }
    println!("vertices:");
    for id in job_graph.topological_order() {
        if let Some(v) = job_graph.vertex(id) {
            println!(
                "  [{}] {} {} parallelism={}",
                v.vertex_id,
                v.vertex_type,
                v.operator.name(),
                v.parallelism
            );
        }
    }
    println!("edges:");
    for e in job_graph.edges() {
        println!(
            "  {} -> {} ({})",
            e.src_vertex_id, e.target_vertex_id, e.partition
        );
    }
}
