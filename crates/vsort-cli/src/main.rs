//! vsort: read newline-delimited integers and print them in sorted order.
//!
//! A thin demonstration harness for `vsort_operators::sort::SortOperator`:
//! wraps the input in a `VecUpstream`, wires up a `DefaultRuntimeState` and a
//! memory-bounded budget, and drains the operator to stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use vsort_core::block::{Block, ColumnData};
use vsort_core::schema::{DataType, Field, Schema};
use vsort_core::types::Scalar;
use vsort_exec::{DefaultRuntimeState, ExecConfig, VecUpstream};
use vsort_mem::MemoryBudgetImpl;
use vsort_operators::sort::{SortConfig, SortOperator};

#[derive(Parser)]
#[command(name = "vsort")]
#[command(about = "Sort a stream of integers with the vectorized sort operator", long_about = None)]
struct Cli {
    /// Input file; reads stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Sort descending instead of ascending.
    #[arg(long)]
    desc: bool,

    /// Skip this many rows of the final ordering.
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Emit at most this many rows after `offset` (Top-N mode).
    #[arg(long)]
    limit: Option<usize>,

    /// Rows buffered per run before a partial sort is flushed.
    #[arg(long)]
    run_row_threshold: Option<usize>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let values = read_values(cli.input.as_deref())?;

    let schema = Schema::new(vec![Field::new("value", DataType::Int64, false)]);
    let block = Block::from_columns(vec![ColumnData {
        name: "value".into(),
        values: values.into_iter().map(Scalar::I64).collect(),
    }])?;

    let exec_config = ExecConfig::from_env();
    let upstream = VecUpstream::new(schema, vec![block]);
    let budget = MemoryBudgetImpl::new(exec_config.mem_cap_bytes);

    let mut config = SortConfig {
        offset: cli.offset,
        limit: cli.limit,
        is_asc_order: vec![!cli.desc],
        nulls_first: vec![false],
        ..SortConfig::default()
    };
    if let Some(threshold) = cli.run_row_threshold {
        config.run_row_threshold = threshold;
    }

    let mut operator = SortOperator::new(upstream, budget, config, vec![0], None);
    let runtime = DefaultRuntimeState::new(exec_config.batch_size);

    operator.open(&runtime)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    while let Some(batch) = operator.next(&runtime)? {
        for row in 0..batch.num_rows() {
            if let Scalar::I64(v) = batch.value(0, row) {
                writeln!(out, "{v}")?;
            }
        }
    }

    Ok(())
}

fn read_values(input: Option<&std::path::Path>) -> Result<Vec<i64>, Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(io::BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(io::BufReader::new(io::stdin())),
    };

    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        values.push(line.parse::<i64>()?);
    }
    Ok(values)
}
