//! Query command

use clap::Args;
use serde_json::{json, Value};

use crate::output::format_rows;
use crate::script;
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct QueryArgs {
    /// Query script, e.g. 'v(1).out("knows").take(2)'
    pub script: String,

    /// Keep running the query until it is exhausted, printing each batch
    #[arg(long)]
    pub chunks: bool,

    /// Stop after this many batches (with --chunks)
    #[arg(long, default_value = "1000")]
    pub max_batches: usize,
}

pub async fn run(args: &QueryArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let steps = script::parse(&args.script)?;
    tracing::debug!("Parsed {} steps from script", steps.len());

    let graph = ctx.load_graph().await?;
    let mut query = script::build(&graph, &steps);

    let mut batch_no = 0;
    loop {
        let rows: Vec<Value> = query
            .run()
            .iter()
            .enumerate()
            .map(|(i, out)| json!({"#": i + 1, "result": out.to_json()}))
            .collect();

        batch_no += 1;
        tracing::info!("Batch {} produced {} results", batch_no, rows.len());

        if rows.is_empty() {
            if batch_no == 1 {
                println!("No results");
            }
            break;
        }

        if args.chunks {
            println!("Batch {}:", batch_no);
        }
        println!("{}", format_rows(&rows, &["#", "result"], cli.output_format()));

        if !args.chunks || batch_no >= args.max_batches {
            break;
        }
    }

    Ok(())
}
