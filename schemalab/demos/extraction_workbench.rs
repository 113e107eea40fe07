//! Extraction workbench example.
//!
//! Runs the default extractor against the sample input, edits the generator
//! schema, runs it again and prints both records with their cost.
//!
//! Run with a real model:
//! ```bash
//! OPENAI_API_KEY=your-key cargo run --example extraction_workbench
//! ```
//!
//! Without `OPENAI_API_KEY` a canned model answers instead.

use schemalab::models::{format_cost, BoxedModel, MockModel};
use schemalab::prelude::*;
use schemalab::GenerationStatus;
use serde_json::json;
use std::sync::Arc;

fn canned_model() -> MockModel {
    MockModel::new()
        .with_object_and_usage(
            json!({
                "summary": "Vercel is a frontend platform focused on speed and reliability.",
                "actionItems": []
            }),
            RequestUsage::with_tokens(96, 24),
        )
        .with_object_and_usage(
            json!({
                "company": "Vercel",
                "audience": "frontend developers",
                "sentiment": "positive"
            }),
            RequestUsage::with_tokens(88, 18),
        )
}

fn print_record(record: &GenerationRecord) {
    let reference = record.generation_reference.as_ref();
    println!(
        "record {} (input v{}, generator v{})",
        record.id,
        reference.map_or(0, |r| r.input_version),
        reference.map_or(0, |r| r.generator_version),
    );
    match record.status() {
        GenerationStatus::Succeeded { value } => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
        }
        GenerationStatus::Failed { error } => println!("failed: {error}"),
        GenerationStatus::Loading => println!("still loading"),
    }
    println!(
        "tokens: expected {} / actual {:?}, cost {}\n",
        record.token_usage.expected_input_tokens,
        record.token_usage.actual_input_tokens,
        format_cost(record.cost_info.display_cost()),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = WorkbenchConfig::from_env()?;
    let model: BoxedModel = match config.openai_model() {
        Ok(model) => Arc::new(model),
        Err(_) => {
            println!("OPENAI_API_KEY not set, using a canned model\n");
            Arc::new(canned_model())
        }
    };

    let workbench = Workbench::new(config).into_shared();
    let generator = workbench.read().generators()[0].id().clone();
    let orchestrator = Orchestrator::new(workbench.clone(), model);

    let first = orchestrator.generate(&generator).await?;

    workbench.write().import_schema(
        &generator,
        r#"z.object({
  company: z.string().describe("Company name"),
  audience: z.string().describe("Who the product is for"),
  sentiment: z.enum(["positive", "neutral", "negative"])
})"#,
    )?;
    let second = orchestrator.generate(&generator).await?;

    let wb = workbench.read();
    for id in [&first, &second] {
        if let Some(record) = wb.record(id) {
            print_record(record);
        }
    }
    println!("total spent: {}", format_cost(wb.total_spent()));

    Ok(())
}
