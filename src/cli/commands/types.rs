//! Types command - list the records a schema defines

use crate::cli::args::{OutputFormat, TypesArgs};
use crate::config::Config;
use crate::error::ConvcacheResult;
use crate::types::{RecordDef, Schema};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the types command
pub async fn execute(args: TypesArgs, _config: &Config) -> ConvcacheResult<()> {
    let schema = Schema::load(&args.schema).await?;
    let records = schema.records();

    if records.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No record types defined");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(records),
        OutputFormat::Json => print_json(records)?,
        OutputFormat::Plain => print_plain(records),
    }

    Ok(())
}

fn print_table(records: &[RecordDef]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Record types");

    println!(
        "{:<20} {:<12} {:<12} {:<40}",
        style("NAME").bold(),
        style("TAG").bold(),
        style("FORM").bold(),
        style("FIELDS").bold()
    );
    println!("{}", "-".repeat(84));

    for record in records {
        let tag = record.tag.as_deref().unwrap_or("-");
        let form = if record.positional {
            style("positional").cyan()
        } else {
            style("object").dim()
        };
        let fields = record
            .fields
            .iter()
            .map(|field| {
                let marker = if field.is_required() { "" } else { "?" };
                format!("{}{}: {}", field.name, marker, field.ty)
            })
            .collect::<Vec<_>>()
            .join(", ");

        println!("{:<20} {:<12} {:<12} {:<40}", record.name, tag, form, fields);
    }

    println!();
    println!("{} type(s)", records.len());
}

fn print_json(records: &[RecordDef]) -> ConvcacheResult<()> {
    let json = serde_json::to_string_pretty(records)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(records: &[RecordDef]) {
    for record in records {
        println!("{}", record.name);
    }
}
