//! Schema command - print expected input formats

use clap::Args;
use gensen::core::normalize::FLAG_SENTINEL;
use gensen::core::{CsvField, Record};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the normalized records
    JsonSchema,
    /// CSV header row with slip column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(Vec<Record>);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        println!("{}", csv_header(Record::csv_schema()));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("CSV Input Format");
        println!("================");
        println!();
        for field in Record::csv_schema() {
            let req = if field.required { "required" } else { "optional" };
            println!(
                "{:16} {:32} ({:8})  {}",
                field.column, field.key, req, field.description
            );
        }
        println!();
        println!("Empty cells mean \"not provided\" and skip the checks that need them.");
        println!("Amounts are whole yen without separators; flags are {FLAG_SENTINEL:?} or empty.");
        println!("Other columns (e.g. 氏名) are kept as text.");
        Ok(())
    }
}

fn csv_header(fields: &[CsvField]) -> String {
    fields
        .iter()
        .map(|f| f.column)
        .collect::<Vec<_>>()
        .join(",")
}
