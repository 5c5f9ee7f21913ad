use clap::{Parser, Subcommand};

mod cmd;
mod utils;

use cmd::{
    calc::CalcCommand, normalize::NormalizeCommand, records::RecordsCommand,
    schema::SchemaCommand, validate::ValidateCommand,
};

#[derive(Parser, Debug)]
#[command(
    name = "gensen",
    version,
    about = "Validate year-end withholding slip (源泉徴収票) data"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a slip CSV export into normalized JSON records
    Normalize(NormalizeCommand),
    /// Recompute derived amounts and report mismatches
    Validate(ValidateCommand),
    /// Show recorded and recomputed amounts for every record
    Records(RecordsCommand),
    /// Evaluate a single tax formula
    Calc(CalcCommand),
    /// Print the expected input format
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Normalize(cmd) => cmd.exec(),
        Command::Validate(cmd) => cmd.exec(),
        Command::Records(cmd) => cmd.exec(),
        Command::Calc(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
