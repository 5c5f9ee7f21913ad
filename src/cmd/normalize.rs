//! Normalize command - slip CSV export to JSON records

use clap::Args;
use gensen::core::normalize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct NormalizeCommand {
    /// CSV export with a header row ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the JSON records (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl NormalizeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = if self.input.as_os_str() == "-" {
            let mut buffer = Vec::new();
            io::stdin().lock().read_to_end(&mut buffer)?;
            normalize::read_csv(buffer.as_slice())?
        } else {
            normalize::read_csv(BufReader::new(File::open(&self.input)?))?
        };

        match &self.output {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                normalize::write_json(&records, &mut writer)?;
                writer.flush()?;
                log::info!("Wrote {} records to {}", records.len(), path.display());
            }
            None => normalize::write_json(&records, io::stdout().lock())?,
        }
        Ok(())
    }
}
