pub fn write_csv<I, R, W>(records: I, writer: W) -> anyhow::Result<()>
where
    I: IntoIterator<Item = R>,
    R: serde::Serialize,
    W: std::io::Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records.into_iter() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Format a yen amount with thousands separators, e.g. `-1,234,500`.
pub fn format_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
