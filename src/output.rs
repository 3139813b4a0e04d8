use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::stats::CpuReport;

const COLUMNS: [&str; 6] = [
    "cpu",
    "threshold_ns",
    "hiccups",
    "pct99_ns",
    "pct999_ns",
    "max_ns",
];

/// Writes the per-CPU reports to stdout or a file in the specified format.
pub fn write_report(
    reports: &[CpuReport],
    format: &OutputFormat,
    output_file: Option<&Path>,
) -> io::Result<()> {
    match output_file {
        Some(path) => {
            let f = File::create(path)?;
            let mut out = BufWriter::new(f);
            format_report(reports, format, &mut out)?;
            out.flush()
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            format_report(reports, format, &mut out)?;
            out.flush()
        }
    }
}

fn format_report(reports: &[CpuReport], format: &OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    let sep = match format {
        OutputFormat::Table => " ",
        OutputFormat::Csv => ",",
    };

    writeln!(out, "{}", COLUMNS.join(sep))?;
    for r in reports {
        writeln!(
            out,
            "{cpu}{sep}{threshold}{sep}{count}{sep}{p99}{sep}{p999}{sep}{max}",
            cpu = r.cpu,
            threshold = r.threshold_ns,
            count = r.hiccups,
            p99 = r.pct99_ns,
            p999 = r.pct999_ns,
            max = r.max_ns,
            sep = sep,
        )?;
    }
    Ok(())
}
