//! pdfmail - scheduled PDF merge and mail.

use clap::Parser;
use std::process;

use pdfmail::bootstrap::ensure_directories;
use pdfmail::cli::Cli;
use pdfmail::config::Config;
use pdfmail::context::{RunContext, SystemClock};
use pdfmail::error::PdfMailError;
use pdfmail::logging::{TracingLog, init_tracing};
use pdfmail::notify::SmtpMailer;
use pdfmail::output::{OutputFormatter, display_summary, summary_json};
use pdfmail::pipeline::Pipeline;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(err.exit_code());
        }
    }
}

/// Set up, execute one run, and report. Returns the process exit code.
async fn run(cli: Cli) -> Result<i32, PdfMailError> {
    let config = Config::load(&cli.config).await?;
    ensure_directories(&config.paths).await?;

    let log_file = config.paths.log_file();
    init_tracing(&log_file, cli.log_level(), cli.file_log_level())?;

    // JSON mode keeps stdout for the document alone.
    let formatter = OutputFormatter::new(cli.quiet || cli.json, cli.verbose);
    formatter.section(&format!("{} v{}", pdfmail::NAME, pdfmail::VERSION));
    formatter.detail("Config", &cli.config.display().to_string());
    formatter.detail("Source", &config.paths.source_folder.display().to_string());

    let mailer = SmtpMailer;
    let pipeline = Pipeline::new(&config, &mailer)?;
    let ctx = RunContext::new(&TracingLog, &SystemClock).with_dry_run(cli.dry_run);

    let summary = pipeline.run(&ctx).await;

    if cli.json {
        let json = summary_json(&summary).map_err(|e| PdfMailError::other(e.to_string()))?;
        println!("{json}");
    } else {
        display_summary(&formatter, &summary, &log_file);
    }

    Ok(summary.exit_code())
}
