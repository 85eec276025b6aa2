use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use taskshift::config::CircleConfig;
use taskshift::{convert_config, report, writer};

/// Convert CircleCI configs into go-task Taskfiles for local development
#[derive(Parser)]
#[command(name = "taskshift", version)]
#[command(
    about = "Convert a CircleCI config into an orchestration-only config plus a Taskfile",
    long_about = None
)]
struct Cli {
    /// Input CircleCI config file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for generated files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    debug!("converting {}", cli.input.display());

    let config = CircleConfig::from_path(&cli.input)?;
    let job_count = config.jobs.len();

    let conversion = convert_config(&config)?;
    let usages = report::extract_all_commands(&config);
    let outputs = writer::write_outputs(
        &cli.output,
        &conversion.config,
        &conversion.taskfile,
        &usages,
    )?;

    println!("✅ Successfully converted CircleCI config!");
    println!("📋 Converted {job_count} jobs into tasks");
    println!("📁 Output files:");
    println!("   - {} (new CircleCI config)", outputs.config.display());
    println!("   - {} (go-task configuration)", outputs.taskfile.display());
    if let Some(report_path) = &outputs.report {
        println!("   - {} (technology analysis)", report_path.display());
    }
    println!();
    println!("🚀 Next steps:");
    println!("   1. Review generated files");
    println!(
        "   2. Test locally: cd {} && task <job-name>",
        cli.output.display()
    );
    println!("   3. Install go-task if needed: go install github.com/go-task/task/v3/cmd/task@latest");

    Ok(())
}
