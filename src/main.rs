//! tfapply CLI entrypoint.
//!
//! This is the main entrypoint for the tfapply command-line tool.

use std::io::Read;
use std::process::ExitCode;

use tfapply::cli::{Cli, OutputFormatter};
use tfapply::error::Result;
use tfapply::reconciler::ReconciliationController;
use tfapply::rules::{CompiledRuleSet, RulesParser};
use tfapply::runner::{CommandBuilder, PlanRunner, TerraformCli};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    // Load and compile the approval rules before touching any plan.
    let rules = RulesParser::new().load_file(&cli.approve)?;
    let compiled = CompiledRuleSet::compile(&rules)?;

    let builder = CommandBuilder::new().with_binary(&cli.binary);
    let mut runner = TerraformCli::new().with_timeout_secs(cli.timeout_secs);
    if let Some(dir) = &cli.chdir {
        runner = runner.with_working_dir(dir);
    }

    let plan_text = read_plan_text(&cli, &runner, &builder).await?;

    let controller = ReconciliationController::new(&compiled, &runner)
        .with_builder(builder)
        .with_apply_enabled(cli.apply);

    let outcome = controller.run(&plan_text).await?;

    eprintln!("{}", formatter.format_outcome(&outcome));
    Ok(())
}

/// Obtains the raw plan text from a file, a fresh plan run, or stdin.
async fn read_plan_text(cli: &Cli, runner: &TerraformCli, builder: &CommandBuilder) -> Result<String> {
    if let Some(path) = &cli.plan {
        debug!("Reading plan from: {}", path.display());
        return Ok(std::fs::read_to_string(path)?);
    }

    if cli.run_plan {
        let command = builder.full_plan_command();
        info!("Obtaining plan: $ {command}");
        let output = runner.run(&command).await?;
        return Ok(output.stdout);
    }

    debug!("Reading plan from stdin");
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}
