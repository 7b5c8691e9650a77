//! Self-serving bias simulator CLI
//!
//! Run predefined attribution experiments or assemble one interactively.

use clap::Parser;
use cogsim_sim::interactive::{build_experiment, Prompter};
use cogsim_sim::scenarios::{default_defaults, default_participant, DEFAULT_SAMPLE_BUDGET};
use cogsim_sim::{ExperimentId, ExperimentReport, ExperimentRunner, RunConfig, SeedProvider, SimError, VariableLibrary};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Self-serving attribution bias simulator
#[derive(Parser, Debug)]
#[command(name = "cogsim")]
#[command(about = "Simulate self-serving attribution bias experiments", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Experiment to run (dual_process, task_importance, cognitive_load, self_worth, self_awareness_bias, all)
    #[arg(short, long, default_value = "all")]
    experiment: String,

    /// Directory for charts and JSON results
    #[arg(short, long, default_value = "plots")]
    output_dir: PathBuf,

    /// Override the number of inference repetitions (L)
    #[arg(long)]
    samples: Option<usize>,

    /// Override the number of participants per condition
    #[arg(short, long)]
    participants: Option<usize>,

    /// Build an experiment interactively instead
    #[arg(short, long)]
    interactive: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let seed = if args.seed == 0 {
        SeedProvider::from_clock().master_seed()
    } else {
        args.seed
    };

    let mut config = RunConfig::default()
        .with_seed(seed)
        .with_output_dir(&args.output_dir);
    if let Some(samples) = args.samples {
        config = config.with_sample_budget(samples);
    }
    if let Some(participants) = args.participants {
        config = config.with_participants(participants);
    }
    let runner = ExperimentRunner::new(config);

    if !args.json {
        info!("Self-serving bias simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let mut reports = Vec::new();
    if args.interactive {
        if let Some(report) = run_interactive(&runner)? {
            reports.push(report);
        }
    } else {
        let experiments: Vec<ExperimentId> = if args.experiment == "all" {
            ExperimentId::all()
        } else {
            vec![args
                .experiment
                .parse()
                .map_err(|_| SimError::UnknownExperiment(args.experiment.clone()))?]
        };

        for id in experiments {
            info!("▶ {} ({}) seed={}", id.title(), id.description(), seed);
            reports.push(runner.run(id.build()?)?);
        }
    }

    if args.json {
        let summary = serde_json::json!({
            "seed": seed,
            "experiments": reports.iter().map(|r| {
                serde_json::json!({
                    "experiment": r.results.experiment,
                    "summary": r.summary,
                    "files": r.files,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("✅ {} experiment(s) completed", reports.len());
    }
    Ok(())
}

fn run_interactive(runner: &ExperimentRunner) -> Result<Option<ExperimentReport>, SimError> {
    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
    prompter.say("This is an interactive guide to setting up and running an experiment")?;

    let library = VariableLibrary::standard()?;
    let experiment = build_experiment(
        &mut prompter,
        &library,
        default_participant(),
        default_defaults(DEFAULT_SAMPLE_BUDGET)?,
    )?;
    prompter.say(&experiment.summary())?;

    if prompter.confirm("Do you want to run the experiment [y/n]: ")? {
        Ok(Some(runner.run(experiment)?))
    } else {
        Ok(None)
    }
}
