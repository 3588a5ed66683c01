use clap::{Parser, Subcommand};
use depmap::{AnalysisSession, Config, DiffParser, Reporter, ServiceClient};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "depmap")]
#[command(about = "Source-level dependency graph and change impact analysis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project directory and build its dependency graph
    Analyze {
        /// Target directory to analyze
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for reports
        #[arg(short, long, default_value = "./depmap-output")]
        output: PathBuf,

        /// Send the dependency graph to the analysis service
        #[arg(long)]
        send: bool,
    },
    /// Show which files are impacted by a change to FILE
    Impact {
        /// Changed file (absolute or repository-relative path)
        file: String,

        /// Target directory to analyze
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Parse uncommitted changes and report which files they impact
    Diff {
        /// Target directory (a git repository)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for reports
        #[arg(short, long, default_value = "./depmap-output")]
        output: PathBuf,

        /// Send the change notification to the analysis service
        #[arg(long)]
        send: bool,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the config file (defaults to ~/.depmap.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            config,
            output,
            send,
        } => {
            analyze(path, config, output, send).await?;
        }
        Commands::Impact { file, path, config } => {
            impact(file, path, config)?;
        }
        Commands::Diff {
            path,
            config,
            output,
            send,
        } => {
            diff(path, config, output, send).await?;
        }
        Commands::Config { output } => {
            generate_config(output)?;
        }
    }

    Ok(())
}

fn load_config(target_path: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = config_path {
        Config::from_file(&config_path)?
    } else {
        Config::load()?
    };
    config.target_directory = target_path;
    Ok(config)
}

async fn analyze(
    target_path: PathBuf,
    config_path: Option<PathBuf>,
    output_path: PathBuf,
    send: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let config = load_config(target_path.clone(), config_path)?;

    println!("Analyzing {}", target_path.display());

    let session = AnalysisSession::new(config.clone())?;
    let run = session.analyze()?;

    let stats = run.graph.statistics();
    stats.print_summary();

    if !run.skipped_files.is_empty() {
        println!("Skipped {} unreadable files", run.skipped_files.len());
    }

    // Correlate any uncommitted changes against the fresh graph so the
    // report carries their impact sets. Not being in a git repository is
    // fine; the report simply has no impact section.
    let impacts = match depmap::git::uncommitted_diff(&target_path) {
        Ok(diff_text) if !diff_text.trim().is_empty() => {
            let changed_files = DiffParser::new()?.parse(&diff_text);
            run.impact_of_changes(&changed_files)
        }
        _ => Vec::new(),
    };

    let reporter = Reporter::new();
    let report = reporter.generate_report(&run, impacts);
    let exported = reporter.export_report(&report, &output_path)?;

    if send || config.analysis.auto_send {
        let client = ServiceClient::new(config.transport.clone())?;
        let payload = run.graph.snapshot(&run.project_name);
        match client.send_dependency_graph(&payload).await {
            Ok(()) => println!("Dependency graph sent to {}", config.transport.base_url),
            Err(e) => eprintln!("Failed to send dependency graph: {}", e),
        }
    }

    println!("Analysis completed in {:.2}s", start_time.elapsed().as_secs_f64());
    for file in exported {
        println!("  - {}", file.display());
    }

    Ok(())
}

fn impact(file: String, target_path: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(target_path, config_path)?;

    let session = AnalysisSession::new(config)?;
    let run = session.analyze()?;

    let affected = run.impact_of(&file);
    if affected.is_empty() {
        println!("No project files depend on {}", file);
    } else {
        println!("Files affected by a change to {}:", file);
        for path in affected {
            println!("  - {}", path);
        }
    }

    Ok(())
}

async fn diff(
    target_path: PathBuf,
    config_path: Option<PathBuf>,
    output_path: PathBuf,
    send: bool,
) -> anyhow::Result<()> {
    let config = load_config(target_path.clone(), config_path)?;

    let diff_text = depmap::git::uncommitted_diff(&target_path)?;
    if diff_text.trim().is_empty() {
        println!("No uncommitted changes found");
        return Ok(());
    }

    let parser = DiffParser::new()?;
    let changed_files = parser.parse(&diff_text);

    let session = AnalysisSession::new(config.clone())?;
    let run = session.analyze()?;
    let impacts = run.impact_of_changes(&changed_files);

    println!("{} changed files:", changed_files.len());
    for (file, impact) in changed_files.iter().zip(&impacts) {
        println!(
            "  {} ({}) +{} -{}",
            file.path, file.status, file.additions, file.deletions
        );
        for affected in &impact.affected_files {
            println!("    impacts {}", affected);
        }
    }

    let reporter = Reporter::new();
    let report = reporter.generate_report(&run, impacts);
    let exported = reporter.export_report(&report, &output_path)?;
    for file in exported {
        println!("  - {}", file.display());
    }

    if send {
        let graph = config
            .analysis
            .include_graph_in_diff
            .then(|| run.graph.snapshot(&run.project_name));

        let client = ServiceClient::new(config.transport.clone())?;
        let notification =
            client.build_notification(&run.project_name, &diff_text, changed_files, graph);
        match client.send_change_notification(&notification).await {
            Ok(()) => println!("Change notification sent to {}", config.transport.base_url),
            Err(e) => eprintln!("Failed to send change notification: {}", e),
        }
    }

    Ok(())
}

fn generate_config(output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = output_path.unwrap_or_else(|| {
        Config::default_config_path().unwrap_or_else(|_| PathBuf::from("depmap.toml"))
    });

    println!("Generating configuration file: {}", config_path.display());
    std::fs::write(&config_path, Config::create_documented_config())?;
    println!("Configuration file created. Edit it to customize analysis settings.");

    Ok(())
}
