use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, trace};

use spark_executor::config::{ConfigLoader, ExecutorConfig};
use spark_executor::spark::{CommandResult, ExecuteRequest, LoadData, SparkSqlExecutor};
use spark_executor::subprocess::SubprocessManager;

/// Run spark-sql and spark-submit with managed settings
#[derive(Parser)]
#[command(name = "spark-executor")]
#[command(about = "Run spark-sql and spark-submit with managed settings", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./spark-executor.toml if present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run SQL through spark-sql
    Sql {
        #[command(flatten)]
        exec: ExecArgs,

        /// Print result rows without client chatter
        #[arg(long)]
        rows: bool,
    },
    /// Run through spark-submit
    Submit {
        #[command(flatten)]
        exec: ExecArgs,
    },
    /// Load files into a table with spark-sql
    Load {
        /// File or directory to load
        #[arg(long)]
        path: String,

        /// Target database
        #[arg(long)]
        database: String,

        /// Target table
        #[arg(long)]
        table: String,

        /// Partition value as key=value (repeatable)
        #[arg(long = "partition", value_parser = parse_partition)]
        partitions: Vec<(String, String)>,

        /// Read from the cluster filesystem instead of the local one
        #[arg(long)]
        no_local: bool,

        /// Append instead of overwriting existing data
        #[arg(long)]
        no_overwrite: bool,
    },
}

#[derive(Args)]
struct ExecArgs {
    /// Inline SQL
    #[arg(short = 'e', long)]
    sql: Option<String>,

    /// SQL file to run
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Initialization SQL file
    #[arg(short = 'i', long)]
    init_file: Option<PathBuf>,

    /// Redirect client stdout to this file (inline SQL only)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Redirect client stderr to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Show client stderr while it runs
    #[arg(long)]
    print_stderr: bool,

    /// Print the command line instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Print the captured result as JSON
    #[arg(long)]
    json: bool,
}

impl ExecArgs {
    fn request(&self) -> ExecuteRequest {
        ExecuteRequest {
            init_sql_file: self.init_file.clone(),
            sql_file: self.file.clone(),
            sql: self.sql.clone(),
            output_file: self.output.clone(),
            log_file: self.log_file.clone(),
            print_stderr: self.print_stderr,
        }
    }
}

fn parse_partition(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err(format!("expected key=value, got '{value}'")),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("spark-executor started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    match run(cli).await {
        Ok(status) => std::process::exit(status),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ExecutorConfig> {
    let mut config = ConfigLoader::new().load(path.map(PathBuf::as_path)).await?;
    config.merge_env_vars();
    Ok(config)
}

/// Returns the exit status to report.
async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = load_config(cli.config.as_ref()).await?;
    let runner = SubprocessManager::production().runner();

    match cli.command {
        Commands::Sql { exec, rows } => {
            let executor = config
                .sql_executor(runner)
                .context("Failed to set up spark-sql")?;
            let request = exec.request();

            if exec.dry_run {
                println!("{}", executor.command_line(&request)?);
                return Ok(0);
            }

            let result = executor.execute(&request).await?;
            if rows && !exec.json {
                for row in SparkSqlExecutor::result_rows(result.stdout()) {
                    println!("{row}");
                }
                report_failure(&result, &exec);
                Ok(result.status())
            } else {
                report(&result, &exec)
            }
        }
        Commands::Submit { exec } => {
            let executor = config
                .submit_executor(runner)
                .context("Failed to set up spark-submit")?;
            let request = exec.request();

            if exec.dry_run {
                println!("{}", executor.command_line(&request)?);
                return Ok(0);
            }

            let result = executor.execute(&request).await?;
            report(&result, &exec)
        }
        Commands::Load {
            path,
            database,
            table,
            partitions,
            no_local,
            no_overwrite,
        } => {
            let executor = config
                .sql_executor(runner)
                .context("Failed to set up spark-sql")?;
            let load = LoadData::new(path, database, table)
                .partitions(partitions)
                .local(!no_local)
                .overwrite(!no_overwrite);

            executor.load_data(&load).await?;
            println!("Loaded into {}.{}", load.database, load.table);
            Ok(0)
        }
    }
}

fn report(result: &CommandResult, exec: &ExecArgs) -> anyhow::Result<i32> {
    if exec.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", result.stdout());
        report_failure(result, exec);
    }
    Ok(result.status())
}

fn report_failure(result: &CommandResult, exec: &ExecArgs) {
    // Already shown while running when --print-stderr is set
    if !result.success() && !exec.print_stderr && !result.stderr().is_empty() {
        eprint!("{}", result.stderr());
    }
}
