//! RWB 命令行入口
//!
//! 读取一个HTML文件（或标准输入），为目标容器内的日文/拉丁文本插入换行机会，
//! 然后写出处理后的文档。

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rwb::core::{
    format_output_path, print_error_message, print_info_message, process_html, RwbError,
    RwbOptions,
};
use rwb::env::core::LogLevel;
use rwb::env::{generate_env_docs, EnvVar};
use rwb::word_break::{
    generate_example_config, ConfigManager, RunOutcome, ScriptTokenizer, Tokenizer,
    WordBreakConfig,
};

/// Insert word-level line break opportunities into Japanese/Latin HTML
#[derive(Parser, Debug)]
#[command(name = "rwb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// HTML file to process, `-` reads from stdin
    #[arg(required_unless_present_any = ["generate_config", "env_docs"])]
    input: Option<String>,

    /// Output file, `-` writes to stdout (default: out/<input file name>)
    #[arg(short, long)]
    output: Option<String>,

    /// Path to a TOML or JSON config file
    #[arg(short, long)]
    config: Option<String>,

    /// Force the input charset instead of detecting it
    #[arg(short, long)]
    encoding: Option<String>,

    /// Comma separated target container selectors
    #[arg(short, long = "selector")]
    selector: Option<String>,

    /// Number of text units per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Overall processing budget in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Only log errors
    #[arg(short = 'q', long)]
    silent: bool,

    /// Write an example config file and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<String>,

    /// Print the supported environment variables and exit
    #[arg(long)]
    env_docs: bool,
}

fn init_tracing(silent: bool) {
    let filter = if silent {
        EnvFilter::new("error")
    } else {
        match LogLevel::get_set() {
            Some(Ok(level)) => EnvFilter::new(level),
            Some(Err(e)) => {
                print_error_message(&e.to_string());
                EnvFilter::new("info")
            }
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&str>) -> Result<WordBreakConfig, RwbError> {
    let manager = match path {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.into_config())
}

fn read_input(input: &str) -> Result<Vec<u8>, RwbError> {
    let mut data = Vec::new();
    if input == "-" {
        io::stdin()
            .read_to_end(&mut data)
            .map_err(|e| RwbError::new(&format!("Failed to read stdin: {e}")))?;
    } else {
        data = fs::read(input)
            .map_err(|e| RwbError::new(&format!("Failed to read file {input}: {e}")))?;
    }
    Ok(data)
}

fn write_output(output: &str, data: &[u8]) -> Result<(), RwbError> {
    if output == "-" {
        let mut stdout = io::stdout();
        stdout
            .write_all(data)
            .and_then(|_| stdout.flush())
            .map_err(|e| RwbError::new(&format!("Failed to write stdout: {e}")))?;
        return Ok(());
    }

    let path = PathBuf::from(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| RwbError::new(&format!("Failed to create {}: {e}", parent.display())))?;
    }
    fs::write(&path, data)
        .map_err(|e| RwbError::new(&format!("Failed to write {}: {e}", path.display())))
}

fn run(cli: Cli) -> Result<(), RwbError> {
    if cli.env_docs {
        print_info_message(&generate_env_docs());
        return Ok(());
    }

    if let Some(path) = &cli.generate_config {
        generate_example_config(path)?;
        print_info_message(&format!("Example config written to {path}"));
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .ok_or_else(|| RwbError::new("No input file given"))?;

    let options = RwbOptions {
        encoding: cli.encoding.clone(),
        target_selectors: cli.selector.clone(),
        batch_size: cli.batch_size,
        timeout_ms: cli.timeout_ms,
        silent: cli.silent,
    };

    let mut config = load_config(cli.config.as_deref())?;
    options.apply(&mut config);

    let data = read_input(&input)?;
    let tokenizer: Rc<dyn Tokenizer> = Rc::new(ScriptTokenizer::new()?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| RwbError::new(&format!("Failed to start runtime: {e}")))?;
    let (document, summary) = runtime.block_on(process_html(
        &data,
        options.encoding.as_deref(),
        config,
        tokenizer,
    ))?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| format_output_path(&input).to_string_lossy().into_owned());
    write_output(&output, &document)?;

    if summary.outcome == RunOutcome::TimedOut {
        print_error_message(&format!(
            "Timed out after {}/{} text units",
            summary.completed, summary.total
        ));
    }

    if !options.silent && output != "-" {
        print_info_message(&format!(
            "{} text units processed, {} skipped, written to {}",
            summary.processed,
            summary.skipped_detached + summary.skipped_oversize + summary.failed,
            output
        ));
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.silent);

    if let Err(e) = run(cli) {
        print_error_message(&e.to_string());
        process::exit(1);
    }
}
