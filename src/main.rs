use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tsuzuri::file::{expand_path, read_file, write_file};
use tsuzuri::input::{Command, CommandProcessor};
use tsuzuri::{logging, EditorConfig, EditorSession};

const USAGE: &str = "usage: tsuzuri <FILE> [--config PATH] [--log PATH] [--verbose] [--dry-run]";

/// コマンドライン引数
#[derive(Debug, Default)]
struct Options {
    file: Option<String>,
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
    verbose: bool,
    dry_run: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;
    let Some(file) = options.file.as_deref() else {
        bail!("{USAGE}");
    };

    let config = EditorConfig::load(options.config.as_deref()).context("loading configuration")?;
    let level = if options.verbose {
        log::LevelFilter::Debug
    } else {
        config.level_filter()
    };
    logging::init(level, options.log_file.clone().or_else(|| config.log_file.clone()));

    let path = expand_path(file)?;
    let text = if path.exists() {
        read_file(&path).with_context(|| format!("reading {}", path.display()))?
    } else {
        log::info!("{} does not exist, starting empty", path.display());
        String::new()
    };

    let mut session = EditorSession::with_config(&config);
    session.load_document(&text);

    let failures = replay(&mut session, io::stdin().lock())?;

    if session.is_modified() && !options.dry_run {
        write_file(&path, &session.current_text())
            .with_context(|| format!("writing {}", path.display()))?;
        session.mark_saved();
    }

    if failures > 0 {
        bail!("{failures} command(s) failed");
    }
    Ok(())
}

/// 標準入力のコマンドを順に実行し、失敗したコマンド数を返す
fn replay(session: &mut EditorSession, input: impl BufRead) -> Result<usize> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut processor = CommandProcessor::new();
    let mut failures = 0;

    for (number, line) in input.lines().enumerate() {
        let line = line.context("reading commands")?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("line {}: {}", number + 1, err);
                failures += 1;
                continue;
            }
        };

        match processor.execute(session, &command) {
            Ok(result) => {
                if let Some(output) = result.output {
                    writeln!(out, "{output}")?;
                }
            }
            Err(err) => {
                eprintln!("line {}: {}", number + 1, err);
                failures += 1;
            }
        }
    }

    Ok(failures)
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().context("--config requires a path")?;
                options.config = Some(expand_path(value)?);
            }
            "--log" => {
                let value = iter.next().context("--log requires a path")?;
                options.log_file = Some(expand_path(value)?);
            }
            "--verbose" | "-v" => options.verbose = true,
            "--dry-run" => options.dry_run = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
            file => {
                if options.file.is_some() {
                    bail!("only one file may be given\n{USAGE}");
                }
                options.file = Some(file.to_string());
            }
        }
    }

    Ok(options)
}
