use std::io::{self, Read};
use std::path::PathBuf;
use std::{env, fs, process};

use accumc::lexer::tokenize;
use accumc::{compile, parse};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: accumc [--tokens | --tree] [-o <output>] [file]";
/// Output name when the source comes from standard input.
const STDIN_OUTPUT: &str = "kb.asm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Compile,
    Tokens,
    Tree,
}

#[derive(Debug)]
struct Config {
    input: Option<PathBuf>,
    output: Option<String>,
    mode: Mode,
}

impl Config {
    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Config, String> {
        let mut config = Config { input: None, output: None, mode: Mode::Compile };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--tokens" => config.mode = Mode::Tokens,
                "--tree" => config.mode = Mode::Tree,
                "-o" => match args.next() {
                    Some(path) => config.output = Some(path),
                    None => return Err("-o needs a path".to_string()),
                },
                "-" => return Err("unexpected argument '-'".to_string()),
                flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
                _ if config.input.is_some() => return Err("too many input files".to_string()),
                _ => config.input = Some(PathBuf::from(&arg)),
            }
        }
        Ok(config)
    }

    /// `None` means standard output.
    fn output_path(&self) -> Option<PathBuf> {
        match (&self.output, &self.input) {
            (Some(out), _) if out == "-" => None,
            (Some(out), _) => Some(PathBuf::from(out)),
            (None, Some(input)) => {
                let stem = input.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
                Some(PathBuf::from(stem).with_extension("asm"))
            },
            (None, None) => Some(PathBuf::from(STDIN_OUTPUT)),
        }
    }
}

fn read_source(config: &Config) -> anyhow::Result<String> {
    match &config.input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {:?}", path)),
        None => {
            let mut src = String::new();
            io::stdin().read_to_string(&mut src).context("reading standard input")?;
            Ok(src)
        },
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let src = read_source(config)?;
    match config.mode {
        Mode::Tokens => {
            for token in tokenize(&src)? {
                println!("{}", token);
            }
        },
        Mode::Tree => print!("{}", parse(&src)?),
        Mode::Compile => {
            let compilation = compile(&src)?;
            for warning in compilation.warnings.iter() {
                eprintln!("warning: {}", warning);
            }
            let listing = compilation.asm.to_string();
            match config.output_path() {
                Some(path) => {
                    fs::write(&path, listing).with_context(|| format!("writing {:?}", path))?;
                    info!(output = %path.display(), "compiled");
                },
                None => print!("{}", listing),
            }
        },
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            process::exit(1);
        },
    };

    if let Err(err) = run(&config) {
        warn!("compilation aborted");
        eprintln!("{:#}", err);
        process::exit(1);
    }
}
