mod commands;
mod config;
mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;
use termdict_api::WebApi;
use termdict_cache::CachedDefiner;
use tracing_subscriber::EnvFilter;

use commands::{Command, Context};
use config::{CacheBackend, Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "termdict", version, about = "A small dictionary tool for the command line")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Directory holding the vocab list, cache and config.json
    #[arg(long, env = "TERMDICT_HOME", global = true)]
    data_dir: Option<PathBuf>,
    /// Definition cache backend
    #[arg(long, value_enum, global = true)]
    cache: Option<CacheBackend>,
    /// Dictionary API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Request timeout for the dictionary API, in seconds (0 means the default)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Seed for random word selection (defaults to OS entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            data_dir: self.data_dir.clone(),
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs,
            cache: self.cache,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.global.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::resolve(&cli.global.overrides())?;
    tracing::debug!(?settings, "resolved settings");

    let stores = settings.open_stores()?;
    let api = WebApi::new(&settings.api_url, settings.timeout);
    let dict = CachedDefiner::new(stores.cache, api);

    let rng = match cli.global.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let stdout = io::stdout();
    let mut ctx = Context {
        out: stdout.lock(),
        vocab: &*stores.vocab,
        dict: &dict,
        rng,
    };
    ctx.execute(cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::ListAction;
    use output::OutputFormat;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_define_with_flags() {
        let cli = Cli::try_parse_from([
            "termdict", "define", "organic", "-o", "json", "--limit", "2", "--cache", "memory",
        ])
        .unwrap();
        assert_eq!(cli.global.cache, Some(CacheBackend::Memory));
        match cli.command {
            Command::Define(args) => {
                assert_eq!(args.word.as_deref(), Some("organic"));
                assert!(!args.random);
                assert_eq!(args.print.output, OutputFormat::Json);
                assert_eq!(args.print.limit, 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn define_needs_word_or_random() {
        assert!(Cli::try_parse_from(["termdict", "define"]).is_err());
        assert!(Cli::try_parse_from(["termdict", "define", "word", "--random"]).is_err());
        assert!(Cli::try_parse_from(["termdict", "define", "--random"]).is_ok());
    }

    #[test]
    fn add_requires_words() {
        assert!(Cli::try_parse_from(["termdict", "add"]).is_err());
        assert!(Cli::try_parse_from(["termdict", "list", "add"]).is_err());

        let cli = Cli::try_parse_from(["termdict", "list", "add", "omg", "-n"]).unwrap();
        match cli.command {
            Command::List {
                action: Some(ListAction::Add(args)),
            } => {
                assert_eq!(args.words, vec!["omg".to_string()]);
                assert!(args.no_check);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn run_against_temp_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from([
            "termdict", "--data-dir", data_dir, "add", "Serendipity", "--no-check",
        ])
        .unwrap();
        run(cli).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("vocab.json")).unwrap();
        assert_eq!(raw, r#"["serendipity"]"#);

        let cli = Cli::try_parse_from(["termdict", "--data-dir", data_dir, "remove", "serendipity"])
            .unwrap();
        run(cli).unwrap();
        let raw = std::fs::read_to_string(dir.path().join("vocab.json")).unwrap();
        assert_eq!(raw, "[]");
    }

    #[test]
    fn sqlite_backend_holds_vocab() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from([
            "termdict", "--data-dir", data_dir, "--cache", "sqlite", "add", "Petrichor", "-n",
        ])
        .unwrap();
        assert_eq!(cli.global.cache, Some(CacheBackend::Sqlite));
        run(cli).unwrap();

        assert!(dir.path().join("termdict.db").is_file());
        assert!(!dir.path().join("vocab.json").exists());

        let cli = Cli::try_parse_from([
            "termdict", "--data-dir", data_dir, "--cache", "sqlite", "remove", "petrichor",
        ])
        .unwrap();
        run(cli).unwrap();
    }
}
