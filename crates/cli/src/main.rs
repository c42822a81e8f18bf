//! `modev` command line driver.
//!
//! Runs the module event receiver processor over a source tree outside of a
//! Cargo build script:
//!
//! ```text
//! modev generate --src crates/auth/src --crate-name auth --out target/gen -O MODULE_NAME=auth
//! modev scan --src crates/auth/src --crate-name auth
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use modev_processor::{
	BuildContext, DiagnosticStyle, FsHost, ModuleEventReceiverProcessor, ProcessorConfig, RoundOutcome, TypeHandle,
	platform_line_separator, source,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "modev")]
#[command(about = "Discover module event receivers and generate their loader")]
struct Cli {
	#[command(subcommand)]
	command: Command,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Generate the module data loader.
	Generate {
		#[command(flatten)]
		source: SourceArgs,

		/// Directory the generated module is written into
		#[arg(short, long, value_name = "DIR")]
		out: PathBuf,

		/// Processor option, e.g. `MODULE_NAME=auth`
		#[arg(short = 'O', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
		options: Vec<(String, String)>,

		/// Line ending of the generated file
		#[arg(long, value_enum, default_value_t = LineEnding::Native)]
		line_ending: LineEnding,
	},
	/// List marked declarations and whether they implement the listener capability.
	Scan {
		#[command(flatten)]
		source: SourceArgs,
	},
}

#[derive(Args, Debug)]
struct SourceArgs {
	/// Crate source directory
	#[arg(short, long, value_name = "DIR", default_value = "src")]
	src: PathBuf,

	/// Crate name used as the root of qualified names
	#[arg(short, long, value_name = "NAME")]
	crate_name: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LineEnding {
	Native,
	Lf,
	Crlf,
}

impl LineEnding {
	fn separator(self) -> &'static str {
		match self {
			Self::Native => platform_line_separator(),
			Self::Lf => "\n",
			Self::Crlf => "\r\n",
		}
	}
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
	let (key, value) = raw
		.split_once('=')
		.ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
	if key.is_empty() {
		return Err(format!("empty option key in `{raw}`"));
	}
	Ok((key.to_owned(), value.to_owned()))
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match run(cli.command) {
		Ok(code) => code,
		Err(err) => {
			eprintln!("error: {err:#}");
			ExitCode::FAILURE
		}
	}
}

fn run(command: Command) -> Result<ExitCode> {
	match command {
		Command::Generate {
			source,
			out,
			options,
			line_ending,
		} => generate(source, out, options, line_ending),
		Command::Scan { source } => scan(source),
	}
}

fn generate(args: SourceArgs, out: PathBuf, options: Vec<(String, String)>, line_ending: LineEnding) -> Result<ExitCode> {
	let processor = ModuleEventReceiverProcessor::with_config(ProcessorConfig {
		line_separator: line_ending.separator().to_owned(),
		..ProcessorConfig::default()
	});

	let options = supported_options(options);
	let sources = source::load(&args.src, &args.crate_name, &processor.config().marker)
		.with_context(|| format!("failed to load sources from {}", args.src.display()))?;
	let mut host = FsHost::new(&out, sources.types, DiagnosticStyle::Log).with_options(options);

	// Diagnostics reach stderr through the host's tracing events.
	let outcome = processor.process_round(&mut host, &sources.round);

	match &outcome {
		RoundOutcome::Skipped => info!("no module event receivers found"),
		RoundOutcome::Generated(artifact) => {
			let path = host.artifact_path(&artifact.package, &artifact.type_name);
			println!("{}", path.display());
		}
		RoundOutcome::Aborted(_) | RoundOutcome::WriteFailed { .. } => {}
	}

	let failed = host.has_errors() || matches!(outcome, RoundOutcome::WriteFailed { .. });
	Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Drops `-O` keys the processor does not read, as the build script host does.
fn supported_options(options: Vec<(String, String)>) -> Vec<(String, String)> {
	options
		.into_iter()
		.filter(|(key, _)| {
			let supported = ModuleEventReceiverProcessor::supported_options().contains(&key.as_str());
			if !supported {
				debug!(key = %key, "ignoring unsupported processor option");
			}
			supported
		})
		.collect()
}

fn scan(args: SourceArgs) -> Result<ExitCode> {
	let config = ProcessorConfig::default();
	let sources = source::load(&args.src, &args.crate_name, &config.marker)
		.with_context(|| format!("failed to load sources from {}", args.src.display()))?;
	let host = FsHost::new(".", sources.types, DiagnosticStyle::Log);
	let capability = host
		.resolve_type(&config.capability)
		.unwrap_or_else(|| TypeHandle::new(&config.capability));

	let mut all_valid = true;
	for decl in modev_processor::scan::scan(&sources.round, &config.marker) {
		let args = decl.marker(&config.marker).cloned().unwrap_or_default();
		let valid = host.is_subtype(&decl.ty, &capability);
		all_valid &= valid;
		println!(
			"{}\tgroup={:?}\tpriority={}\tflag={}\t{}",
			decl.qualified_name,
			args.group,
			args.priority,
			args.flag,
			if valid { "ok" } else { "missing capability" }
		);
	}

	Ok(if all_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let default = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn cli_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn parses_generate_options() {
		let cli = Cli::try_parse_from([
			"modev", "generate", "--crate-name", "auth", "--out", "gen", "-O", "MODULE_NAME=auth", "--line-ending", "crlf",
		])
		.unwrap();
		let Command::Generate {
			source,
			options,
			line_ending,
			..
		} = cli.command
		else {
			panic!("expected generate");
		};
		assert_eq!(source.src, PathBuf::from("src"));
		assert_eq!(options, vec![("MODULE_NAME".to_owned(), "auth".to_owned())]);
		assert_eq!(line_ending.separator(), "\r\n");
	}

	#[test]
	fn unsupported_options_are_ignored() {
		let options = vec![
			("MODULE_NAME".to_owned(), "auth".to_owned()),
			("VERBOSE_LOADER".to_owned(), "1".to_owned()),
		];
		assert_eq!(
			supported_options(options),
			vec![("MODULE_NAME".to_owned(), "auth".to_owned())]
		);
	}

	#[test]
	fn option_values_may_contain_equals() {
		assert_eq!(parse_option("K=a=b").unwrap(), ("K".to_owned(), "a=b".to_owned()));
		assert!(parse_option("novalue").is_err());
		assert!(parse_option("=x").is_err());
	}
}
