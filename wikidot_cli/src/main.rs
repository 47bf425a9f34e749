use std::io::Read;
use std::io::Write;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wikidot_cli::WikidotCli;
use wikidot_core::AnyResult;
use wikidot_core::WikidotConfig;
use wikidot_core::WikidotError;
use wikidot_core::to_html;

fn main() {
	let args = WikidotCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if let Err(e) = run(&args) {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<WikidotError>() {
			Ok(error) => {
				let report: miette::Report = (*error).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("error: {e}");
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn run(args: &WikidotCli) -> AnyResult<()> {
	let input = read_input(args)?;
	let config = load_config(args)?;

	tracing::debug!(
		input = %args.input.as_ref().map_or("<stdin>".into(), |path| path.display().to_string()),
		lines = input.lines().count(),
		"converting"
	);

	// Compile fully before touching the output so failures leave nothing
	// behind.
	let html = to_html(&input, &config)?;

	match &args.output {
		Some(path) => std::fs::write(path, html).map_err(WikidotError::from)?,
		None => {
			let mut stdout = std::io::stdout().lock();
			stdout
				.write_all(html.as_bytes())
				.and_then(|()| stdout.flush())
				.map_err(WikidotError::from)?;
		}
	}

	Ok(())
}

fn read_input(args: &WikidotCli) -> AnyResult<String> {
	if let Some(path) = args.input.as_ref().filter(|_| !args.reads_stdin()) {
		let input = std::fs::read_to_string(path)
			.map_err(|e| format!("failed to read {}: {e}", path.display()))?;
		return Ok(input);
	}

	let mut input = String::new();
	std::io::stdin()
		.read_to_string(&mut input)
		.map_err(WikidotError::from)?;

	Ok(input)
}

fn load_config(args: &WikidotCli) -> AnyResult<WikidotConfig> {
	let config = if let Some(path) = &args.config {
		WikidotConfig::from_path(path)?
	} else {
		let root = match &args.path {
			Some(path) => path.clone(),
			None => std::env::current_dir()?,
		};
		WikidotConfig::load(&root)?.unwrap_or_default()
	};

	Ok(args.apply_overrides(config))
}
