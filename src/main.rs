use anyhow::{bail, Context};
use ballsim::generate::{random_scenario, GenerateParams};
use ballsim::render::{AsciiRenderer, Renderer, TraceRenderer};
use ballsim::scenario::{FinalState, Scenario};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  ballsim run <FILE> [--json] [--draw COLSxROWS] [--trace] [--verbose]
  ballsim generate <COUNT> <WIDTH> <DURATION> [--radius R] [--mass M] [--speed S] [--seed N]

Log filtering follows RUST_LOG (default: warn).";

#[derive(Debug)]
struct RunOptions {
    input: PathBuf,
    json: bool,
    draw: Option<(usize, usize)>,
    trace: bool,
}

#[derive(Debug)]
enum Command {
    Run(RunOptions),
    Generate(GenerateParams),
    Help,
}

#[derive(Debug)]
struct Options {
    command: Command,
    verbose: bool,
}

fn parse_value<T: std::str::FromStr>(flag: &str, raw: Option<String>) -> anyhow::Result<T> {
    let raw = raw.with_context(|| format!("{flag} needs a value"))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid value `{raw}` for {flag}"))
}

fn parse_grid(raw: &str) -> anyhow::Result<(usize, usize)> {
    let (c, r) = raw
        .split_once(['x', 'X'])
        .with_context(|| format!("grid `{raw}` must look like COLSxROWS"))?;
    Ok((c.parse()?, r.parse()?))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Options> {
    let mut args = args.into_iter();
    let mut verbose = false;
    let mut positional = Vec::new();
    let mut json = false;
    let mut trace = false;
    let mut draw = None;
    let mut gen = GenerateParams::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(Options {
                    command: Command::Help,
                    verbose,
                })
            }
            "-v" | "--verbose" => verbose = true,
            "--json" => json = true,
            "--trace" => trace = true,
            "--draw" => draw = Some(parse_grid(&parse_value::<String>("--draw", args.next())?)?),
            "--radius" => gen.radius = parse_value("--radius", args.next())?,
            "--mass" => gen.mass = parse_value("--mass", args.next())?,
            "--speed" => gen.speed = parse_value("--speed", args.next())?,
            "--seed" => gen.seed = Some(parse_value("--seed", args.next())?),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("run") => {
            let input = positional.next().context("run needs an input file")?;
            Command::Run(RunOptions {
                input: PathBuf::from(input),
                json,
                draw,
                trace,
            })
        }
        Some("generate") => {
            gen.count = parse_value("COUNT", positional.next())?;
            gen.width = parse_value("WIDTH", positional.next())?;
            gen.duration = parse_value("DURATION", positional.next())?;
            Command::Generate(gen)
        }
        Some(other) => bail!("unknown command `{other}`"),
        None => bail!("missing command"),
    };
    if let Some(extra) = positional.next() {
        bail!("unexpected argument `{extra}`");
    }
    Ok(Options { command, verbose })
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(opts: RunOptions) -> anyhow::Result<()> {
    let scenario = Scenario::from_path(&opts.input)
        .with_context(|| format!("failed to load {}", opts.input.display()))?;
    let mut sim = scenario
        .into_simulation()
        .context("invalid initial state")?;

    if opts.trace {
        let mut tracer = TraceRenderer::new();
        sim.run_with(&mut tracer)?;
    } else {
        sim.run()?;
    }

    let report = FinalState::capture(&sim);
    if opts.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    if let Some((cols, rows)) = opts.draw {
        let mut ascii = AsciiRenderer::new(cols, rows);
        ascii.draw(&sim.frame());
        if let Some(out) = ascii.output() {
            eprint!("{out}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    init_logging(opts.verbose);

    let result = match opts.command {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Run(run_opts) => run(run_opts),
        Command::Generate(params) => random_scenario(&params)
            .map(|s| print!("{s}"))
            .map_err(anyhow::Error::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
