use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use cloakweave::{
    config::{CipherConfig, MessageExhaustion, OutputFormat},
    job::CipherJob,
    stego::CipherOperation,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() {
    let succeeded = {
        #[cfg(feature = "dhat-heap")]
        let _profiler = dhat::Profiler::new_heap();

        match work() {
            Ok(_) => {
                eprintln!("\ncloakweave successfully finished :)");
                true
            }
            Err(error) => {
                eprintln!("\n\n{:?}", error);
                false
            }
        }
    };
    if !succeeded {
        std::process::exit(1);
    }
}

fn parses_as<T: std::str::FromStr>(value: &str) -> Result<(), String>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map(|_| ()).map_err(|e| format!("{}", e))
}

fn cipher_args() -> Vec<Arg<'static>> {
    vec![
        Arg::new("config")
            .long("config")
            .takes_value(true)
            .value_name("YAML")
            .help("read defaults from a config file, flags given here win"),
        Arg::new("rounds")
            .long("rounds")
            .takes_value(true)
            .value_name("N")
            .validator(parses_as::<u32>)
            .help("number of coordinate permutation rounds [default: 3]"),
        Arg::new("output")
            .short('o')
            .long("output")
            .takes_value(true)
            .value_name("PATH")
            .help("output file [default: output.mkv when lossless, output.mp4 when lossy]"),
        Arg::new("lossless")
            .long("lossless")
            .conflicts_with("lossy")
            .help("encode the output with libx264rgb at qp 0"),
        Arg::new("lossy").long("lossy").help("encode the output as mpeg4"),
        Arg::new("seed")
            .long("seed")
            .takes_value(true)
            .value_name("N")
            .validator(parses_as::<u64>)
            .help("seed of the filler generator [default: 0]"),
        Arg::new("on-message-end")
            .long("on-message-end")
            .takes_value(true)
            .possible_values(["filler", "repeat-last", "pass-through"])
            .help("what to do with cloak frames after the message ran out [default: filler]"),
        Arg::new("keep-temporary")
            .long("keep-temporary")
            .help("do not delete the scratch directory with the intermediate files"),
    ]
}

fn config_from_matches(matches: &ArgMatches) -> Result<CipherConfig> {
    let mut config = match matches.value_of("config") {
        Some(path) => CipherConfig::load(path)?,
        None => CipherConfig::default(),
    };

    if let Some(rounds) = matches.value_of("rounds") {
        config.rounds = rounds.parse().context("invalid --rounds")?;
    }
    if let Some(seed) = matches.value_of("seed") {
        config.seed = seed.parse().context("invalid --seed")?;
    }
    if let Some(output) = matches.value_of("output") {
        config.output = Some(output.to_string());
    }
    if matches.is_present("lossless") {
        config.output_format = Some(OutputFormat::Lossless);
    } else if matches.is_present("lossy") {
        config.output_format = Some(OutputFormat::Lossy);
    }
    if let Some(policy) = matches.value_of("on-message-end") {
        config.message_exhaustion = policy.parse::<MessageExhaustion>()?;
    }
    if matches.is_present("keep-temporary") {
        config.keep_temporary = true;
    }
    Ok(config)
}

fn app() -> Command<'static> {
    Command::new("cloakweave")
        .about("hide the picture of one video in the low bits of another one")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("encode")
                .about("embed <message> into <cloak>")
                .arg(Arg::new("cloak").required(true).help("the video that stays visible"))
                .arg(Arg::new("message").required(true).help("the video to hide"))
                .args(cipher_args()),
        )
        .subcommand(
            Command::new("decode")
                .about("recover the hidden video from <encrypted> using the original cloak as <key>")
                .arg(Arg::new("encrypted").required(true).help("the output of encode"))
                .arg(Arg::new("key").required(true).help("the cloak used while encoding"))
                .args(cipher_args()),
        )
}

// used to have the convenience of ? for error handling
fn work() -> Result<()> {
    let main_app_arguments = app().get_matches();

    let (operation, matches, first, second) = match main_app_arguments.subcommand() {
        Some(("encode", matches)) => (CipherOperation::Embed, matches, "cloak", "message"),
        Some(("decode", matches)) => (CipherOperation::Extract, matches, "encrypted", "key"),
        _ => return Err(anyhow!("unknown subcommand")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config_from_matches(matches)?;
    let first = matches.value_of(first).ok_or_else(|| anyhow!("missing <{}>", first))?;
    let second = matches.value_of(second).ok_or_else(|| anyhow!("missing <{}>", second))?;
    let job = CipherJob::new(config, operation, first, second)?;

    let style = ProgressStyle::default_bar()
        .template(
            "{wide_bar} | {pos}/{len} frames | elapsed: {elapsed_precise} | remaining: {eta} | {msg} ",
        )?
        .progress_chars("#>-");
    let mut progressbar: Option<ProgressBar> = None;

    job.run(|progress| {
        let bar = progressbar.get_or_insert_with(|| {
            if let Some(total_frames) = progress.total_frames {
                ProgressBar::new(total_frames).with_style(style.clone())
            } else {
                ProgressBar::new_spinner()
            }
        });
        bar.set_position(progress.latest_frame);
    })?;

    if let Some(bar) = progressbar {
        bar.finish();
    }
    eprintln!("wrote {}", job.output_path().display());

    Ok(())
}
