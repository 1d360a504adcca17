//! Replier binary: answers requests on a subject as part of a queue group.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

use error::{Error, Result};

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use demo_bootable::Bootable;
use demo_messaging_nats::{DEFAULT_URL, NatsBroker};
use demo_replier::{DEFAULT_QUEUE_GROUP, DEFAULT_SUBJECT, Replier, ReplierOptions};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

/// Single-dash long flags and the spelling clap parses.
const SINGLE_DASH_FLAGS: &[(&str, &str)] = &[
    ("-subj", "--subj"),
    ("-qg", "--qg"),
    ("-delay", "--delay"),
    ("-debug", "--debug"),
];

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The nats server URLs (separated by comma)
    #[arg(short, long, env = "DEMO_SERVERS", default_value = DEFAULT_URL, value_delimiter = ',')]
    servers: Vec<String>,

    /// The subject to listen to
    #[arg(long = "subj", env = "DEMO_SUBJECT", default_value = DEFAULT_SUBJECT)]
    subject: String,

    /// The name of the queue group
    #[arg(long = "qg", env = "DEMO_QUEUE_GROUP", default_value = DEFAULT_QUEUE_GROUP)]
    queue_group: String,

    /// Duration to delay the response
    #[arg(long, env = "DEMO_DELAY", default_value = "50ms", value_parser = humantime::parse_duration)]
    delay: Duration,

    /// Enable debugging
    #[arg(long, env = "DEMO_DEBUG")]
    debug: bool,
}

impl From<Args> for ReplierOptions {
    fn from(args: Args) -> Self {
        Self {
            debug: args.debug,
            delay: args.delay,
            queue_group: args.queue_group,
            subject: args.subject,
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish(),
    )?;

    let broker = NatsBroker::connect(&args.servers)
        .await
        .map_err(Error::Connect)?;

    let replier = Replier::new(broker, ReplierOptions::from(args));
    replier.start().await?;

    // Drain on interrupt so requests in flight are answered when scaling down.
    let interrupted = tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        () = replier.wait() => Ok(()),
    };

    replier.shutdown().await?;
    interrupted?;

    Ok(())
}

/// Rewrites single-dash long flags such as `-subj` to the `--subj` form clap
/// expects. Without this `-subj t1` parses as `-s ubj t1`.
fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut options_ended = false;

    args.into_iter()
        .map(|arg| {
            if options_ended {
                return arg;
            }
            if arg == "--" {
                options_ended = true;
                return arg;
            }

            for (single, double) in SINGLE_DASH_FLAGS {
                if arg == *single {
                    return (*double).to_string();
                }
                if let Some(value) = arg
                    .strip_prefix(single)
                    .and_then(|rest| rest.strip_prefix('='))
                {
                    return format!("{double}={value}");
                }
            }

            arg
        })
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse_from(normalize_args(std::env::args()));

    if let Err(e) = run(args).await {
        match e {
            Error::SetTracing(_) => eprintln!("{e}"),
            _ => error!("{}", e),
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
