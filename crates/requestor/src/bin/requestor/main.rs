//! Requestor binary: sends sequenced requests to a subject until interrupted.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

use error::{Error, Result};

use std::process::ExitCode;

use clap::Parser;
use demo_bootable::Bootable;
use demo_messaging_nats::{DEFAULT_URL, NatsBroker};
use demo_requestor::{DEFAULT_REQUESTORS, DEFAULT_SUBJECT, Requestor, RequestorOptions};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Single-dash long flags and the spelling clap parses.
const SINGLE_DASH_FLAGS: &[(&str, &str)] = &[
    ("-subj", "--subj"),
    ("-nr", "--requestors"),
    ("-debug", "--debug"),
];

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The nats server URLs (separated by comma)
    #[arg(short, long, env = "DEMO_SERVERS", default_value = DEFAULT_URL, value_delimiter = ',')]
    servers: Vec<String>,

    /// The subject to send requests to
    #[arg(long = "subj", env = "DEMO_SUBJECT", default_value = DEFAULT_SUBJECT)]
    subject: String,

    /// Number of concurrent request loops
    #[arg(short = 'n', long, env = "DEMO_REQUESTORS", default_value_t = DEFAULT_REQUESTORS)]
    requestors: usize,

    /// Log request errors
    #[arg(long, env = "DEMO_DEBUG")]
    debug: bool,

    /// Overrides `--subj`
    #[arg(value_name = "SUBJECT")]
    subject_override: Option<String>,
}

impl From<Args> for RequestorOptions {
    fn from(args: Args) -> Self {
        Self {
            debug: args.debug,
            requestors: args.requestors,
            subject: args.subject_override.unwrap_or(args.subject),
            ..Self::default()
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

    let servers = args.servers.clone();
    let options = RequestorOptions::from(args);

    info!("Server URLs:     {}", servers.join(","));
    info!("Requestor Count: {}", options.requestors);
    info!("Subject: {}", options.subject);

    let broker = NatsBroker::connect(&servers)
        .await
        .map_err(Error::Connect)?;

    let requestor = Requestor::new(broker, options);
    requestor.start().await?;

    let interrupted = tokio::signal::ctrl_c().await;

    requestor.shutdown().await?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(normalize_args(args.iter().map(ToString::to_string))).unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = RequestorOptions::from(parse(&["requestor"]));

        assert_eq!(options.subject, "demo.requests");
        assert_eq!(options.requestors, 1);
        assert!(!options.debug);
    }

    #[test]
    fn test_single_dash_subject() {
        let args = parse(&["requestor", "-subj", "t1"]);

        assert_eq!(args.servers, vec![DEFAULT_URL.to_string()]);
        assert_eq!(args.subject, "t1");
        assert!(args.subject_override.is_none());
    }

    #[test]
    fn test_positional_subject_overrides_flag() {
        let args = parse(&["requestor", "-s", "nats://a:4222", "-subj", "t1", "t2"]);
        assert_eq!(args.servers, vec!["nats://a:4222"]);

        let options = RequestorOptions::from(args);
        assert_eq!(options.subject, "t2");
    }

    #[test]
    fn test_requestor_count_and_debug() {
        let options = RequestorOptions::from(parse(&["requestor", "-nr", "4", "-debug"]));

        assert_eq!(options.requestors, 4);
        assert!(options.debug);

        let options = RequestorOptions::from(parse(&["requestor", "-n", "2"]));
        assert_eq!(options.requestors, 2);
    }

    #[test]
    fn test_arguments_after_terminator_are_untouched() {
        let args = parse(&["requestor", "--", "-subj"]);

        assert_eq!(args.subject_override.as_deref(), Some("-subj"));
    }
}
