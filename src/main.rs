use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use squelch::cli::Cli;
use squelch::engine::Squelch;
use squelch::output::Output;
use squelch::report::SquelchReport;
use squelch::stream::Harness;

const ERR_TRANSPORT: u8 = 1;
const ERR_CONFIG: u8 = 2;
const ERR_REPORT: u8 = 3;

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.debug);

    let config = match args.config() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(ERR_CONFIG);
        }
    };

    info!("[+] buffer length:      {} samples", config.buffer_length);
    info!("[+] amplitude limit:    {}", config.amplitude_limit);
    info!("[+] silence duration:   {} samples", config.min_silence_duration);
    info!("[+] fade time:          {} samples", config.transition_time);
    if config.is_fade_enabled() {
        info!("[+] fade mode:          {:?}", config.fade_mode);
    }

    let mut engine = Squelch::new(&config);
    let mut harness = Harness::new(&config);
    let mut report = SquelchReport::new(args.sample_rate, args.report.is_some());
    let output = Output::new(args.progress);

    let result = harness.run(
        &mut engine,
        io::stdin().lock(),
        io::stdout().lock(),
        &mut report,
        &output,
    );
    output.finish();

    let total = match result {
        Ok(total) => total,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(ERR_TRANSPORT);
        }
    };

    info!(
        "[+] end of stream:      {} samples, {} squelched in {} segment(s)",
        total,
        report.squelched_samples(),
        report.segment_count()
    );
    debug!("Final gate phase: {:?}", engine.phase());

    if let Some(path) = &args.report {
        if let Err(err) = report.write(path, &config) {
            error!("{}: {}", path.display(), err);
            return ExitCode::from(ERR_REPORT);
        }
        info!("Wrote squelch report to {}", path.display());
    }

    ExitCode::SUCCESS
}
