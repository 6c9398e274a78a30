//! kiosk-watchdog - health watchdog for a single-display browser kiosk
//!
//! Invoked periodically by a timer. Each run checks that the supervised kiosk
//! service is actually showing something and restarts what is broken.

mod cli;
mod clock;
mod command;
mod config;
mod error;
mod gate;
mod lock;
mod logging;
mod sickbay;
mod systemd;
mod warden;

#[cfg(test)]
mod testing;

use cli::{Cli, Commands};
use clock::SystemClock;
use config::WatchdogConfig;
use error::Result;
use sickbay::Probes;
use sickbay::probes::{HttpEndpoint, ProcessTable, XDisplay};
use systemd::{DryRun, ServiceManager, Systemctl};
use warden::Warden;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.subcommand() {
        Commands::Completion { shell } => {
            Cli::generate_completion(shell);
        }

        Commands::Config { json } => {
            logging::init_logging(cli.verbose);
            let config = WatchdogConfig::resolve(&cli.config);
            if json {
                println!("{}", serde_json::to_string_pretty(&config.to_json())?);
            } else {
                print_config(&config);
            }
        }

        Commands::Run { dry_run } => {
            logging::init_logging(cli.verbose);

            let probes = Probes {
                process: &ProcessTable,
                display: &XDisplay,
                endpoint: &HttpEndpoint,
            };
            let clock = SystemClock;
            let systemctl = Systemctl::new(systemd::DEFAULT_QUERY_TIMEOUT);
            let dry = DryRun::new(&systemctl);
            let manager: &dyn ServiceManager = if dry_run { &dry } else { &systemctl };

            Warden::new(manager, probes, &clock).run(&cli.lock_file, || {
                let config = WatchdogConfig::resolve(&cli.config);
                systemctl.set_timeout(config.query_timeout);
                config
            });
        }
    }

    Ok(())
}

fn print_config(config: &WatchdogConfig) {
    let source = config
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());
    let uid = config
        .account
        .uid
        .map(|u| u.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("source:            {}", source);
    println!("endpoint:          {}", config.endpoint_url);
    println!("display:           {}", config.display);
    println!("user:              {} (uid {})", config.account.name, uid);
    println!("service:           {}", config.service);
    println!("dependent service: {}", config.dependent_service);
    println!("process match:     {}", config.process_match);
    println!("display probe:     {}", config.display_probe.join(" "));
    println!(
        "timeouts:          process {:?}, display {:?}, http {:?} (connect {:?}), query {:?}",
        config.process_timeout,
        config.display_timeout,
        config.http_timeout,
        config.connect_timeout,
        config.query_timeout
    );
    println!("http retries:      {}", config.http_retries);
    println!(
        "grace:             {:?} below {:?} uptime, {:?} when unknown",
        config.grace_sleep, config.grace_threshold, config.grace_fallback
    );
    println!("recheck delay:     {:?}", config.recheck_delay);
    println!("xauthority:        {}", config.xauthority.display());
    for fallback in &config.xauthority_fallbacks {
        println!("  fallback:        {}", fallback.display());
    }
    println!("authority in use:  {}", config.authority.display());
}
