//! The directory service daemon.
//!
//! Serves one session on stdin/stdout; this is how cooperating
//! processes invoke the service over a pipe.

use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use madrona_dirmngr::Result;
use madrona_dirmngr::cache::{
    AnchorlessValidator, Backends, DisabledOcsp, MemoryCertCache,
    UnconfiguredCrlCache,
};
use madrona_dirmngr::config::Config;
use madrona_dirmngr::ks::{HttpFetcher, NetOpts};
use madrona_dirmngr::server::start_command_handler;

/// Defines the CLI.
#[derive(Parser, Debug)]
#[clap(
    name = "madrona-dirmngr",
    about = "CRL, OCSP and keyserver access for cooperating processes",
    version,
)]
pub struct Cli {
    #[clap(
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Set the home directory",
    )]
    homedir: std::path::PathBuf,

    #[clap(
        long,
        help = "Allow sending OCSP requests",
    )]
    allow_ocsp: bool,

    #[clap(
        long,
        value_name = "URL",
        help = "Use this keyserver; may be given multiple times",
    )]
    keyserver: Vec<String>,

    #[clap(
        long,
        value_name = "SECONDS",
        default_value = "15",
        help = "Timeout for network operations",
    )]
    connect_timeout: u64,

    #[clap(
        long,
        value_name = "SECONDS",
        default_value = "2",
        help = "Timeout selected by the --quick option of commands",
    )]
    connect_quick_timeout: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Arc::new(Config {
        allow_ocsp: cli.allow_ocsp,
        keyservers: cli.keyserver,
        connect_timeout: Duration::from_secs(cli.connect_timeout),
        connect_quick_timeout: Duration::from_secs(cli.connect_quick_timeout),
        homedir: cli.homedir,
        use_tor: false,
    });

    let backends = Backends {
        crl: Arc::new(UnconfiguredCrlCache::new()),
        certs: Arc::new(MemoryCertCache::new()),
        ocsp: Arc::new(DisabledOcsp::new()),
        validator: Arc::new(AnchorlessValidator::new()),
        fetcher: Arc::new(HttpFetcher::new(NetOpts {
            timeout: config.connect_timeout,
            http_proxy: None,
        })),
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let stopme = start_command_handler(
        BufReader::new(stdin.lock()), stdout.lock(), config, backends)?;

    if stopme {
        log::info!("shutdown requested by client");
    }
    Ok(())
}
