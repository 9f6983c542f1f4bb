use kryptonim::cli::{self, Opts};
use std::io;
use std::process;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts = Opts::from_args();
    let browser = opts.browser();

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = cli::run(&opts, &browser, stdin.lock(), stdout.lock()) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
