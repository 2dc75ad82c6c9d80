use log::error;
use mosaic_core::{Config, MosaicResult};

mod cli;
mod commands;
mod logger;

fn main() -> MosaicResult<()> {
    let args = cli::parse_args();

    logger::init_logger(args.quiet, args.verbose).map_err(|e| format!("Failed to initialize logger: {e}"))?;

    let config = if args.use_defaults {
        Config::default()
    } else {
        Config::load(args.config_path.as_deref(), true)?
    };

    commands::run(&args.command, config).inspect_err(|e| error!("{e}"))
}
