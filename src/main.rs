//! hdr-bracket: HDR exposure bracketing through gphoto2.

use clap::Parser;
use hdr_bracket::bracket::BracketRequest;
use hdr_bracket::cli::{self, Args, Command};
use hdr_bracket::config::Config;
use hdr_bracket::gphoto::Gphoto2;
use hdr_bracket::session::{self, SessionSettings};

fn main() {
    let args = Args::parse();

    if let Err(e) = hdr_bracket::logging::init(args.debug) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> hdr_bracket::Result<()> {
    // If --config is specified, require the file to exist
    let mut config = match &args.config {
        Some(path) => Config::load_from_explicit(path)?,
        None => Config::load(None)?,
    };
    args.apply(&mut config);

    let settings = SessionSettings::from(&config.camera);
    let mut gphoto = Gphoto2::new(config.camera.gphoto2.clone());
    let request = BracketRequest::from(&config.bracket);
    let mut stdout = std::io::stdout().lock();

    match args.command {
        Some(Command::Status) => cli::print_status(&gphoto, &settings, &mut stdout),
        Some(Command::Steps) => cli::print_steps(&gphoto, &settings, &mut stdout),
        Some(Command::Plan) => cli::print_plan(&gphoto, &settings, request, &mut stdout),
        Some(Command::Config { action }) => {
            cli::handle_config_action(action, &config, args.config.as_deref(), &mut stdout)
        }
        None => {
            if let Err(e) = session::setup_ctrlc_handler() {
                log::warn!("Failed to set Ctrl+C handler: {}", e);
            }
            let reader = gphoto.clone();
            session::run(&reader, &mut gphoto, &settings, request, args.dry_run).map(|_| ())
        }
    }
}
