/// STLView - interactive ASCII STL viewer for the terminal
///
/// Usage: stlview [--config <file.json>] [model.stl]
///
/// Controls:
///   - Left drag: Orbit about X/Y
///   - Middle drag: Orbit about X/Z
///   - Wheel, +/-: Zoom
///   - WASD / Arrow Keys, Z/X: Rotate
///   - R: Reload, 0: Reset view, Q/ESC: Quit
///
/// Logs go to stderr; set RUST_LOG and redirect stderr to keep the view clean.
use std::env;
use std::path::PathBuf;
use stlview_core::ViewerConfig;
use stlview_terminal::{Error, Result, TerminalApp};

struct Args {
    config: Option<PathBuf>,
    model: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        model: None,
    };
    let mut iter = env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| Error::Usage("--config needs a file path".to_string()))?;
                args.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                return Err(Error::Usage(
                    "usage: stlview [--config <file.json>] [model.stl]".to_string(),
                ));
            }
            _ if args.model.is_none() => args.model = Some(PathBuf::from(arg)),
            _ => return Err(Error::Usage(format!("unexpected argument: {}", arg))),
        }
    }

    Ok(args)
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let mut app = TerminalApp::new(&config)?;
    if let Some(model) = &args.model {
        // A bad path leaves the grid and axes, with the error in the status line
        if let Err(err) = app.open(model) {
            log::error!("{}", err);
        }
    }

    app.run()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    if let Err(err) = run() {
        eprintln!("stlview: {}", err);
        std::process::exit(1);
    }
}
