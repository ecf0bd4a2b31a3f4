/// Example: Load an STL file and print a single frame without entering raw mode
///
/// Usage: cargo run --example load_stl -- path/to/file.stl [columns rows]
use std::env;
use std::io::{self, Write};
use stlview_core::{Viewer, ViewerConfig};
use stlview_terminal::TerminalRenderer;

fn main() -> io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let columns = args.get(2).and_then(|v| v.parse().ok()).unwrap_or(80);
    let rows = args.get(3).and_then(|v| v.parse().ok()).unwrap_or(40);

    let mut renderer = TerminalRenderer::new(columns, rows);
    let (width, height) = renderer.pixel_size();
    let mut viewer = Viewer::new(&ViewerConfig::default(), width, height);

    match args.get(1) {
        Some(path) => {
            println!("Loading STL file: {}", path);
            let summary = viewer
                .open(path)
                .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))?;
            println!(
                "Loaded {} triangles ({} entries skipped)",
                summary.triangles, summary.skipped
            );
        }
        None => {
            eprintln!("Usage: {} <stl-file> [columns rows]", args[0]);
            eprintln!("\nNo STL file provided, showing grid and axes only...");
        }
    }

    viewer.render(&mut renderer);

    let mut stdout = io::stdout();
    renderer.present(&mut stdout)?;
    writeln!(stdout)?;
    stdout.flush()
}
