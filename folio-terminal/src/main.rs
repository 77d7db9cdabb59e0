/// Folio Terminal - bendable-page book preview
///
/// Usage: folio-terminal [manifest] [--config book.json] [--bones]
///
/// Controls:
///   - WASD / Arrow Keys: Orbit the camera
///   - Z/X: Zoom
///   - +/-: Bend the driven bone
///   - Space: Toggle the bend animation
///   - B: Toggle the bone chain overlay
///   - O: Toggle projection
///   - Q/ESC: Quit

use clap::Parser;
use std::io;
use folio_core::{manifest, BookConfig};
use folio_terminal::{cli::Args, sample_records, to_io_error, TerminalApp};

const SAMPLE_PAGES: usize = 6;

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BookConfig::load(path).map_err(to_io_error)?,
        None => BookConfig::default(),
    };

    let records = match &args.manifest {
        Some(path) => {
            println!("Loading page manifest: {}", path.display());
            manifest::load_records(path).map_err(to_io_error)?
        }
        None => {
            println!("No manifest provided, using {} sample pages...", SAMPLE_PAGES);
            sample_records(SAMPLE_PAGES)
        }
    };

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(config, &records)?;
    app.set_show_bones(args.bones);
    app.run()?;

    let skipped = app.book().skipped().len();
    if skipped > 0 {
        println!("{} page(s) were skipped, see the warnings above", skipped);
    }

    println!("Thank you for using Folio!");
    Ok(())
}
