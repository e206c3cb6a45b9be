// Entrypoint for the CLI application.
// - Keeps `main` small: parse the path, build the Vision client from the
//   environment and hand both to `ui::run`.
// - Every failure ends up as one line on stderr and exit status 1.

use clap::error::ErrorKind;
use clap::Parser;
use cloudvision::{api::VisionClient, config::Config, ui};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Annotate an image with Google Cloud Vision: labels, faces, logos,
/// landmarks and text.
#[derive(Parser)]
#[command(name = "cloudvision", version, about)]
struct Cli {
    /// Image file to annotate
    #[arg(value_name = "path-to-image")]
    image: PathBuf,

    /// Anything after the image path is ignored.
    #[arg(hide = true)]
    ignored: Vec<String>,
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    if !cli.ignored.is_empty() {
        log::debug!("ignoring extra arguments: {:?}", cli.ignored);
    }

    match run(&cli.image) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(image: &Path) -> anyhow::Result<()> {
    // Credentials are resolved before the file is touched.
    let config = Config::from_env();
    let client = VisionClient::from_config(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    ui::run(image, &client, &mut out)
}
