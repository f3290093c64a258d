use std::{path::PathBuf, thread, time::Duration};

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;

use leafscan::app::controller::{PageController, Phase};
use leafscan::app::LeafScanApp;
use leafscan::config::{UploadConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use leafscan::fs_utils::read_image_file;
use leafscan::logging::init_logging;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Send a crop-leaf photo to the disease detection API and show the analysis"
)]
struct Args {
    /// Image to preselect (required with --headless)
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Upload endpoint that receives the multipart form
    #[arg(short, long, env = "LEAFSCAN_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(short, long = "timeout-secs", env = "LEAFSCAN_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Upload IMAGE once, print the result and exit without opening a window
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = UploadConfig::new(&args.endpoint, args.timeout_secs)?;

    if args.headless {
        let path = args
            .image
            .ok_or_else(|| anyhow!("--headless needs an IMAGE to upload"))?;
        return run_headless(&config, path);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("LeafScan")
            .with_inner_size([820.0, 760.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let initial = args.image;
    eframe::run_native(
        "LeafScan",
        native_options,
        Box::new(move |cc| match LeafScanApp::new(cc, &config, initial.clone()) {
            Ok(app) => Ok(Box::new(app) as Box<dyn eframe::App>),
            Err(err) => {
                eprintln!("{err:#}");
                std::process::exit(1);
            }
        }),
    )?;

    Ok(())
}

fn run_headless(config: &UploadConfig, path: PathBuf) -> Result<()> {
    let file = read_image_file(&path)?;
    if !file.is_image() {
        return Err(anyhow!(
            "{} is not an image ({})",
            path.display(),
            file.mime_type
        ));
    }

    let mut controller = PageController::new(config)?;
    controller.submit(&file);
    while controller.phase() == Phase::Uploading {
        thread::sleep(Duration::from_millis(25));
        controller.poll();
    }

    println!("{}", controller.result_text().unwrap_or_default());
    if controller.failed() {
        std::process::exit(2);
    }
    Ok(())
}
