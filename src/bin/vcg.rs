use clap::{Parser, Subcommand};
use glam::Vec2;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use std::time::Instant;
use vehicle_capture_guide::config::GuideConfig;
use vehicle_capture_guide::detection::VehicleFilter;
use vehicle_capture_guide::io::{SessionReport, write_session_report};
use vehicle_capture_guide::lens::{JsonCameraSystem, LensCatalog};
use vehicle_capture_guide::pipeline::{FrameAnalysis, analyze_frame};
use vehicle_capture_guide::replay::load_detection_frames;
use vehicle_capture_guide::visualization::{build_overlay, render_overlay};
use vehicle_capture_guide::zoom::{ZoomController, ZoomEvent};
use vehicle_capture_guide::{PositioningAnalyzer, Strategy};

#[derive(Parser)]
#[command(version, about, author)]
struct VcgCli {
    /// config json, defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and classify rear lenses from a camera description
    Lenses {
        /// camera system json
        camera_json: String,
    },
    /// Feed zoom ratios to the controller and print its events
    Zoom {
        /// camera system json
        camera_json: String,

        /// zoom ratios, applied in order
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        ratios: Vec<f32>,
    },
    /// Replay recorded detection frames through the positioning analyzer
    Analyze {
        /// folder of detection frame json files
        path: String,

        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// session report output
        #[arg(short, long, default_value = "report.json")]
        report: String,

        /// write overlay pngs to this folder
        #[arg(long)]
        render: Option<String>,

        #[arg(long, default_value = "1080")]
        width: u32,

        #[arg(long, default_value = "1920")]
        height: u32,

        /// source image size as WxH, letterboxed into the viewport
        #[arg(long)]
        source: Option<String>,
    },
}

fn parse_size(s: &str) -> Option<Vec2> {
    let (w, h) = s.split_once('x')?;
    Some(Vec2::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = VcgCli::parse();
    let config = match &cli.config {
        Some(path) => GuideConfig::from_json_file(path)?,
        None => GuideConfig::default(),
    };

    match cli.command {
        Commands::Lenses { camera_json } => {
            let catalog = LensCatalog::discover(&JsonCameraSystem::new(camera_json));
            if catalog.is_empty() {
                println!("no classified rear lenses, digital zoom only");
            }
            for lens in [catalog.ultra_wide(), catalog.main()].into_iter().flatten() {
                println!("{}", serde_json::to_string_pretty(lens)?);
            }
        }
        Commands::Zoom {
            camera_json,
            ratios,
        } => {
            let catalog = LensCatalog::discover(&JsonCameraSystem::new(camera_json));
            let mut controller = ZoomController::new(catalog, &config.zoom);
            controller.subscribe(|event| match event {
                ZoomEvent::ZoomChanged { ratio } => println!("zoom changed: {:.2}", ratio),
                ZoomEvent::LensSwitchRequested { role, lens } => {
                    println!("switch to {} lens {}", role, lens.id)
                }
                ZoomEvent::UiStateChanged(ui) => println!(
                    "ui: {:?} slider {:.2}",
                    ui.selected, ui.slider_position
                ),
            });
            for ratio in ratios {
                controller.set_zoom_ratio(ratio);
            }
            println!("{}", serde_json::to_string_pretty(&controller.state())?);
        }
        Commands::Analyze {
            path,
            strategy,
            report,
            render,
            width,
            height,
            source,
        } => {
            let strategy = strategy.unwrap_or(config.strategy);
            let analyzer = PositioningAnalyzer::new();
            let filter = VehicleFilter::from_config(&config.detection);

            let now = Instant::now();
            let frames = load_detection_frames(&path)?;
            log::info!("loaded {} frames from {}", frames.len(), path);
            let analyses: Vec<FrameAnalysis> = frames
                .par_iter()
                .progress_count(frames.len() as u64)
                .map(|f| analyze_frame(&analyzer, &filter, strategy, f))
                .collect();
            let duration_sec = now.elapsed().as_secs_f64();
            println!("analyzing took {:.6} sec", duration_sec);

            let session = SessionReport::from_analyses(strategy, &analyses);
            write_session_report(&report, &session)?;
            println!("report written to {}", report);

            if let Some(out_dir) = render {
                std::fs::create_dir_all(&out_dir)?;
                let viewport = Vec2::new(width as f32, height as f32);
                let source = source.as_deref().and_then(parse_size);
                analyses.par_iter().try_for_each(|a| {
                    let mut img = image::RgbImage::new(width, height);
                    render_overlay(&mut img, &build_overlay(a, viewport, source));
                    img.save(format!("{}/{}.png", out_dir, a.timestamp_ns))
                })?;
            }
        }
    }
    Ok(())
}
