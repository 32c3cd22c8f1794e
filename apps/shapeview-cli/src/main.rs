use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use serde::Serialize;
use shapeview_geometry::{Mesh, cube, icosphere, square};
use shapeview_render::DebugTextRenderer;
use shapeview_scene::{App, Controls};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shapeview-cli", about = "CLI tool for shapeview operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Cube,
    Sphere,
    Square,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate a mesh and report its topology
    Mesh {
        #[arg(short, long, value_enum, default_value = "sphere")]
        shape: Shape,
        /// Icosphere subdivision level (clamped to 0-8)
        #[arg(short, long, default_value = "1")]
        level: u32,
        /// Icosphere radius
        #[arg(short, long, default_value = "1.0")]
        radius: f32,
        /// Dump the full mesh as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Run the frame loop headless through the debug renderer
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "5")]
        frames: u64,
        /// JSON controls preset
        #[arg(long)]
        controls: Option<PathBuf>,
        /// Step tessellation 0..=8 across frames
        #[arg(long)]
        sweep: bool,
    },
}

#[derive(Serialize)]
struct MeshSummary {
    vertices: usize,
    triangles: usize,
    bounding_radius: f32,
}

fn generate(shape: Shape, level: u32, radius: f32) -> anyhow::Result<Mesh> {
    let mesh = match shape {
        Shape::Cube => cube(Vec3::ZERO),
        Shape::Square => square(Vec3::ZERO),
        Shape::Sphere => icosphere(Vec3::ZERO, radius, level)?,
    };
    mesh.validate()?;
    Ok(mesh)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("shapeview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("geometry: {}", shapeview_geometry::crate_info());
            println!("render: {}", shapeview_render::crate_info());
            println!("scene: {}", shapeview_scene::crate_info());
        }
        Commands::Mesh {
            shape,
            level,
            radius,
            json,
        } => {
            let mesh = generate(shape, level, radius)?;
            if json {
                println!("{}", serde_json::to_string(&mesh)?);
            } else {
                let summary = MeshSummary {
                    vertices: mesh.vertex_count(),
                    triangles: mesh.triangle_count(),
                    bounding_radius: mesh.bounding_radius(Vec3::ZERO),
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        Commands::Simulate {
            frames,
            controls,
            sweep,
        } => {
            let mut controls = match controls {
                Some(path) => Controls::from_json_file(&path)
                    .with_context(|| format!("loading controls preset {}", path.display()))?,
                None => Controls::default(),
            };

            tracing::debug!(frames, sweep, ?controls, "simulation starting");
            let mut app = App::new(DebugTextRenderer::new(800, 600), &controls)?;
            app.resize(800, 600);
            for i in 0..frames {
                if sweep {
                    controls.tessellation = (i % 9) as u32;
                }
                let report = app.tick(&controls, &())?;
                println!(
                    "frame {:>3}: shader={} geometry={} rebuilt={} color_changed={}",
                    report.frame,
                    report.shader,
                    report.geometry,
                    report.sphere_rebuilt,
                    report.color_changed
                );
            }
            println!(
                "sphere rebuilds: {}, uploads: {}",
                app.sphere_rebuilds(),
                app.renderer().uploads()
            );
            print!("{}", app.renderer().last_frame());
        }
    }

    Ok(())
}
