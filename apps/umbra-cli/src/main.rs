use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use umbra_assets::{MeshData, load_box, load_scene_assets, primitives, save_box};
use umbra_common::DemoConfig;
use umbra_render::{DebugTextRenderer, FrameOrchestrator, Renderer, ShadingMode};
use umbra_scene::{Camera, FrameTime, Scene, SceneObject};

/// Offset alignment used for headless planning; the largest value wgpu
/// allows for `min_uniform_buffer_offset_alignment`.
const HEADLESS_ALIGNMENT: u32 = 256;

#[derive(Parser)]
#[command(name = "umbra-cli", about = "Headless tooling for the umbra demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the built-in configuration summary
    Info,
    /// Plan frames without a GPU and print each frame's passes
    Plan {
        /// Number of frames to plan
        #[arg(short, long, default_value = "3")]
        frames: u64,
        /// Seconds between frames
        #[arg(long, default_value = "0.5")]
        dt: f64,
        /// Shading mode 0-4
        #[arg(short, long, default_value = "0")]
        mode: u32,
        /// YAML config; the built-in scene is used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print each draw's world-space origin
        #[arg(long)]
        origins: bool,
    },
    /// Print the vertex, index and bounds summary of a .box mesh
    MeshInfo {
        /// Path to the .box file
        file: PathBuf,
    },
    /// Write a procedural primitive as a .box mesh
    Export {
        primitive: Primitive,
        /// Output path
        out: PathBuf,
        /// Edge length, radius or half extent
        #[arg(short, long, default_value = "1.0")]
        size: f32,
    },
    /// Parse and validate a YAML config
    CheckConfig {
        file: PathBuf,
        /// Print the config with every default filled in
        #[arg(long)]
        dump: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Primitive {
    Cube,
    Sphere,
    Plane,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = DemoConfig::default();
            println!("umbra-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "window: {}x{}  camera speed: {}  look sensitivity: {}",
                config.window.width,
                config.window.height,
                config.camera.move_speed,
                config.camera.rotate_speed
            );
            println!(
                "light: origin={} protrusion={} speed={} projection={:?}",
                config.light.origin,
                config.light.protrusion,
                config.light.speed,
                config.light.projection
            );
            println!(
                "shadow: {} draw slots, bias {}/{}",
                config.shadow.max_draws,
                config.shadow.depth_bias_constant,
                config.shadow.depth_bias_slope
            );
            println!("entities: {}", config.entities.len());
        }
        Commands::Plan {
            frames,
            dt,
            mode,
            config,
            origins,
        } => {
            let (config, base_dir) = load_config(config.as_deref())?;
            let mut scene = cpu_scene(&config, &base_dir)?;
            let mut orchestrator = FrameOrchestrator::new(&config, HEADLESS_ALIGNMENT)?;
            orchestrator.set_shading_mode(ShadingMode::from_index(mode)?);
            let user_camera =
                Camera::from_config(&config.camera, config.window.width, config.window.height);
            tracing::debug!(
                "planning {frames} frames over {} objects",
                scene.len()
            );

            let mut renderer = DebugTextRenderer { verbose: origins };
            for frame in 0..frames {
                let time = FrameTime {
                    elapsed: frame as f64 * dt,
                    delta: dt as f32,
                    frame,
                };
                let planned = orchestrator.plan_frame(time, &mut scene, &user_camera)?;
                print!("{}", renderer.render(&planned, &scene)?);
            }
        }
        Commands::MeshInfo { file } => {
            let mesh = load_box(&file)?;
            println!("{}", file.display());
            println!("  vertices:  {}", mesh.vertices.len());
            println!("  indices:   {}", mesh.indices.len());
            println!("  triangles: {}", mesh.indices.len() / 3);
            if let Some((min, max)) = mesh.bounds() {
                println!("  bounds:    {min} .. {max}");
            }
        }
        Commands::Export {
            primitive,
            out,
            size,
        } => {
            let mesh = match primitive {
                Primitive::Cube => primitives::cube(size)?,
                Primitive::Sphere => primitives::sphere(size, 16, 32)?,
                Primitive::Plane => primitives::plane(size, 1.0)?,
            };
            save_box(&mesh, &out)?;
            println!(
                "wrote {} ({} vertices, {} indices)",
                out.display(),
                mesh.vertices.len(),
                mesh.indices.len()
            );
        }
        Commands::CheckConfig { file, dump } => {
            let config = DemoConfig::load(&file)
                .with_context(|| format!("invalid config {}", file.display()))?;
            println!(
                "{}: OK ({} entities, {} draw slots)",
                file.display(),
                config.entities.len(),
                config.shadow.max_draws
            );
            if dump {
                print!("{}", config.to_yaml_string()?);
            }
        }
    }

    Ok(())
}

/// Load `path`, or fall back to the built-in config. Relative asset paths
/// resolve against the config file's directory.
fn load_config(path: Option<&Path>) -> Result<(DemoConfig, PathBuf)> {
    match path {
        Some(path) => {
            let config = DemoConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            let base_dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok((config, base_dir))
        }
        None => Ok((DemoConfig::default(), PathBuf::from("."))),
    }
}

/// The configured scene with CPU-side meshes standing in for GPU buffers.
fn cpu_scene(config: &DemoConfig, base_dir: &Path) -> Result<Scene<MeshData>> {
    let assets = load_scene_assets(config, base_dir)?;
    let mut scene = Scene::new();
    for (entity, (_, mesh)) in config.entities.iter().zip(assets.meshes) {
        scene.push(SceneObject::from_config(entity, mesh));
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_builds_on_the_cpu() {
        let config = DemoConfig::default();
        let scene = cpu_scene(&config, Path::new(".")).unwrap();
        assert_eq!(scene.len(), config.entities.len());
        for (object, entity) in scene.objects().iter().zip(&config.entities) {
            assert_eq!(object.name, entity.name);
        }
    }

    #[test]
    fn cli_parses_plan_arguments() {
        let cli = Cli::try_parse_from(["umbra-cli", "plan", "--frames", "2", "--mode", "3"]).unwrap();
        match cli.command {
            Commands::Plan { frames, mode, .. } => {
                assert_eq!(frames, 2);
                assert_eq!(mode, 3);
            }
            _ => panic!("expected plan"),
        }
    }
}
