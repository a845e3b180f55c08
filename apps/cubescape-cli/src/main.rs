use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cubescape_assets::TextureLoader;
use cubescape_common::SceneConfig;
use cubescape_input::{InputId, InputTracker};
use cubescape_kernel::{LogicLoop, RenderLoop, RenderOutcome, Scene};
use cubescape_objects::{DemoScene, build_demo_scene};
use cubescape_render::{GpuCall, GpuContext, HeadlessContext, TextureImage, default_programs};
use cubescape_tools::SceneInspector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubescape-cli", about = "Headless tool for the cubescape demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Texture image to put on the cubes
    #[arg(long, global = true)]
    texture: Option<PathBuf>,

    /// Seed for cube colors
    #[arg(long, global = true, default_value = "42")]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective scene configuration
    Info,
    /// Hold keys and run logic ticks, then print every entity
    Simulate {
        /// Number of logic ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Keys held for the whole run, e.g. `W`, `space`, `left`
        #[arg(long, value_delimiter = ',')]
        hold: Vec<InputId>,
    },
    /// Render one frame into a recording context and report the GPU calls
    Frame {
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(texture) = &cli.texture {
        config.texture.path = texture.clone();
    }
    Ok(config)
}

/// Build the demo scene on a headless context. A texture that fails to load
/// is replaced by plain white.
fn headless_scene(
    config: &SceneConfig,
    gpu: &mut HeadlessContext,
    tracker: &mut InputTracker<Scene>,
    seed: u64,
) -> anyhow::Result<DemoScene> {
    let image = match TextureLoader.load(&config.texture) {
        Ok(loaded) => {
            tracing::info!(name = %loaded.name, id = ?loaded.id, "texture loaded");
            loaded.image
        }
        Err(e) => {
            tracing::warn!("{e}; using a white texture");
            TextureImage::white()
        }
    };
    let texture = gpu.create_texture(&image);
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(build_demo_scene(config, gpu, tracker, Some(texture), &mut rng)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("cubescape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "cubes: {} (spacing {}, depth {}, max speed {})",
                config.cube_count, config.cube_spacing, config.cube_depth, config.max_speed
            );
            println!("logic rate: {} Hz", config.logic_hz);
            println!(
                "camera: fov {} deg, near {}, far {}",
                config.fov_degrees, config.near, config.far
            );
            println!(
                "texture: {} <- {} (flip_y={})",
                config.texture.name,
                config.texture.path.display(),
                config.texture.flip_y
            );
            let programs = default_programs();
            let names: Vec<&str> = programs.registered().collect();
            println!("programs: {}", names.join(", "));
        }
        Commands::Simulate { ticks, hold } => {
            let mut gpu = HeadlessContext::new(800, 600);
            let mut tracker = InputTracker::new();
            let mut demo = headless_scene(&config, &mut gpu, &mut tracker, cli.seed)?;

            let start = Instant::now();
            for id in &hold {
                tracker.key_down(*id, start, &mut demo.scene);
            }

            let mut logic = LogicLoop::new(config.logic_hz)?;
            let _stop = logic.start(start);
            let mut now = start;
            let mut elapsed = 0.0;
            while logic.ticks() < ticks {
                now += logic.interval();
                if let Some(dt) = logic.poll(now, &mut demo.scene) {
                    elapsed += dt;
                }
            }

            let held: Vec<String> = hold.iter().map(ToString::to_string).collect();
            println!(
                "Simulated {} ticks ({elapsed:.3}s) holding [{}]",
                logic.ticks(),
                held.join(", ")
            );
            for info in SceneInspector::list_entities(&demo.scene) {
                println!("  {info}");
            }
        }
        Commands::Frame { width, height } => {
            let mut gpu = HeadlessContext::new(width, height);
            let mut tracker = InputTracker::new();
            let mut demo = headless_scene(&config, &mut gpu, &mut tracker, cli.seed)?;
            gpu.take_calls();

            let mut programs = default_programs();
            let mut render = RenderLoop::new(config.program.clone());
            let now = Instant::now();
            let _stop = render.start(now);
            match render.tick(now, (width, height), &mut demo.scene, &mut gpu, &mut programs) {
                RenderOutcome::Rendered { entities } => println!("Rendered {entities} entities"),
                RenderOutcome::Skipped(e) => anyhow::bail!("frame skipped: {e}"),
                RenderOutcome::Idle => anyhow::bail!("render loop is not running"),
            }

            println!(
                "  programs linked: {}",
                gpu.count(|c| matches!(c, GpuCall::LinkProgram { ok: true }))
            );
            println!(
                "  uniforms set: {}",
                gpu.count(|c| matches!(c, GpuCall::SetMat4 { .. } | GpuCall::SetVec4 { .. }))
            );
            println!(
                "  attributes bound: {}",
                gpu.count(|c| matches!(c, GpuCall::BindAttribute { .. }))
            );
            println!(
                "  textures bound: {}",
                gpu.count(|c| matches!(c, GpuCall::BindTexture { .. }))
            );
            for (indices, count) in gpu.draws() {
                println!("  draw: index buffer {} x {count}", indices.0);
            }
        }
    }

    Ok(())
}
