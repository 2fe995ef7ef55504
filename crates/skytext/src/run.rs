use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use driver::{stop_signal, AssetGate, Immediate, IntervalPacer, Launch, RunSummary};
use renderer::{CpuHost, RendererConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::assets::FileAssetLoader;
use crate::catalog::Catalog;
use crate::cli::RunArgs;
use crate::paths::AppPaths;

const FALLBACK_SCENE: &str = "mad";
const DEFAULT_SURFACE: (u32, u32) = (320, 180);

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let catalog = Catalog::load(&paths, args.config.as_deref())?;
    let name = args
        .scene
        .clone()
        .or_else(|| catalog.file().default_scene().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_SCENE.to_string());
    let mut scene = catalog
        .file()
        .scene(&name)
        .cloned()
        .ok_or_else(|| anyhow!("unknown scene '{name}'; try `skytext scenes list`"))?;

    if args.regenerate_geometry {
        match scene.geometry_pulse.as_mut() {
            Some(pulse) => pulse.regenerate = true,
            None => warn!(scene = %name, "--regenerate-geometry has no effect: scene has no geometry pulse"),
        }
    }

    let surface = args.size.unwrap_or(DEFAULT_SURFACE);
    let mut loader = FileAssetLoader::new(asset_root(&args));
    let gate = AssetGate::request(&mut loader, &scene.asset.path, scene.asset.kind);
    let mut driver = match gate
        .launch(&scene, surface)
        .with_context(|| format!("failed to set up scene '{name}'"))?
    {
        Launch::Started(driver) => driver,
        Launch::Failed(err) => {
            return Err(anyhow::Error::new(err).context(format!("scene '{name}' cannot start")))
        }
        Launch::Pending => bail!("asset for scene '{name}' never finished loading"),
    };

    let mut host = CpuHost::new(&RendererConfig {
        surface_size: surface,
        export_dir: args.export.clone(),
        export_every: args.export_every,
    })?;

    let interval = match args.fps {
        Some(fps) if fps > 0.0 => Some(
            Duration::try_from_secs_f32(1.0 / fps)
                .with_context(|| format!("frame rate {fps} cannot be paced"))?,
        ),
        Some(_) => None,
        None => Some(catalog.file().frame_interval(&name)),
    };
    info!(
        scene = %name,
        width = surface.0,
        height = surface.1,
        interval = ?interval,
        frames = ?args.frames,
        "starting render loop"
    );

    let (_stop, token) = stop_signal();
    let summary: RunSummary = match interval {
        Some(interval) => driver::run(
            &mut driver,
            &mut host,
            &mut IntervalPacer::new(interval),
            &token,
            args.frames,
        )?,
        None => driver::run(&mut driver, &mut host, &mut Immediate, &token, args.frames)?,
    };

    for (clock, t) in &summary.clocks {
        info!(clock = %clock, t, "final clock");
    }

    if let Some(directory) = &args.export {
        println!(
            "Exported {} of {} frames to {}",
            host.frames_exported(),
            summary.frames,
            directory.display()
        );
    } else {
        println!("Rendered {} frames", summary.frames);
    }
    Ok(())
}

fn asset_root(args: &RunArgs) -> PathBuf {
    if let Some(root) = &args.assets {
        return root.clone();
    }
    args.config
        .as_deref()
        .and_then(|path| path.parent())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
