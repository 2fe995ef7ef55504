use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "skytext",
    author,
    version,
    about = "Animated 3D text over a procedural plasma sky",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scene to run (defaults to the configured default scene).
    #[arg(value_name = "SCENE")]
    pub scene: Option<String>,

    /// Extra scene file layered over the built-in and user scenes.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory that relative asset paths are resolved against.
    #[arg(long, value_name = "DIR", env = "SKYTEXT_ASSETS_DIR")]
    pub assets: Option<PathBuf>,

    /// Stop after rendering this many frames (runs until killed otherwise).
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,

    /// Render resolution (e.g. `640x360`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Frame rate cap; overrides the scene's frame interval (0=uncapped).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Write rendered frames as PNG files into this directory.
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Export only every n-th frame.
    #[arg(long, value_name = "N", default_value_t = 1, requires = "export")]
    pub export_every: u32,

    /// Rebuild the pulsing text mesh every frame instead of only editing its parameters.
    #[arg(long)]
    pub regenerate_geometry: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect built-in and user scenes.
    Scenes(ScenesCommand),
}

#[derive(Parser, Debug)]
pub struct ScenesCommand {
    #[command(subcommand)]
    pub action: ScenesAction,
}

#[derive(Subcommand, Debug)]
pub enum ScenesAction {
    /// List every known scene; the default is marked with `*`.
    List,
    /// Print the resolved scene as TOML.
    Show {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height".to_string())?;
    if width == 0 || height == 0 {
        return Err("dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps = value
        .trim()
        .parse::<f32>()
        .map_err(|_| "invalid frame rate".to_string())?;
    if !fps.is_finite() || fps < 0.0 {
        return Err("frame rate must be a finite, non-negative number".into());
    }
    if fps > 0.0 {
        Duration::try_from_secs_f32(1.0 / fps)
            .map_err(|_| format!("frame rate {fps} is too low"))?;
    }
    Ok(fps)
}
