mod assets;
mod catalog;
mod cli;
mod paths;
mod run;

use anyhow::{anyhow, Context, Result};
use catalog::Catalog;
use cli::{Command, ScenesAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Scenes(scenes)) => handle_scenes_command(scenes.action, &cli.run),
        None => run::run(cli.run),
    }
}

fn handle_scenes_command(action: ScenesAction, args: &cli::RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let catalog = Catalog::load(&paths, args.config.as_deref())?;

    match action {
        ScenesAction::List => {
            let default = catalog.file().default_scene();
            println!("Scenes:");
            for (name, origin, scene) in catalog.entries() {
                let marker = if Some(name) == default { "*" } else { " " };
                println!(
                    "{marker} {name:<12} {:<8} {}",
                    origin.to_string(),
                    scene.description.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        ScenesAction::Show { name } => {
            let scene = catalog
                .file()
                .scene(&name)
                .ok_or_else(|| anyhow!("unknown scene '{name}'"))?;
            let rendered =
                toml::to_string_pretty(scene).context("failed to render scene as TOML")?;
            print!("{rendered}");
            Ok(())
        }
    }
}
