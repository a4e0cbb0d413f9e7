//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, LayoutController};
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::surface::{frame_to_tree, JsonFrameSurface};
use crate::infrastructure::traits::{RecordingSurface, RenderSurface};

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { tree }) => cmd_show(cli, tree),
        Some(Commands::Layout { tree, pretty }) => cmd_layout(cli, tree, *pretty),
        Some(Commands::Stats { file, root }) => {
            let args = TreeArgs {
                file: file.clone(),
                root: *root,
                ..TreeArgs::default()
            };
            cmd_stats(cli, &args)
        }
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn container(cli: &Cli, args: &TreeArgs) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(file) = &args.file {
        settings.data_file = file.clone();
    }
    debug!("data_file: {}", settings.data_file.display());
    Ok(ServiceContainer::new(settings))
}

/// Build the controller, render the first frame and replay the toggles.
fn run_session<S: RenderSurface>(
    services: &ServiceContainer,
    args: &TreeArgs,
    surface: S,
) -> CliResult<LayoutController<S>> {
    let tree = services.load_tree(args.root)?;
    let mut controller = services.controller(tree, surface);
    controller.render_initial()?;
    if args.collapsed {
        controller.collapse_all()?;
    }
    for node in &args.toggle {
        controller.toggle_by_number(*node)?;
    }
    Ok(controller)
}

#[instrument(skip(cli))]
fn cmd_show(cli: &Cli, args: &TreeArgs) -> CliResult<()> {
    let services = container(cli, args)?;
    let controller = run_session(&services, args, RecordingSurface::new())?;
    let frame = controller.surface().last_frame().ok_or_else(|| {
        ApplicationError::InvalidState("no frame was rendered".to_string())
    })?;
    output::info(&frame_to_tree(frame));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_layout(cli: &Cli, args: &TreeArgs, pretty: bool) -> CliResult<()> {
    let services = container(cli, args)?;
    run_session(&services, args, JsonFrameSurface::new(io::stdout().lock(), pretty))?;
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_stats(cli: &Cli, args: &TreeArgs) -> CliResult<()> {
    let services = container(cli, args)?;
    let tree = services.load_tree(args.root)?;
    output::header(&services.source.describe());
    output::action("nodes", &tree.len());
    output::action("internal", &tree.internal_count());
    output::action("leaves", &tree.leaf_count());
    output::action("height", &tree.height());
    output::action("max label", &tree.max_label_len());
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("cannot determine global config directory"),
            }
            let cwd = std::env::current_dir()
                .map_err(|e| crate::infrastructure::InfraError::io("current directory", e))?;
            output::action("local", &local_config_path(&cwd).display());
        }
    }
    Ok(())
}
