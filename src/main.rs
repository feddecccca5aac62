//! conf-migrate command-line entry point.

use anyhow::{Context, Result, bail};
use clap::Parser;
use conf_migrate::artifact::Artifact;
use conf_migrate::cli::fix::FixArgs;
use conf_migrate::cli::show::{ShowArgs, ShowFormat};
use conf_migrate::cli::{Cli, Command};
use conf_migrate::config::{Config, ConfigLoader};
use conf_migrate::logging::{self, LogTarget};
use conf_migrate::provider::{LocalFileProvider, Porter, RemoteFileProvider, SshExec};
use conf_migrate::server::Server;
use regex_lite::Regex;
use std::path::Path;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(Path::new(path))?,
        None => ConfigLoader::load()?,
    };
    for source in loader.sources() {
        debug!(path = %source.display(), "config source");
    }

    // CLI flags override every config tier
    let config = loader.config_mut();
    if let Some(host) = &cli.host {
        config.connection.host = Some(host.clone());
    }
    if let Some(user) = &cli.user {
        config.connection.user = Some(user.clone());
    }
    if let Some(keyfile) = &cli.keyfile {
        config.connection.keyfile = Some(keyfile.clone());
    }
    if let Some(root) = &cli.apps_root {
        config.apps.root = root.clone();
    }
    let config = loader.into_config();

    match cli.command {
        Command::Print { file } => run_print(&file),
        Command::Fix(args) => run_fix(&args),
        command => {
            if config.connection.is_remote() {
                let connection = &config.connection;
                let ssh = SshExec::new(
                    connection.host.as_deref(),
                    connection.user.as_deref(),
                    connection.keyfile.as_deref(),
                    connection.port,
                )?;
                info!(host = ?connection.host, "using remote host");
                let server = Server::new(Porter::new(ssh), &config.apps.root)?;
                run_apps(server, &config, command)
            } else {
                let root = local_root(&config.apps.root)?;
                let server = Server::new(LocalFileProvider, &root)?;
                run_apps(server, &config, command)
            }
        }
    }
}

/// Absolute form of a local apps root.
fn local_root(root: &str) -> Result<String> {
    let path = Path::new(root);
    if path.is_absolute() {
        return Ok(root.to_string());
    }
    let cwd = std::env::current_dir().context("resolving apps root")?;
    Ok(cwd.join(path).to_string_lossy().into_owned())
}

fn run_apps<P: RemoteFileProvider>(
    mut server: Server<P>,
    config: &Config,
    command: Command,
) -> Result<()> {
    match command {
        Command::List { app } => {
            let targets = targets(config, app.as_deref())?;
            for name in &targets {
                let application = server.list(name)?;
                if targets.len() > 1 {
                    println!("# {}", name);
                }
                for path in application.paths() {
                    println!("{}", path);
                }
            }
            Ok(())
        }
        Command::Show(args) => run_show(&mut server, config, &args),
        Command::Print { .. } | Command::Fix(_) => Ok(()),
    }
}

/// Named application, or `apps.migrate` when none was named.
fn targets(config: &Config, requested: Option<&str>) -> Result<Vec<String>> {
    let targets = config.apps.targets(requested);
    if targets.is_empty() {
        bail!("no application given and apps.migrate is empty");
    }
    Ok(targets)
}

fn run_show<P: RemoteFileProvider>(
    server: &mut Server<P>,
    config: &Config,
    args: &ShowArgs,
) -> Result<()> {
    let filter = match &args.filter {
        Some(pattern) => Some(
            Regex::new(pattern).with_context(|| format!("invalid --filter {:?}", pattern))?,
        ),
        None => config.apps.filter_regex()?,
    };

    for name in targets(config, args.app.as_deref())? {
        let application = server.fetch(&name, filter.as_ref())?;
        match args.format {
            ShowFormat::Paths => {
                for (path, node) in application.each(filter.as_ref()) {
                    let state = if node.is_unset() { "unset" } else { "set" };
                    println!("{}\t{}/{}", state, name, path);
                }
            }
            ShowFormat::Tree => {
                let mut keyed = serde_json::Map::new();
                keyed.insert(name.clone(), application.tree().to_json());
                println!("{}", serde_json::to_string_pretty(&keyed)?);
            }
            ShowFormat::Print => {
                for (path, out) in application.print_all() {
                    println!("# {}/{}", name, path);
                    print!("{}", out);
                    if !out.ends_with('\n') {
                        println!();
                    }
                }
            }
        }
    }
    Ok(())
}

fn read_artifact(file: &str) -> Result<Artifact> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file))?;
    Ok(Artifact::for_file(file, content))
}

fn run_print(file: &str) -> Result<()> {
    let artifact = read_artifact(file)?;
    debug!(file, kind = %artifact.kind(), data = artifact.data().label(), "parsed");
    print!("{}", artifact.print());
    Ok(())
}

fn run_fix(args: &FixArgs) -> Result<()> {
    let mut artifact = read_artifact(&args.file)?;
    if !args.apply(&mut artifact) {
        bail!(
            "no key {:?} in stanza [{}] of {}",
            args.key,
            args.stanza,
            args.file
        );
    }

    let out = artifact.print();
    if args.dry_run {
        print!("{}", out);
    } else {
        std::fs::write(&args.file, out).with_context(|| format!("writing {}", args.file))?;
        info!(file = %args.file, stanza = %args.stanza, key = %args.key, "fixed");
    }
    Ok(())
}
