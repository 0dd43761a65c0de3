use clap::Parser;
use gemlock::cli::{Cli, Command};
use gemlock::config::{self, Config};
use gemlock::output::{
    self, CheckEntry, CheckResult, DepsResult, FindResult, ParseOutput, UsesEntry, UsesResult,
};
use gemlock::ruby::{self, Lockfile, LockfileError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose, config.log_level.as_deref());

    let json_output = cli.json;
    let result = match cli.command {
        Some(Command::Parse { path }) => run_parse(&config, path, json_output),
        Some(Command::Find { gem, lockfile }) => run_find(&config, &gem, lockfile, json_output),
        Some(Command::Deps { path }) => run_deps(&config, path, json_output),
        Some(Command::Uses { gem, lockfile }) => run_uses(&config, &gem, lockfile, json_output),
        Some(Command::Check { paths }) => run_check(&config, paths, json_output),
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// RUST_LOG wins; otherwise --verbose, then the configured level, then warn.
fn init_tracing(verbose: bool, config_level: Option<&str>) {
    let default_level = if verbose {
        "debug"
    } else {
        config_level.unwrap_or("warn")
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Use the given path, or search upward for one of the configured names.
fn resolve_lockfile(config: &Config, path: Option<PathBuf>) -> Result<PathBuf, LockfileError> {
    match path {
        Some(path) => Ok(path),
        None => ruby::find_lockfile_path(&config.lockfile_names),
    }
}

fn run_parse(
    config: &Config,
    path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_lockfile(config, path)?;
    let lockfile = ruby::load_lockfile(&path)?;

    if json_output {
        output::print_json(&ParseOutput {
            path: path.display().to_string(),
            lockfile: &lockfile,
        });
        return Ok(());
    }

    print_lockfile(&path, &lockfile);
    Ok(())
}

fn print_lockfile(path: &Path, lockfile: &Lockfile) {
    println!("{}", path.display());

    for source in &lockfile.sources {
        println!("\n{} {}", source.kind, source.remote().unwrap_or("-"));
        for (key, value) in &source.options {
            if key != "remote" {
                println!("  {}: {}", key, value);
            }
        }
        for spec in &source.specs {
            println!("  {} {}", spec.name, spec.resolved_version());
            for dep in &spec.dependencies {
                match &dep.version {
                    Some(version) => println!("    {} {}", dep.name, version),
                    None => println!("    {}", dep.name),
                }
            }
        }
    }

    println!("\nPLATFORMS\n  {}", lockfile.platforms.join(", "));

    println!("\nDEPENDENCIES");
    for dep in &lockfile.dependencies {
        match &dep.version {
            Some(version) => println!("  {} {}", dep.name, version),
            None => println!("  {}", dep.name),
        }
    }
}

fn run_find(
    config: &Config,
    gem: &str,
    lockfile_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_lockfile(config, lockfile_path)?;
    let lockfile = ruby::load_lockfile(&path)?;

    let (source, spec) = lockfile
        .find_spec_with_source(gem)
        .ok_or_else(|| LockfileError::GemNotFound {
            package: gem.to_string(),
        })?;

    if json_output {
        output::print_json(&FindResult {
            gem: spec.name.clone(),
            version: spec.resolved_version().to_string(),
            source: source.kind.to_string(),
            remote: source.remote().map(str::to_string),
        });
    } else {
        println!("{} {}", spec.name, spec.resolved_version());
    }
    Ok(())
}

fn run_deps(
    config: &Config,
    path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_lockfile(config, path)?;
    let lockfile = ruby::load_lockfile(&path)?;
    let dependencies = lockfile.direct_dependencies();

    if json_output {
        output::print_json(&DepsResult {
            path: path.display().to_string(),
            dependencies,
        });
        return Ok(());
    }

    for name in dependencies {
        println!("{}", name);
    }
    Ok(())
}

fn run_uses(
    config: &Config,
    gem: &str,
    lockfile_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_lockfile(config, lockfile_path)?;
    let lockfile = ruby::load_lockfile(&path)?;
    let dependents: Vec<UsesEntry> = lockfile
        .dependents_of(gem)
        .into_iter()
        .map(|(spec, dep)| UsesEntry::new(spec, dep))
        .collect();

    if json_output {
        output::print_json(&UsesResult {
            gem: gem.to_string(),
            dependents,
        });
        return Ok(());
    }

    if dependents.is_empty() {
        println!("No gems depend on {}", gem);
        return Ok(());
    }

    for entry in dependents {
        match entry.requirement {
            Some(requirement) => println!("{} {} requires {}", entry.name, entry.version, requirement),
            None => println!("{} {}", entry.name, entry.version),
        }
    }
    Ok(())
}

/// Parse every lockfile and keep going past failures; a bad file is
/// reported, not fatal to the rest.
fn run_check(
    config: &Config,
    paths: Vec<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = if !paths.is_empty() {
        paths
    } else if !config.watch.is_empty() {
        config.watch.clone()
    } else {
        vec![ruby::find_lockfile_path(&config.lockfile_names)?]
    };

    let mut entries = Vec::with_capacity(paths.len());
    for path in &paths {
        debug!(path = %path.display(), "checking lockfile");
        let entry = match ruby::load_lockfile(path) {
            Ok(lockfile) => CheckEntry::ok(path, &lockfile),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "lockfile failed to parse");
                CheckEntry::failed(path, &err)
            }
        };
        entries.push(entry);
    }

    let failed = entries.iter().filter(|entry| !entry.ok).count();

    if json_output {
        output::print_json(&CheckResult {
            files: entries,
            failed,
        });
    } else {
        for entry in &entries {
            match (&entry.error, entry.specs) {
                (Some(error), _) => println!("FAIL {}: {}", entry.path, error),
                (None, Some(specs)) => println!("ok   {} ({} specs)", entry.path, specs),
                (None, None) => println!("ok   {}", entry.path),
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} lockfiles failed to parse", failed, paths.len()).into());
    }
    Ok(())
}
