use std::{env, path::PathBuf};

use clap::Parser;
use cli::{Args, Commands};
use error::{CliError, CliResult, ErrorContext};
use logging::setup_logging;
use pkgidx_config::config::{self, generate_default_config, get_config, set_config_path};
use pkgidx_dl::http_client::configure_http_client;
use pkgidx_operations::IndexSelector;
use pkgidx_registry::FetchSelection;
use pkgidx_utils::path::resolve_path;
use process::Action;
use tracing::info;
use ureq::Proxy;
use utils::{set_color, set_progress};

mod cli;
mod context;
mod error;
mod fetch;
mod logging;
mod process;
mod progress;
mod query;
mod serve;
mod utils;

fn absolute(path: &str) -> CliResult<PathBuf> {
    let path = resolve_path(path)?;
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(env::current_dir()
        .with_context(|| "retrieving current directory".into())?
        .join(path))
}

fn data_root(data: Option<String>) -> CliResult<PathBuf> {
    match data {
        Some(data) => absolute(&data),
        None => Ok(get_config().get_data_path()?),
    }
}

async fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_color(false);
    }

    if args.no_progress {
        set_progress(false);
    }

    if let Some(ref c) = args.config {
        set_config_path(absolute(c)?);
    }

    let proxy = match args.proxy.as_deref() {
        Some(proxy) => {
            Some(Proxy::new(proxy).map_err(|err| {
                CliError::InvalidProxy {
                    proxy: proxy.to_string(),
                    reason: err.to_string(),
                }
            })?)
        }
        None => None,
    };
    let user_agent = args.user_agent.clone();

    configure_http_client(|config| {
        if proxy.is_some() {
            config.proxy = proxy;
        }

        if let Some(user_agent) = user_agent {
            config.user_agent = Some(user_agent);
        }
    });

    match args.command {
        Commands::DefConfig => {
            generate_default_config()?;
        }
        command => {
            config::init()?;

            match command {
                Commands::Fetch {
                    base_url,
                    codenames,
                    branches,
                    architectures,
                    output,
                } => {
                    let selection = FetchSelection {
                        codenames,
                        branches,
                        architectures,
                    };
                    fetch::fetch(base_url, selection, &absolute(&output)?)?;
                }
                Commands::Normalize {
                    input,
                    output,
                    recursive,
                } => {
                    process::process(
                        Action::Normalize,
                        &absolute(&input)?,
                        &absolute(&output)?,
                        recursive,
                    )?;
                }
                Commands::Parse {
                    input,
                    output,
                    recursive,
                    normalize,
                } => {
                    process::process(
                        Action::Parse {
                            normalize_first: normalize,
                        },
                        &absolute(&input)?,
                        &absolute(&output)?,
                        recursive,
                    )?;
                }
                Commands::Query {
                    branch,
                    architecture,
                    codename,
                    package,
                    data,
                } => {
                    let selector = IndexSelector {
                        codename,
                        branch,
                        architecture,
                    };
                    query::query(&data_root(data)?, &selector, package.as_deref())?;
                }
                Commands::Serve {
                    bind,
                    data,
                } => {
                    let bind = bind.unwrap_or_else(|| get_config().server.bind().to_string());
                    serve::serve(&bind, data_root(data)?).await?;
                }
                Commands::Config => {
                    let content = toml::to_string_pretty(&get_config())?;
                    info!("{}", content);
                }
                Commands::DefConfig => {}
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
