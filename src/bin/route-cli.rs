//! Inspect the routes a configuration produces without serving them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use chain_router::config::load_config;
use chain_router::dispatch::DispatchTarget;
use chain_router::lifecycle::Application;
use chain_router::routing::{RequestContext, RouteParams};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect, match and generate chain router routes", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config/app.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every route, grouped by module in chain order
    Routes,
    /// Resolve a path the way the server would
    Match {
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Generate the URI of a named route
    Generate {
        name: String,
        /// Parameters as key=value
        params: Vec<String>,
        #[arg(long)]
        absolute: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let mut app = Application::new(config);
    app.boot()?;

    match cli.command {
        Commands::Routes => {
            let router = app.router().ok_or("application did not boot")?;
            for (module, engine, routes) in router.routes() {
                println!("{} ({})", module, engine);
                for route in routes {
                    let methods = if route.methods.is_empty() {
                        "ANY".to_string()
                    } else {
                        route.methods.join("|")
                    };
                    println!(
                        "  {:<24} {:<8} {:<32} {}",
                        route.name,
                        methods,
                        route.path,
                        route.controller.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Commands::Match { path, method } => {
            let context = app.config().context.to_context().with_method(method);
            let target = resolve(&mut app, &path, context)?;
            println!("{}", serde_json::to_string_pretty(&target)?);
        }
        Commands::Generate { name, params, absolute } => {
            let params = parse_params(&params)?;
            let router = app.router().ok_or("application did not boot")?;
            if absolute {
                println!("{}", router.generate_absolute(&name, &params)?);
            } else {
                println!("{}", router.generate(&name, &params)?);
            }
        }
    }

    Ok(())
}

fn resolve(
    app: &mut Application,
    path: &str,
    context: RequestContext,
) -> Result<DispatchTarget, Box<dyn std::error::Error>> {
    let coordinator = app.coordinator_mut().ok_or("application did not boot")?;
    coordinator.set_context(context);
    Ok(coordinator.resolve(path)?)
}

fn parse_params(raw: &[String]) -> Result<RouteParams, String> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("expected key=value, got \"{}\"", pair))
        })
        .collect()
}
