use anyhow::Context;
use clap::Parser;
use serde_json::json;

use wirekit::app::Application;
use wirekit::args::{Args, Command};
use wirekit::auth::LoginRequest;
use wirekit::config::AppConfig;
use wirekit::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    let logging = match &args.log_level {
        Some(level) => LoggingConfig::from_strings(level, &config.logging.format)?,
        None => config.logging.to_logging_config()?,
    };
    init_logging(logging).map_err(|e| anyhow::anyhow!(e))?;

    match args.command {
        Command::Graph => {
            // 只做静态检查，不执行工厂
            let app = Application::build(config).context("invalid wiring")?;
            let graph = app.container().dependency_graph();
            let order = graph.initialization_order()?;
            if args.json {
                let output = json!({
                    "bindings": graph,
                    "initialization_order": order,
                    "stats": app.container().stats(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for name in &order {
                    println!("{name}");
                }
                println!("{}", app.container().stats().summary());
            }
        }
        Command::Login { username, password } => {
            let app = Application::start(config).await.context("startup wiring failed")?;
            let controller = app.controller().await?;
            let issued = controller
                .create_token(LoginRequest { username, password })
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&issued)?);
            } else {
                println!("{}", issued.token);
            }
        }
        Command::Check { token } => {
            let app = Application::start(config).await.context("startup wiring failed")?;
            let controller = app.controller().await?;
            let user = controller.check_token(&token).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("{}", user.username);
            }
        }
        Command::Session { username, password } => {
            let app = Application::start(config).await.context("startup wiring failed")?;
            let controller = app.controller().await?;
            let issued = controller
                .create_token(LoginRequest { username, password })
                .await?;
            let user = controller.check_token(&issued.token).await?;
            if args.json {
                let output = json!({
                    "token": issued,
                    "user": user,
                    "stats": app.container().stats(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{} -> {}", issued.token, user.username);
                println!("{}", app.container().stats().summary());
            }
        }
    }

    Ok(())
}
