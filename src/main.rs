#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use yansi::Paint;

use crate::application::app::App;
use crate::application::cli;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::UploadPolicy;
use crate::domain::models::DEFAULT_MAX_UPLOAD_BYTES;
use crate::infrastructure::gateway::GatewayManager;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! SolveX has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
        eprintln!("\nSet RUST_LOG=solvex to write a debug log to {}", debug_log_dir());
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn debug_log_dir() -> String {
    return env::var("SOLVEX_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("solvex")
            .to_string_lossy()
            .to_string();
    });
}

async fn run() -> Result<bool, Error> {
    let task = match cli::parse().await? {
        Some(task) => task,
        None => return Ok(true),
    };

    let max_bytes = Config::get(ConfigKey::MaxUploadBytes)
        .parse::<u64>()
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

    let mut app = App::new(GatewayManager::get()?, UploadPolicy::with_max_bytes(max_bytes));
    return app.run(task).await;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let file_appender = tracing_appender::rolling::never(debug_log_dir(), "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("solvex")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    match run().await {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(err) => handle_error(err),
    }
}
