//! Catalog command-line entry point.
//!
//! # Responsibility
//! - Without arguments, print a deterministic linkage probe.
//! - With a command, run one `/articles` handler against the configured
//!   database and print `status` and `body`.
//!
//! Commands:
//! - `list [tag]`
//! - `get <id>`
//! - `create <article-json>`
//! - `replace <id> <article-json>`
//! - `delete <id>`

use log::error;
use shop_api::{ApiResponse, ArticleApi};
use shop_core::db::open_db;
use shop_core::{init_logging, ArticleId, ShopConfig};
use std::process::ExitCode;

const USAGE: &str = "usage: shop_cli [list [tag] | get <id> | create <json> | replace <id> <json> | delete <id>]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("shop_core ping={}", shop_core::ping());
        println!("shop_core version={}", shop_core::core_version());
        return ExitCode::SUCCESS;
    }

    let config = ShopConfig::from_env();
    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(&config, &args) {
        Ok(response) => {
            println!("status={}", response.status);
            if !response.body.is_empty() {
                println!("{}", response.body);
            }
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
    }
}

fn run(config: &ShopConfig, args: &[String]) -> Result<ApiResponse, String> {
    let mut conn = open_db(&config.database_path).map_err(|err| {
        error!("event=cli_start module=cli status=error error_code=db_open_failed error={err}");
        format!(
            "failed to open catalog `{}`: {err}",
            config.database_path.display()
        )
    })?;
    let mut api =
        ArticleApi::try_new(&mut conn).map_err(|err| format!("catalog not ready: {err}"))?;

    let command: Vec<&str> = args.iter().map(String::as_str).collect();
    let response = match command.as_slice() {
        ["list"] => api.list(None),
        ["list", tag] => api.list(Some(*tag)),
        ["get", id] => api.get(parse_id(id)?),
        ["create", body] => api.create(body),
        ["replace", id, body] => api.replace(parse_id(id)?, body),
        ["delete", id] => api.delete(parse_id(id)?),
        _ => return Err(USAGE.to_string()),
    };
    Ok(response)
}

fn parse_id(raw: &str) -> Result<ArticleId, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("article id must be an integer, got `{raw}`\n{USAGE}"))
}
