// SPDX-License-Identifier: MPL-2.0
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::path::PathBuf;
use story_lens::app::{self, Flags};
use story_lens::catalog::StoryCatalog;
use story_lens::config::paths;

const HELP: &str = "\
Usage: story_lens <catalog.toml> [OPTIONS]

Options:
  --story <USER_ID>   Open the story published by USER_ID
  --start <INDEX>     Start at item INDEX (zero-based, clamped)
  --reduced-motion    Never auto-advance images and text
  --config-dir <DIR>  Read settings.toml from DIR
  -h, --help          Print this help
";

fn init_logger() {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        Builder::new()
            .target(Target::Stderr)
            .filter_level(LevelFilter::Warn)
            .filter_module("story_lens", LevelFilter::Info)
            .init();
    }
}

struct Args {
    catalog: PathBuf,
    story: Option<String>,
    start: usize,
    reduced_motion: bool,
    config_dir: Option<String>,
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let story = args.opt_value_from_str("--story")?;
    let start = args.opt_value_from_str("--start")?.unwrap_or(0);
    let reduced_motion = args.contains("--reduced-motion");
    let config_dir = args.opt_value_from_str("--config-dir")?;
    let catalog: PathBuf = args.free_from_str()?;

    let rest = args.finish();
    if !rest.is_empty() {
        log::warn!("ignoring extra arguments: {rest:?}");
    }

    Ok(Some(Args {
        catalog,
        story,
        start,
        reduced_motion,
        config_dir,
    }))
}

fn main() -> iced::Result {
    init_logger();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{HELP}");
            return Ok(());
        }
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            std::process::exit(2);
        }
    };

    paths::init_cli_override(args.config_dir);

    let catalog = match StoryCatalog::load_from_path(&args.catalog) {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => {
            log::error!("{} contains no stories", args.catalog.display());
            std::process::exit(1);
        }
        Err(err) => {
            log::error!("cannot load {}: {err}", args.catalog.display());
            std::process::exit(1);
        }
    };

    app::run(Flags {
        catalog,
        story: args.story,
        start_index: args.start,
        reduced_motion: args.reduced_motion,
    })
}
