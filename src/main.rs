// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Duration;

use anyhow::{bail, Context};
use tapline::binding::{JsonLinesViewFactory, TapBinding, TapViewFactory};
use tapline::chain::{LoggingMessageListener, ProcessingChain};
use tapline::config::{load_and_validate_config, ChainBuilder};
use tapline::observability::init_tracing;
use tapline::tap::TapGroup;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Parsed command line.
struct Args {
    config_file: String,
    list_only: bool,
    timeout: Option<Duration>,
    /// `module/group` or `module/group/tap`
    selections: Vec<String>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {0} <config.yaml|config.toml> [--list] [--timeout <seconds>] [module/group[/tap] ...]\n\
         Example: {0} configs/c4fm-sync.yaml \"c4fm/Symbol Timing\" \"c4fm/Sync Detector/Dibit Stream\"\n\
         List:    {0} configs/c4fm-sync.yaml --list",
        program
    )
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let program = args.first().map(String::as_str).unwrap_or("tapline");
    let mut rest = args.iter().skip(1);
    let Some(config_file) = rest.next() else {
        bail!(usage(program));
    };

    let mut parsed = Args {
        config_file: config_file.clone(),
        list_only: false,
        timeout: None,
        selections: Vec::new(),
    };
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--list" => parsed.list_only = true,
            "--timeout" => {
                let seconds: f64 = rest
                    .next()
                    .context("--timeout needs a value")?
                    .parse()
                    .context("--timeout must be a number of seconds")?;
                parsed.timeout = Some(Duration::from_secs_f64(seconds));
            }
            _ => parsed.selections.push(arg.clone()),
        }
    }
    Ok(parsed)
}

fn print_menu(menu: &[(String, TapGroup)]) {
    println!("📋 Available taps:");
    for (module_id, group) in menu {
        println!("  {}/{}", module_id, group.name());
        for tap in group {
            println!("      {:<16} {:<22} batch={}", tap.name(), tap.tap_type().as_str(), tap.batch_size());
        }
    }
}

/// Apply one `module/group[/tap]` selection.
fn apply_selection(
    binding: &TapBinding,
    menu: &[(String, TapGroup)],
    selection: &str,
    views: &dyn TapViewFactory,
) -> anyhow::Result<()> {
    let mut parts = selection.splitn(3, '/');
    let (Some(module_id), Some(group_name)) = (parts.next(), parts.next()) else {
        bail!("selection '{}' must look like module/group[/tap]", selection);
    };
    let group = menu
        .iter()
        .find(|(id, group)| id == module_id && group.name() == group_name)
        .map(|(_, group)| group)
        .with_context(|| format!("module '{}' has no tap group '{}'", module_id, group_name))?;

    match parts.next() {
        Some(tap_name) => {
            let tap = group
                .find_by_name(tap_name)
                .with_context(|| format!("group '{}' has no tap '{}'", group_name, tap_name))?;
            binding.toggle(module_id, tap, views)?;
        }
        None => {
            binding.select_all(module_id, group, views)?;
        }
    }
    Ok(())
}

async fn run_until_done(chain: &ProcessingChain, timeout: Option<Duration>) {
    let exhausted = async {
        while chain.is_producing() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    let deadline = async {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = exhausted => eprintln!("🏁 Source exhausted"),
        _ = deadline => eprintln!("⏱️  Timeout reached"),
        _ = tokio::signal::ctrl_c() => eprintln!("🛑 Interrupted"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args)?;

    let config = load_and_validate_config(&args.config_file)
        .with_context(|| format!("loading {}", args.config_file))?;
    init_tracing(&config.logging);

    let mut chain = ChainBuilder::from_config(&config)?;
    chain.add_message_listener(std::sync::Arc::new(LoggingMessageListener))?;

    let binding = TapBinding::new(chain.modules());
    let menu = binding.menu();
    if args.list_only {
        print_menu(&menu);
        return Ok(());
    }

    let views = JsonLinesViewFactory::stdout();
    for selection in &args.selections {
        apply_selection(&binding, &menu, selection, &views)?;
    }
    for (module_id, tap) in binding.selected() {
        eprintln!("🔌 Tap selected: {}/{}", module_id, tap);
    }

    chain.start()?;
    run_until_done(&chain, args.timeout).await;
    let tap_stats = binding.tap_stats();
    chain.stop()?;

    let stats = chain.stats();
    eprintln!(
        "📊 {} buffers, {} samples, {} messages",
        stats.buffers_processed, stats.samples_processed, stats.messages_emitted
    );
    for (module_id, tap) in tap_stats {
        eprintln!(
            "   {}/{}: {} units delivered, {} failed deliveries",
            module_id, tap.tap, tap.delivered_units, tap.failed_deliveries
        );
    }
    Ok(())
}
