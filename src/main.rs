use clap::Parser;
use ruleset_merge::core::ConfigProvider;
use ruleset_merge::domain::model::OutputTarget;
use ruleset_merge::utils::{logger, validation::Validate};
use ruleset_merge::{run_job, CliArgs, RulesetConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match RulesetConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load config: {}", e);
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
        tracing::info!("🔧 Output directory overridden to: {}", dir);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    if args.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    match run_job(config).await {
        Ok(written) => {
            tracing::info!("✅ Ruleset run completed, {} files written", written.len());
            for path in &written {
                println!("{}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Ruleset run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn print_dry_run(config: &RulesetConfig) {
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Output: {}", config.output_dir());
    let targets: Vec<&str> = config.targets().iter().map(OutputTarget::id).collect();
    println!("  Targets: {}", targets.join(", "));
    println!("  Concurrent Requests: {}", config.concurrent_requests());
    println!("  Timeout: {}s", config.timeout_seconds());
    if let Some(mirror) = config.mirror() {
        println!("  Mirror: {} -> {}", mirror.root_url, mirror.dest);
    }

    for group in config.groups() {
        println!();
        println!("🧩 {}", group.name);
        for source in &group.sources {
            println!("  ← {} ({})", source.name, source.url);
        }
        for target in config.targets() {
            println!("  → {}", group.file_name(target));
        }
    }

    println!();
    println!("🔍 Dry run complete. Nothing was fetched or written.");
}
