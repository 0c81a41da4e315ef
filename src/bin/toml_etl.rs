use clap::Parser;
use shengyun_etl::config::toml_config::TomlConfig;
use shengyun_etl::config::Job;
use shengyun_etl::domain::ports::ConfigProvider;
use shengyun_etl::run_job;
use shengyun_etl::utils::{logger, validation::Validate};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Run a shengyun job described by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "shengyun.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(config.log_format(), args.verbose);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    let job = config.to_job()?;

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &job, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&job).await;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let job_name = job.name();
    match run_job(job, config.output_settings(), monitor_enabled).await {
        Ok(output_path) => {
            println!("✅ {} finished", job_name);
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Job failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, job: &Job, args: &Args) {
    let formats: Vec<&str> = config.output_formats().iter().map(|f| f.extension()).collect();

    println!("📋 Configuration Summary:");
    println!("  Job: {}", job.name());
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", formats.join(", "));
    if config.compress() {
        println!("  Compression: {} (ZIP)", config.archive_name());
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

/// 工作會讀取的所有輸入檔
fn input_files(job: &Job) -> Vec<(&'static str, &str)> {
    let mut files: Vec<(&'static str, &str)> = Vec::new();
    match job {
        Job::Extract(settings) => {
            files.extend(settings.surveys.iter().map(|s| ("survey", s.as_str())));
        }
        Job::Examples(settings) => {
            files.push(("examples", settings.workbook.as_str()));
            files.extend(settings.surveys.iter().map(|s| ("survey", s.as_str())));
        }
        Job::Arrange {
            settings,
            locations,
        } => {
            files.push(("hierarchy", settings.workbook.as_str()));
            files.push(("abbreviations", locations.abbreviations.as_str()));
            files.extend(settings.surveys.iter().map(|s| ("survey", s.as_str())));
        }
        Job::Frequency {
            settings,
            locations,
        } => {
            files.push(("statistics", settings.statistics.as_str()));
            if let Some(order) = &settings.order_workbook {
                files.push(("order", order.as_str()));
            }
            files.push(("abbreviations", locations.abbreviations.as_str()));
        }
    }
    if let Job::Arrange { locations, .. } | Job::Frequency { locations, .. } = job {
        let script = &locations.script;
        files.extend(
            script
                .s2t
                .iter()
                .chain(&script.t2s)
                .chain(&script.variants)
                .map(|s| ("dictionary", s.as_str())),
        );
    }
    files
}

async fn perform_dry_run(job: &Job) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📂 Input Files:");
    let mut missing = 0usize;
    for (kind, path) in input_files(job) {
        let exists = tokio::fs::try_exists(path).await.unwrap_or(false);
        if !exists {
            missing += 1;
        }
        println!("  {} {:<14} {}", if exists { "✅" } else { "❌" }, kind, path);
    }

    println!();
    if missing > 0 {
        println!("⚠️ {} input files not found", missing);
    } else {
        println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
    }
}
