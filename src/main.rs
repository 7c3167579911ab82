use clap::Parser;
use std::io;
use target_csv::utils::error::ErrorSeverity;
use target_csv::utils::logger;
use target_csv::{CliConfig, Draft4ValidatorFactory, TargetEngine};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌 (輸出到 stderr)
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let mut engine = TargetEngine::new(Draft4ValidatorFactory, settings.sink());
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    if let Err(e) = engine.run(stdin.lock(), &mut stdout) {
        tracing::error!(
            "❌ target-csv failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}
