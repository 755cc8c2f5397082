use clap::Parser;
use places_enrich::core::loader::load_table;
use places_enrich::core::preflight::run_preflight;
use places_enrich::utils::error::{EnrichError, ErrorSeverity};
use places_enrich::utils::{logger, prompt, validation::Validate};
use places_enrich::{
    CliConfig, EnrichEngine, GeminiClient, GooglePlacesClient, LocalStorage, TomlConfig,
};
use std::io;
use std::time::Duration;

fn exit_code(e: &EnrichError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(context: &str, e: &EnrichError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e).max(1));
}

fn cancelled() -> ! {
    println!("Operation cancelled by user.");
    std::process::exit(0);
}

fn load_settings(config: &CliConfig) -> places_enrich::Result<TomlConfig> {
    let settings = match &config.config {
        Some(path) => {
            tracing::info!("📋 Loading settings from {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };

    let mut settings = settings.with_env_credentials();
    if let Some(pacing_ms) = config.pacing_ms {
        settings.run.pacing_ms = pacing_ms;
    }
    settings.validate()?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting enrich CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = match load_settings(&config) {
        Ok(settings) => settings,
        Err(e) => fail("Settings could not be loaded", &e),
    };

    let places_key = settings.places.api_key.clone();
    let gemini_key = settings.generator.api_key.clone();
    if places_key.is_none() {
        tracing::warn!("⚠️ GOOGLE_MAPS_API_KEY is not set");
    }
    if gemini_key.is_none() {
        tracing::warn!("⚠️ GEMINI_API_KEY is not set");
    }

    let places = match GooglePlacesClient::new(
        &settings.places.endpoint,
        places_key.as_deref().unwrap_or_default(),
        Duration::from_secs(settings.places.timeout_seconds),
    ) {
        Ok(client) => client,
        Err(e) => fail("Places client could not be created", &e),
    };
    let generator = match GeminiClient::new(
        &settings.generator.endpoint,
        gemini_key.as_deref().unwrap_or_default(),
        Duration::from_secs(settings.generator.timeout_seconds),
    ) {
        Ok(client) => client,
        Err(e) => fail("Gemini client could not be created", &e),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    if !config.skip_preflight {
        let report = run_preflight(
            places_key.as_ref().map(|_| &places),
            gemini_key.as_ref().map(|_| &generator),
            &settings.generator,
        )
        .await;

        if !report.all_passed() {
            if config.yes {
                tracing::warn!("⚠️ Continuing despite failed API key checks (--yes)");
            } else if !prompt::confirm(&mut input, &mut output, "Do you want to continue anyway?")? {
                cancelled();
            }
        }
    }

    let mut limit = config.limit;
    if !config.yes {
        if !prompt::confirm(
            &mut input,
            &mut output,
            "Do you want to proceed with processing businesses?",
        )? {
            cancelled();
        }
        if limit.is_none() {
            limit = prompt::ask_limit(&mut input, &mut output)?;
        }
    }

    let storage = LocalStorage::default();
    let mut table = match load_table(&storage, &config.input).await {
        Ok(table) => table,
        Err(e) => fail("Input could not be loaded", &e),
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    let engine = EnrichEngine::new(storage, places, generator, &settings, config.output.clone())
        .with_monitoring(config.monitor);

    let summary = engine.run(&mut table, limit).await;

    tracing::info!(
        "📈 Success: {}, Partial (no maps data): {}, Partial (no description): {}, Failed: {}",
        summary.success,
        summary.partial_no_maps_data,
        summary.partial_no_description,
        summary.failed
    );
    if summary.checkpoint_failures > 0 {
        tracing::warn!(
            "⚠️ {} checkpoint writes failed; the output may be out of date",
            summary.checkpoint_failures
        );
    }
    println!(
        "✅ Successfully processed {} out of {} businesses in {}s",
        summary.success,
        summary.processed,
        summary.elapsed().num_seconds()
    );
    println!("📁 Output saved to: {}", config.output);

    Ok(())
}
