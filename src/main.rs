use clap::{Arg, ArgMatches, Command};
use fraud_fusion::batch;
use fraud_fusion::{Context, EngineConfig, FusionEngine, FusionResult, MediaReference};
use log::LevelFilter;
use std::fs;
use std::io::{self, BufReader, Write};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("fraud-fusion")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fraud-risk scoring for financial-promotion links")
        .long_about("Scores a submitted URL plus optional message context:\n\
                    • lexical URL analysis (patterns, entropy, typosquats, known domains)\n\
                    • advisor identity, social coordination and app impersonation checks\n\
                    • media fabrication and announcement credibility checks\n\
                    • weighted fusion into a low/medium/high label with top signals")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Engine configuration file (built-in defaults when omitted)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default configuration to FILE and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("URL to score")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("context")
                .long("context")
                .value_name("FILE")
                .help("JSON file holding the message context for --url")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .value_name("NAME")
                .help("Channel the URL was shared on"),
        )
        .arg(
            Arg::new("text")
                .long("text")
                .value_name("TEXT")
                .help("Message text accompanying the URL"),
        )
        .arg(
            Arg::new("mention")
                .long("mention")
                .value_name("HANDLE")
                .help("Mentioned advisor handle (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("ticker")
                .long("ticker")
                .value_name("SYMBOL")
                .help("Mentioned stock ticker (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("app")
                .long("app")
                .value_name("NAME")
                .help("Trading app promoted in the message"),
        )
        .arg(
            Arg::new("media")
                .long("media")
                .value_name("KIND[:HASH]")
                .help("Attached media item (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Score a JSON Lines file of {\"url\", \"context\"} requests")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("explain")
                .long("explain")
                .help("Print a human-readable summary instead of JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print JSON output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-signal detail")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config = match load_config(matches.get_one::<String>("config")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("🔍 Testing configuration...");
        println!("Suspicious URL patterns: {}", config.suspicious_patterns.len());
        println!("Known malicious domains: {}", config.malicious_domains.len());
        println!("Brand tokens: {}", config.brand_tokens.len());
        println!("Legitimate apps: {}", config.legitimate_apps.len());
        println!("Registered advisors: {}", config.advisor_registry.len());
        println!("Observed posting clusters: {}", config.posting_clusters.len());
        println!("✅ Configuration is valid");
        return;
    }

    let engine = Arc::new(FusionEngine::from_config(&config));

    if let Some(batch_file) = matches.get_one::<String>("batch") {
        if let Err(e) = run_batch(engine, batch_file, &matches).await {
            eprintln!("❌ Batch scoring failed: {e:#}");
            process::exit(1);
        }
        return;
    }

    let Some(url) = matches.get_one::<String>("url") else {
        eprintln!("Nothing to score: pass --url or --batch (see --help)");
        process::exit(1);
    };

    let context = match build_context(&matches) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("❌ Error reading context: {e:#}");
            process::exit(1);
        }
    };

    let result = engine.score(url, context.as_ref());
    if matches.get_flag("explain") {
        print_explanation(&result);
    } else if let Err(e) = write_json(&result, matches.get_flag("pretty")) {
        eprintln!("❌ Error writing result: {e:#}");
        process::exit(1);
    }
}

fn load_config(path: Option<&String>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path),
        None => {
            log::debug!("No configuration file given, using built-in defaults");
            Ok(EngineConfig::default())
        }
    }
}

fn generate_default_config(path: &str) {
    let config = EngineConfig::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Add registered advisors and official announcements before production use.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

/// Context from `--context FILE`, overlaid with any inline flags
fn build_context(matches: &ArgMatches) -> anyhow::Result<Option<Context>> {
    use anyhow::Context as _;

    let mut context = match matches.get_one::<String>("context") {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read context file: {path}"))?;
            serde_json::from_str::<Context>(&content)
                .with_context(|| format!("Failed to parse context file: {path}"))?
        }
        None => Context::default(),
    };

    if let Some(channel) = matches.get_one::<String>("channel") {
        context.channel = Some(channel.clone());
    }
    if let Some(text) = matches.get_one::<String>("text") {
        context.text = Some(text.clone());
    }
    if let Some(app) = matches.get_one::<String>("app") {
        context.detected_app = Some(app.clone());
    }
    if let Some(mentions) = matches.get_many::<String>("mention") {
        context.mentions = Some(mentions.cloned().collect());
    }
    if let Some(tickers) = matches.get_many::<String>("ticker") {
        context.tickers = Some(tickers.cloned().collect());
    }
    if let Some(media) = matches.get_many::<String>("media") {
        context.media = Some(media.map(|m| MediaReference::from_arg(m)).collect());
    }

    Ok(if context.is_empty() { None } else { Some(context) })
}

async fn run_batch(
    engine: Arc<FusionEngine>,
    batch_file: &str,
    matches: &ArgMatches,
) -> anyhow::Result<()> {
    use anyhow::Context as _;

    let file = fs::File::open(batch_file)
        .with_context(|| format!("Failed to open batch file: {batch_file}"))?;
    let requests = batch::read_requests(BufReader::new(file))?;
    log::info!("Scoring {} request(s) from {}", requests.len(), batch_file);

    let results = batch::score_all(engine, requests).await?;

    if matches.get_flag("explain") {
        for result in &results {
            print_explanation(result);
            println!();
        }
        return Ok(());
    }

    // JSON Lines out, one result per request
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for result in &results {
        serde_json::to_writer(&mut out, result)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_json(result: &FusionResult, pretty: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, result)?;
    } else {
        serde_json::to_writer(&mut out, result)?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_explanation(result: &FusionResult) {
    let badge = match result.label {
        fraud_fusion::RiskLabel::High => "🔴",
        fraud_fusion::RiskLabel::Medium => "🟠",
        fraud_fusion::RiskLabel::Low => "🟢",
    };

    println!("{} {}", badge, result.url);
    println!(
        "Risk: {} (final score {:.3})",
        result.label.as_str().to_uppercase(),
        result.scores.final_score
    );
    println!(
        "Scores: url={:.3} identity={:.3} social={:.3} app={:.3} media={:.3} announcement={:.3}",
        result.scores.url,
        result.scores.identity,
        result.scores.social,
        result.scores.app_impersonation,
        result.scores.media,
        result.scores.announcement
    );

    if result.explanations.is_empty() {
        println!("Top signals: none above disclosure thresholds");
    } else {
        println!("Top signals:");
        for explanation in &result.explanations {
            println!(
                "  • {} = {:.3} (weight {:.2})",
                explanation.signal, explanation.value, explanation.weight
            );
        }
    }

    for (component, evidence) in &result.evidence {
        if evidence
            .get("unavailable")
            .map(|v| *v == fraud_fusion::EvidenceValue::Bool(true))
            .unwrap_or(false)
        {
            println!("⚠️  {} check skipped: collaborator unavailable", component);
        }
    }
}
