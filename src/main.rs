use clap::Parser;
use symptom_match::app::{report, runner};
use symptom_match::utils::{error::MatchError, logger};
use symptom_match::{CliConfig, ConditionInfoLookup};

fn exit_with(e: &MatchError) -> ! {
    tracing::error!(
        "❌ Symptom matching failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn run(cli: &CliConfig) -> symptom_match::Result<()> {
    let config = cli.resolve()?;
    let context = runner::build_context(&config)?;

    if cli.list_symptoms {
        print!("{}", report::render_symptoms(context.vocabulary()));
        return Ok(());
    }

    if cli.list_conditions {
        for name in context.profiles().names() {
            let marker = if context.info().lookup(name).is_some() { "" } else { " (no info)" };
            println!("{}{}", name, marker);
        }
        return Ok(());
    }

    let symptoms = cli.selected_symptoms();
    let result = runner::diagnose(&config, &context, &symptoms)?;

    if cli.json {
        println!("{}", report::render_json(&result)?);
    } else {
        print!("{}", report::render_text(&result, context.vocabulary()));
    }
    Ok(())
}

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli) {
        exit_with(&e);
    }
}
