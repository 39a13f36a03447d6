use clap::Parser;
use qa_report::cli::commands::{
    cmd_check, cmd_discard, cmd_keys, cmd_report, cmd_show, load_store, Decision,
};
use qa_report::cli::config::{load_config, resolve_inputs, Cli, Commands};
use qa_report::discard::discard_model::DiscardStatus;
use qa_report::trace::logger::TraceLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Resolve input locations: CLI > config > defaults
    let inputs = resolve_inputs(&cli, &config);
    let tracer = TraceLogger::open(inputs.trace.as_deref());
    let store = load_store(&inputs, cli.verbose)?;

    match cli.command {
        Commands::Report { format, output } => {
            let format = format.unwrap_or_else(|| config.report.format.clone());
            let output = output.or_else(|| config.report.output.clone());
            let all_passed = cmd_report(&store, &format, output.as_deref(), cli.verbose, &tracer)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Show { extension, feature } => {
            cmd_show(&store, &extension, feature.as_deref())?;
        }
        Commands::Keys => cmd_keys(&store),
        Commands::Check => {
            if !cmd_check(&store, &tracer) {
                std::process::exit(1);
            }
        }
        Commands::Discard {
            extension,
            feature,
            scenario,
            restore,
            output,
        } => {
            let decision = Decision {
                extension: &extension,
                feature: &feature,
                scenario: scenario.as_deref(),
                status: if restore {
                    DiscardStatus::Active
                } else {
                    DiscardStatus::Discarded
                },
            };
            cmd_discard(&store, &inputs, &decision, output.as_deref(), cli.verbose, &tracer)?;
        }
    }

    Ok(())
}
