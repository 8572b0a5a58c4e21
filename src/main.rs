//! tabrix - Main entry point

use clap::Parser;
use tabrix::cli::{cmd_info, cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabrix=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            label,
            id,
            output,
            epochs,
            batch_size,
            scaling,
            sample_rows,
            strict_schema,
            seed,
        } => {
            cmd_train(
                &data,
                &label,
                id.as_deref(),
                &output,
                epochs,
                batch_size,
                &scaling,
                sample_rows,
                strict_schema,
                seed,
            )?;
        }
        Commands::Predict {
            model,
            data,
            output,
            id,
        } => {
            cmd_predict(&model, &data, &output, id.as_deref())?;
        }
        Commands::Info { model } => {
            cmd_info(&model)?;
        }
    }

    Ok(())
}
