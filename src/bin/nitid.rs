//! CLI for nitid - AI image enhancement.

use clap::{Args, Parser, Subcommand, ValueEnum};
use nitid::{GeminiClient, GeminiModel, Operation, Session};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nitid")]
#[command(about = "Enhance images with a generative AI model (remove watermarks, boost quality, upscale)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an enhancement operation on an image
    Enhance(EnhanceArgs),

    /// List the available operations
    Operations,
}

#[derive(Args)]
struct EnhanceArgs {
    /// Input image (png, jpg or webp)
    input: PathBuf,

    /// Operation to run
    #[arg(long, value_enum, default_value = "enhance-quality")]
    operation: OperationArg,

    /// Output file path (defaults to enhanced-image.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model variant
    #[arg(long, value_enum, default_value = "flash")]
    model: ModelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OperationArg {
    RemoveWatermark,
    EnhanceQuality,
    Upscale,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::RemoveWatermark => Operation::RemoveWatermark,
            OperationArg::EnhanceQuality => Operation::EnhanceQuality,
            OperationArg::Upscale => Operation::Upscale,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flash,
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::Flash,
            ModelArg::Pro => GeminiModel::Pro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Enhance(args) => {
            enhance(args, cli.json).await?;
        }
        Commands::Operations => {
            list_operations(cli.json)?;
        }
    }

    Ok(())
}

async fn enhance(args: EnhanceArgs, json_output: bool) -> anyhow::Result<()> {
    let client = GeminiClient::builder().model(args.model.into()).build();
    let mut session = Session::new(client);

    session.load_image(&args.input);
    if let Some(err) = session.error() {
        anyhow::bail!("{err}");
    }

    let op: Operation = args.operation.into();
    session.run_operation(op).await;
    if let Some(err) = session.error() {
        anyhow::bail!("{err}");
    }

    let saved = session.save_processed(args.output.as_deref())?;
    let size = session.processed().map(|image| image.size()).unwrap_or(0);

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "operation": op.to_string(),
            "output": saved.display().to_string(),
            "size_bytes": size,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}: {} ({} bytes)", op.label(), saved.display(), size);
    }

    Ok(())
}

fn list_operations(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let ops: Vec<_> = Operation::ALL
            .iter()
            .map(|op| {
                serde_json::json!({
                    "id": op.to_string(),
                    "label": op.label(),
                    "instruction": op.instruction(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&ops)?);
    } else {
        println!("Available operations:\n");
        for op in Operation::ALL {
            println!("  {} ({})", op.label(), op);
            println!("    {}", op.instruction());
        }
    }

    Ok(())
}
