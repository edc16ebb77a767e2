use car_condition::{
    AnalysisOrchestrator, AppError, ConditionReport, Configuration, HubLoader, ImageInput,
    ModelHandles,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "car-condition")]
#[command(about = "Heuristic car condition report from a single photo", long_about = None)]
#[command(version)]
struct Cli {
    /// Photo of the car to analyze
    image: PathBuf,

    /// Configuration file path
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Analysis(e)) => {
            eprintln!("Analysis Failed: {}", e.user_message());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let configuration = Configuration::load(cli.config.as_deref())?;
    init_logging(configuration.max_log_level()?);

    let image = ImageInput::from_path(&cli.image)
        .await
        .map_err(|e| AppError::ReadImage(e, cli.image.display().to_string()))?;

    let models = ModelHandles::new(HubLoader::new(configuration));
    let orchestrator = AnalysisOrchestrator::new(Arc::new(models));
    let result = orchestrator.analyze(&image).await?;

    let report = ConditionReport::new(image.name(), result);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
