use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use energy_wizard_lib::api::decode_and_download;
use energy_wizard_lib::config::{get_api_config, ApiConfig};
use energy_wizard_lib::drivers::{run_step1, run_step2, DriverOutcome, DriverResult, ViewScope, ViewToken};
use energy_wizard_lib::logging::{init_logging, LogFormat};
use energy_wizard_lib::state::{WizardState, WizardStep, WizardStore};
use energy_wizard_lib::{HttpAnalysisClient, UploadedFile};

#[derive(Parser, Debug)]
#[command(author, version, about = "Room optimization and energy analysis wizard", long_about = None)]
struct Cli {
    /// Emit JSON log lines instead of human-readable ones
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload both spreadsheets and walk through every wizard step
    Analyze(AnalyzeArgs),
    /// Decode a saved base64 spreadsheet payload
    Decode(DecodeArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Heating load spreadsheet
    #[arg(long, value_hint = ValueHint::FilePath)]
    heating: PathBuf,

    /// Ventilation load spreadsheet
    #[arg(long, value_hint = ValueHint::FilePath)]
    ventilation: PathBuf,

    /// Where the processed spreadsheet is saved
    #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,

    /// Backend base URL (overrides environment and config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Stop after the room optimization step
    #[arg(long)]
    step1_only: bool,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// File holding the base64 payload
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Name of the saved spreadsheet
    #[arg(short, long)]
    filename: Option<String>,

    #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.json_logs { LogFormat::Json } else { LogFormat::Pretty });

    match cli.command {
        Command::Analyze(args) => analyze(args).await,
        Command::Decode(args) => decode(args).await,
    }
}

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let config = match &args.api_url {
        Some(url) => ApiConfig::from_sources(Some(url.clone()), None)
            .context("invalid --api-url")?,
        None => get_api_config().clone(),
    };
    tracing::info!(base_url = %config.base_url, "Using analysis backend");

    let client = HttpAnalysisClient::new(config)?;
    let store = WizardStore::new();

    let heating = UploadedFile::from_path(&args.heating).await?;
    let ventilation = UploadedFile::from_path(&args.ventilation).await?;
    store.set_uploaded_files(heating, ventilation);

    store.set_current_step(WizardStep::Processing);
    if !drive_view("processing", |token| {
        let client = client.clone();
        let store = store.clone();
        async move { run_step1(&client, &store, &token).await }
    })
    .await?
    {
        return Ok(());
    }
    store.mark_step1_visited();
    print_step1(&store.snapshot());

    if args.step1_only {
        return save_processed_file(&store, &args.output_dir).await;
    }

    store.set_current_step(WizardStep::Step2Processing);
    if !drive_view("step2-processing", |token| {
        let client = client.clone();
        let store = store.clone();
        async move { run_step2(&client, &store, &token).await }
    })
    .await?
    {
        return Ok(());
    }
    store.mark_step2_visited();
    print_step2(&store.snapshot());

    store.set_current_step(WizardStep::Report);
    store.mark_report_complete();
    save_processed_file(&store, &args.output_dir).await
}

/// Mount a processing view and run its driver until it finishes or Ctrl-C tears the view down.
/// Returns false when the view was torn down.
async fn drive_view<F, Fut>(name: &'static str, driver: F) -> Result<bool>
where
    F: FnOnce(ViewToken) -> Fut,
    Fut: Future<Output = DriverResult>,
{
    let view = ViewScope::enter(name);
    let run = driver(view.token());
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::signal::ctrl_c() => {
            view.cancel();
            tracing::warn!(view = name, "Interrupted, leaving the wizard");
            return Ok(false);
        }
    };

    match outcome {
        Ok(DriverOutcome::Advanced(step)) => {
            tracing::debug!(step = %step, "View finished");
            Ok(true)
        }
        Ok(DriverOutcome::Abandoned) => Ok(false),
        Err(e) => bail!("{} failed: {}", name, e),
    }
}

async fn save_processed_file(store: &WizardStore, dir: &Path) -> Result<()> {
    let state = store.snapshot();
    if !state.has_download() {
        tracing::info!("Backend returned no processed spreadsheet");
        return Ok(());
    }
    if let Some(file) = &state.processed_file {
        let path = decode_and_download(&file.base64, Some(file.filename.as_str()), dir).await?;
        println!("Processed spreadsheet saved to {}", path.display());
    }
    Ok(())
}

async fn decode(args: DecodeArgs) -> Result<()> {
    let payload = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let path = decode_and_download(&payload, args.filename.as_deref(), &args.output_dir).await?;
    println!("Saved {}", path.display());
    Ok(())
}

fn print_step1(state: &WizardState) {
    let Some(data) = &state.step1_data else { return };
    println!("Room optimization");
    println!("  analysis id:      {}", state.analysis_id.as_deref().unwrap_or("-"));
    println!("  optimized rooms:  {} / {}", data.optimized_rooms, data.total_rooms);
    println!("  improvement rate: {:.1}%", data.improvement_rate * 100.0);
    println!("  confidence:       {:.1}%", data.confidence * 100.0);
    if let Some(changes) = data.details.as_ref().and_then(|d| d.key_changes.as_ref()) {
        for change in changes {
            println!("  {} -> {} ({} rooms)", change.from, change.to, change.count);
        }
    }
}

fn print_step2(state: &WizardState) {
    let Some(data) = &state.step2_data else { return };
    println!("Energy consumption");
    println!("  consumption:      {:.0} kWh", data.energy_consumption);
    println!("  reduction:        {:.1}%", data.reduction_percentage * 100.0);
    println!("  annual savings:   {:.2}", data.annual_savings);
    if let Some(rows) = data.details.as_ref().and_then(|d| d.breakdown_by_room_type.as_ref()) {
        for row in rows {
            match row.share_percent {
                Some(share) => println!("  {}: {:.1} W/m2 ({:.1}%)", row.room_type, row.w_per_m2, share),
                None => println!("  {}: {:.1} W/m2", row.room_type, row.w_per_m2),
            }
        }
    }
}
