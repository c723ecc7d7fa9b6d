use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use intake_core::{
    CandidateFile, ComputeOutcome, HttpIntakeTransport, IntakeEndpoints, IntakeEvent,
    UploadOutcome, UploadSessionController,
};
use tracing::{info, warn};

mod config;
mod host;

use config::load_settings;
use host::TerminalHost;

#[derive(Parser, Debug)]
#[command(about = "Upload PDF statements to the intake service")]
struct Args {
    /// Intake page URL; endpoint paths are resolved against it.
    #[arg(long)]
    page_url: Option<String>,
    /// Where to write the computed document (stdout when omitted).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Request a computation once every upload has settled.
    #[arg(long)]
    compute: bool,
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(page_url) = args.page_url {
        settings.page_url = page_url;
    }

    let endpoints =
        IntakeEndpoints::resolve(&settings.page_url, &settings.upload_path, &settings.compute_path)?;
    let transport = HttpIntakeTransport::new(endpoints, settings.request_timeout())?;
    transport.load_page().await?;
    info!(
        upload = %transport.endpoints().upload_url,
        compute = %transport.endpoints().compute_url,
        "intake page loaded"
    );

    let mut candidates = Vec::with_capacity(args.files.len());
    for path in &args.files {
        candidates.push(read_candidate(path).await?);
    }

    let host = Arc::new(TerminalHost::new(args.output));
    let controller = UploadSessionController::new(Arc::new(transport), host);
    let report = controller
        .handle_event(IntakeEvent::PickerSelection(candidates))
        .await;
    info!(
        accepted = report.uploads.len(),
        rejected = report.rejected.len(),
        "selection processed"
    );

    let mut uploaded = 0usize;
    for outcome in report.join_uploads().await {
        match outcome {
            UploadOutcome::Uploaded(_) => uploaded += 1,
            UploadOutcome::Failed(err) => warn!(%err, "upload did not complete"),
        }
    }
    match controller.session_id().await {
        Some(calculator_id) => info!(%calculator_id, uploaded, "uploads settled"),
        None => info!(uploaded, "uploads settled without a session"),
    }

    if args.compute {
        match controller.compute().await? {
            ComputeOutcome::Rendered => {}
            ComputeOutcome::Disabled => bail!("no accepted files to compute over"),
            ComputeOutcome::AlreadyInFlight => bail!("a compute request is already pending"),
        }
    }

    Ok(())
}

async fn read_candidate(path: &Path) -> Result<CandidateFile> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");
    Ok(CandidateFile::new(name, media_type, content))
}
