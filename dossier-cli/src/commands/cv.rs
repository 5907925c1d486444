//! CV command handlers
//!
//! Launches generation jobs and renders the tracked job as it progresses.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use colored::*;
use dossier_core::dto::job::{CvFormat, GenerateCv};
use dossier_tracker::JobTracker;
use dossier_tracker::service::{Outcome, ProgressView, present};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;

const BAR_WIDTH: usize = 30;

/// Document format accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Html,
    Pdf,
}

impl From<FormatArg> for CvFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Html => CvFormat::Html,
            FormatArg::Pdf => CvFormat::Pdf,
        }
    }
}

fn open(config: &Config) -> Result<JobTracker> {
    JobTracker::open(config.tracker()).context("Failed to open job tracker")
}

/// Launch a job, then follow it unless detached
pub async fn generate(
    config: &Config,
    format: FormatArg,
    opportunity: Option<String>,
    detach: bool,
) -> Result<()> {
    let tracker = open(config)?;

    if let Some(previous) = tracker.active_job_id() {
        println!(
            "{}",
            format!("Job {} is still running; it will no longer be tracked.", previous).yellow()
        );
    }

    let job = tracker
        .launch(GenerateCv {
            format: format.into(),
            opportunity,
        })
        .await?;

    println!("{} Job {} queued", "▸".cyan(), job.id.bold());

    if detach {
        println!("{}", "Run `dossier watch` to follow it.".dimmed());
        return Ok(());
    }

    follow(&tracker).await
}

/// Follow the tracked job
pub async fn watch(config: &Config) -> Result<()> {
    let tracker = open(config)?;

    if tracker.state().job.is_none() {
        println!("{}", "No CV generation in progress.".yellow());
        return Ok(());
    }

    follow(&tracker).await
}

/// Print the tracked job as last persisted
pub fn status(config: &Config) -> Result<()> {
    let tracker = open(config)?;
    let view = tracker.view();

    print_view(&view);
    if matches!(view, ProgressView::Queued { .. } | ProgressView::Running { .. }) {
        println!("{}", "Run `dossier watch` to follow it.".dimmed());
    }

    Ok(())
}

/// Forget the tracked job
pub fn clear(config: &Config) -> Result<()> {
    let tracker = open(config)?;

    match tracker.state().job {
        Some(job) => {
            tracker.clear();
            println!("{} Cleared job {}", "✓".green(), job.id.dimmed());
        }
        None => println!("{}", "No job to clear.".yellow()),
    }

    Ok(())
}

/// Render every change of the tracked job until it finishes
///
/// Ctrl-C detaches: polling stops, the job keeps running server-side and
/// stays tracked for the next `watch`.
async fn follow(tracker: &JobTracker) -> Result<()> {
    let shutdown = CancellationToken::new();
    let poller = tracker.start_polling(shutdown.clone());
    let mut updates = tracker.subscribe();
    let base_url = tracker.config().api_url.clone();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last: Option<ProgressView> = None;
    let mut detached = false;

    loop {
        let job = updates.borrow_and_update().clone();
        let view = present(job.as_ref(), &base_url);

        if last.as_ref() != Some(&view) {
            print_view(&view);
        }
        if view.is_terminal() || view == ProgressView::Idle {
            last = Some(view);
            break;
        }
        last = Some(view);

        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, detaching from job");
                detached = true;
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    debug!("Job store closed");
                    break;
                }
            }
        }
    }

    poller.shutdown().await;

    if detached {
        println!();
        println!(
            "{}",
            "Detached. The job keeps running; run `dossier watch` to resume.".dimmed()
        );
        return Ok(());
    }

    match last.as_ref().and_then(ProgressView::outcome) {
        Some(Outcome::Failed(message)) => bail!("CV generation failed: {}", message),
        _ => Ok(()),
    }
}

/// Print one view of the tracked job
fn print_view(view: &ProgressView) {
    match view {
        ProgressView::Idle => println!("{}", "No CV generation in progress.".yellow()),
        ProgressView::Queued { stage } => {
            println!("{} {}", colorize_label("Queued", view), stage.dimmed());
        }
        ProgressView::Running { stage, progress } => {
            println!(
                "{} {} {:>3}% {}",
                colorize_label("Running", view),
                progress_bar(*progress).cyan(),
                progress,
                stage
            );
        }
        ProgressView::Success { stage, download } => {
            println!("{} {}", colorize_label("✓ CV generated", view), stage);
            if let Some(download) = download {
                match download.human_size() {
                    Some(size) => println!("  Download: {} ({})", download.url.cyan(), size),
                    None => println!("  Download: {}", download.url.cyan()),
                }
                if let Some(file_name) = &download.file_name {
                    println!("  File:     {}", file_name.dimmed());
                }
            }
        }
        ProgressView::Error { stage, detail } => {
            println!("{} {}", colorize_label("✗ Generation failed", view), stage);
            if let Some(detail) = detail {
                println!("\n{}", "Error:".bold());
                println!("{}", detail.red());
            }
        }
    }
}

/// Colorize a status label for display
fn colorize_label(label: &str, view: &ProgressView) -> ColoredString {
    match view {
        ProgressView::Idle => label.dimmed(),
        ProgressView::Queued { .. } => label.yellow(),
        ProgressView::Running { .. } => label.cyan(),
        ProgressView::Success { .. } => label.green().bold(),
        ProgressView::Error { .. } => label.red().bold(),
    }
}

/// Fixed-width bar for a percentage
fn progress_bar(progress: u8) -> String {
    let filled = BAR_WIDTH * usize::from(progress.min(100)) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
