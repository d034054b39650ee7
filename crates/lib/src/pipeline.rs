//! One-shot sync orchestration.

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::drupal::{DrupalClient, DrupalSession};
use crate::errors::SyncError;
use crate::source::{FacultyClient, FacultyRecord};
use crate::transform::build_node_payload;

/// Outcome counters for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
}

/// Runs the full pipeline once: fetch, authenticate, then one node per
/// record.
///
/// Failures before the per-record loop abort the run. Per-record failures
/// are logged, counted, and the loop continues; one bad record never
/// aborts the batch. An empty source is "nothing to sync", reported as a
/// zero-total run without touching the target at all.
pub async fn run(config: &SyncConfig) -> Result<SyncReport, SyncError> {
    config.validate()?;

    let source = FacultyClient::new(config);
    let records = source.fetch().await;
    if records.is_empty() {
        info!("no faculty records to sync");
        return Ok(SyncReport::default());
    }

    let drupal = DrupalClient::new(config);
    let username = config.drupal_username.clone().unwrap_or_default();
    let password = config.drupal_password.clone().unwrap_or_default();
    let session = drupal.authenticate(&username, &password).await?;

    let total = records.len();
    let mut report = SyncReport {
        total,
        ..Default::default()
    };

    for (index, record) in records.iter().enumerate() {
        match sync_record(&drupal, &session, config, record).await {
            Ok(Some(node_id)) => {
                report.created += 1;
                info!("created node {node_id} for {}", display_name(record));
            }
            Ok(None) => {
                report.created += 1;
                info!("created node for {}", display_name(record));
            }
            Err(err) => {
                report.failed += 1;
                warn!("skipping {}: {err}", display_name(record));
            }
        }

        // Throttle load on the target between records.
        if index + 1 < total {
            sleep(config.record_delay()).await;
        }
    }

    info!("sync finished: {}/{} nodes created", report.created, report.total);
    Ok(report)
}

async fn sync_record(
    drupal: &DrupalClient,
    session: &DrupalSession,
    config: &SyncConfig,
    record: &FacultyRecord,
) -> Result<Option<String>, SyncError> {
    let payload = build_node_payload(record, &config.drupal_content_type)?;
    drupal.create_node(session, &payload).await
}

fn display_name(record: &FacultyRecord) -> &str {
    record.name.as_deref().unwrap_or("<unnamed record>")
}
