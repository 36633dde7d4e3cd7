//! `detect` and `import` command handlers.
//!
//! Each file is processed independently: a file that fails to read, detect
//! or parse is reported and skipped, and the command fails at the end if any
//! file did.

use std::path::{Path, PathBuf};

use leadpulse_core::{ImportPolicy, Vocabulary};
use leadpulse_db::{persist_import, ImportPayload, MergeEngine};
use leadpulse_ingest::{decode_bytes, detect, import_bytes, CsvTable, ImportContext};

pub(crate) struct ImportOptions<'a> {
    pub user: &'a str,
    pub campaign: Option<&'a str>,
    pub profile: Option<&'a str>,
    pub policy: ImportPolicy,
    pub strict_layout: bool,
}

pub(crate) fn import_context(path: &Path, options: &ImportOptions<'_>) -> ImportContext {
    let mut ctx = ImportContext::from_path(path).with_strict_layout(options.strict_layout);
    if let Some(campaign) = options.campaign {
        ctx = ctx.with_campaign(campaign);
    }
    if let Some(profile) = options.profile {
        ctx = ctx.with_profile(profile);
    }
    ctx
}

fn finish(failed: usize, total: usize) -> anyhow::Result<()> {
    if failed > 0 {
        anyhow::bail!("{failed} of {total} file(s) failed");
    }
    Ok(())
}

pub(crate) fn run_detect(files: &[PathBuf]) -> anyhow::Result<()> {
    let mut failed = 0;
    for path in files {
        let ctx = ImportContext::from_path(path);
        let detected = std::fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| {
                CsvTable::parse(&ctx.file_name, &decode_bytes(&bytes)).map_err(anyhow::Error::from)
            });
        match detected {
            Ok(table) => {
                let result = detect(table.headers());
                println!("{}: {} ({:?})", path.display(), result.format, result.confidence);
            }
            Err(e) => {
                eprintln!("error: {}: {e}", path.display());
                failed += 1;
            }
        }
    }
    finish(failed, files.len())
}

/// Imports every file. With no pool the files are merged in memory and the
/// result is printed instead of written.
pub(crate) async fn run_import(
    pool: Option<&sqlx::PgPool>,
    vocab: &Vocabulary,
    files: &[PathBuf],
    options: &ImportOptions<'_>,
) -> anyhow::Result<()> {
    let mut engine = MergeEngine::new(options.policy);
    let mut failed = 0;

    for path in files {
        let ctx = import_context(path, options);
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("error: {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };

        let file_import = match import_bytes(&bytes, &ctx, vocab) {
            Ok(file_import) => file_import,
            Err(e) => {
                tracing::warn!(file = %e.file(), error = %e, "import failed");
                eprintln!("error: {e}");
                failed += 1;
                continue;
            }
        };

        let report = file_import.parsed.report();
        let file_format = file_import.parsed.format();
        let (leads, metrics) = file_import.parsed.into_parts();

        match pool {
            Some(pool) => {
                let payload = ImportPayload {
                    user_id: options.user,
                    file_name: &ctx.file_name,
                    file_format,
                    content: &bytes,
                    leads: &leads,
                    metrics: &metrics,
                };
                match persist_import(pool, options.policy, &payload).await {
                    Ok(persisted) => println!(
                        "{}: {file_format}, {} lead(s), {} metric row(s), {} row(s) skipped, {} excluded [batch {}]",
                        ctx.file_name,
                        persisted.leads_written,
                        persisted.metric_rows_written,
                        report.rows_skipped,
                        report.rows_excluded,
                        persisted.batch_key,
                    ),
                    Err(e) => {
                        tracing::warn!(file = %ctx.file_name, error = %e, "persist failed");
                        eprintln!("error: {}: {e}", ctx.file_name);
                        failed += 1;
                    }
                }
            }
            None => {
                let outcome = engine.apply(options.user, &bytes, leads, &metrics);
                println!(
                    "dry-run: {}: {file_format}, {} lead(s), {} metric series, {} row(s) skipped, {} excluded",
                    ctx.file_name,
                    outcome.leads_written,
                    outcome.metrics_written,
                    report.rows_skipped,
                    report.rows_excluded,
                );
            }
        }
    }

    if pool.is_none() {
        println!(
            "dry-run: {} lead(s) and {} metric series after merge",
            engine.leads(options.user).len(),
            engine.metrics(options.user).len()
        );
    }

    finish(failed, files.len())
}
