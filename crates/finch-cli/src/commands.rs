//! Command implementations

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use finch_core::{
    catalog::ContentCatalog,
    config::EngineConfig,
    db::Database,
    engine::{RecommendationEngine, RecommendationOptions},
    models::ReviewStatus,
    report, seed, AIClient,
};

/// Resolve the database path: explicit flag, else platform data directory
pub fn resolve_db_path(flag: Option<&str>) -> Result<String> {
    if let Some(path) = flag {
        return Ok(path.to_string());
    }
    let dir = dirs::data_dir()
        .map(|d| d.join("finch"))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;
    Ok(dir.join("finch.db").to_string_lossy().into_owned())
}

fn open_db(path: &str, no_encrypt: bool) -> Result<Database> {
    let db = if no_encrypt {
        Database::new_unencrypted(path)?
    } else {
        Database::new(path)?
    };
    Ok(db)
}

fn build_engine(db: Database) -> Result<RecommendationEngine> {
    let mut engine =
        RecommendationEngine::new(db, ContentCatalog::builtin()?, EngineConfig::load()?);
    if let Some(ai) = AIClient::from_env() {
        info!(model = ai.model(), "AI rationale augmentation enabled");
        engine = engine.with_ai(ai);
    }
    Ok(engine)
}

pub fn cmd_init(db_path: &str, no_encrypt: bool) -> Result<()> {
    open_db(db_path, no_encrypt)?;
    println!("Database initialized at {}", db_path);
    Ok(())
}

pub fn cmd_seed(db_path: &str, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let users = seed::seed_demo_users(&db, Utc::now().date_naive())?;
    println!("Seeded {} demo users:", users.len());
    for user in users {
        println!("  {}", user);
    }
    Ok(())
}

pub fn cmd_assign(
    db_path: &str,
    no_encrypt: bool,
    user: &str,
    force_refresh: bool,
    json: bool,
) -> Result<()> {
    let engine = build_engine(open_db(db_path, no_encrypt)?)?;
    let assignment = engine.assign_persona(user, force_refresh)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assignment)?);
        return Ok(());
    }

    println!(
        "{} -> {} (priority {})",
        user, assignment.assigned_persona.name, assignment.assigned_persona.priority
    );
    println!("  {}", assignment.rationale);
    println!(
        "  {} persona(s) matched; {}",
        assignment.decision_trace.all_matches.len(),
        assignment.decision_trace.selection_reason
    );
    Ok(())
}

pub async fn cmd_recommend(
    db_path: &str,
    no_encrypt: bool,
    user: &str,
    force_refresh: bool,
    json: bool,
) -> Result<()> {
    let engine = build_engine(open_db(db_path, no_encrypt)?)?;
    let set = engine
        .generate_recommendations(
            user,
            RecommendationOptions {
                force_refresh,
                ..Default::default()
            },
        )
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
        return Ok(());
    }

    println!("{} -> {}", user, set.persona.name);
    println!("\nEducation:");
    for rec in &set.education {
        println!("  - {}", rec.item.title);
        println!("    {}", rec.augmented_rationale.as_deref().unwrap_or(&rec.rationale));
    }
    println!("\nPartner offers:");
    if set.partner_offers.is_empty() {
        println!("  (none eligible)");
    }
    for rec in &set.partner_offers {
        println!("  - {} ({})", rec.item.title, rec.item.partner_name);
        println!("    {}", rec.augmented_rationale.as_deref().unwrap_or(&rec.rationale));
    }
    println!("\n{}", set.disclaimer);
    Ok(())
}

pub fn cmd_traces(
    db_path: &str,
    no_encrypt: bool,
    status: Option<&str>,
    limit: i64,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let status = status
        .map(ReviewStatus::from_str)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    let traces = db.list_traces(status, limit)?;

    if traces.is_empty() {
        println!("No traces found");
        return Ok(());
    }
    for trace in traces {
        println!(
            "#{} [{}] {} -> {} ({})",
            trace.id, trace.review_status, trace.user_id, trace.selected_persona, trace.created_at
        );
        println!("    {}", trace.selection_reason);
    }
    Ok(())
}

pub fn cmd_review(
    db_path: &str,
    no_encrypt: bool,
    id: i64,
    status: &str,
    note: Option<&str>,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let status = ReviewStatus::from_str(status).map_err(|e| anyhow::anyhow!(e))?;
    db.resolve_trace(id, status, note)?;
    println!("Trace #{} marked {}", id, status);
    Ok(())
}

pub async fn cmd_report(db_path: &str, no_encrypt: bool, json: bool) -> Result<()> {
    let engine = build_engine(open_db(db_path, no_encrypt)?)?;
    let report = report::run_evaluation(&engine).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Users evaluated:  {}", report.users_evaluated);
    println!("Coverage:         {:.1}%", report.coverage_pct);
    println!("Explainability:   {:.1}%", report.explainability_pct);
    println!("Auditability:     {:.1}%", report.auditability_pct);
    println!(
        "Latency:          avg {}ms, max {}ms ({})",
        report.avg_latency_ms,
        report.max_latency_ms,
        if report.latency_target_met {
            "within target"
        } else {
            "OVER TARGET"
        }
    );
    for row in &report.rows {
        println!(
            "  {} -> {} ({} behaviors, {} items, {}ms)",
            row.user_id, row.persona, row.behaviors_detected, row.recommendation_count,
            row.latency_ms
        );
    }
    Ok(())
}

pub async fn cmd_serve(db_path: &str, no_encrypt: bool, host: &str, port: u16) -> Result<()> {
    let engine = build_engine(open_db(db_path, no_encrypt)?)?;
    finch_server::serve(Arc::new(engine), host, port).await
}
