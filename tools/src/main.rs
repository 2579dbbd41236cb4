//! score-runner: headless scoring runner for ReferralGuard.
//!
//! Usage:
//!   score-runner --input real_insights.json --data-dir ./data
//!   score-runner --input real_insights.json --top 15 --output report.json --pretty
//!   score-runner --ipc-mode --data-dir ./data

use anyhow::{Context, Result};
use referralguard_core::{
    engine::{ReferralReport, ReportEngine},
    ingest::{parse_market_document, select_top_by_revenue},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportEnvelope<'a> {
    generated_at: String,
    source: &'a str,
    #[serde(flatten)]
    report: &'a ReferralReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let pretty = args.iter().any(|a| a == "--pretty");
    let top = parse_arg(&args, "--top", 0usize);
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let input = string_arg(&args, "--input");
    let output = string_arg(&args, "--output");

    let engine = ReportEngine::build(data_dir)
        .with_context(|| format!("Cannot build engine from {data_dir}"))?;

    if ipc_mode {
        return run_ipc_loop(&engine);
    }

    let Some(input) = input else {
        anyhow::bail!("--input is required unless --ipc-mode is set");
    };

    println!("ReferralGuard — score-runner");
    println!("  input:     {input}");
    println!("  data_dir:  {data_dir}");
    println!("  top:       {}", if top == 0 { "all".to_string() } else { top.to_string() });
    println!();

    let content =
        std::fs::read_to_string(input).with_context(|| format!("Cannot read {input}"))?;
    let mut records = parse_market_document(&content)?;
    if top > 0 {
        records = select_top_by_revenue(&records, top);
        log::info!("Kept top {} providers by revenue", records.len());
    }

    let report = engine.analyze(&records);
    let envelope = ReportEnvelope {
        generated_at: chrono::Utc::now().to_rfc3339(),
        source: input,
        report: &report,
    };

    if let Some(path) = output {
        let json = if pretty {
            serde_json::to_string_pretty(&envelope)?
        } else {
            serde_json::to_string(&envelope)?
        };
        std::fs::write(path, json).with_context(|| format!("Cannot write {path}"))?;
        println!("  report written to {path}");
        println!();
    }

    print_summary(&report);
    Ok(())
}

/// One market document per stdin line in, one report (or error) per line out.
fn run_ipc_loop(engine: &ReportEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        match engine.analyze_document(&buffer) {
            Ok(report) => writeln!(stdout, "{}", serde_json::to_string(&report)?)?,
            Err(e) => {
                log::warn!("Rejected document: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(report: &ReferralReport) {
    let s = &report.summary;
    let plan = &report.recovery_plan;

    println!("=== RISK SUMMARY ===");
    println!("  providers:        {}", s.total_providers);
    println!("  avg risk score:   {:.1}", s.average_risk_score);
    println!(
        "  high/med/low:     {}/{}/{}",
        s.high_risk_count, s.medium_risk_count, s.low_risk_count
    );
    println!("  revenue analyzed: ${:.0}", s.total_revenue_analyzed);
    println!("  revenue at risk:  ${:.0}", s.total_revenue_at_risk);
    println!("  avg market share: {:.1}%", s.average_market_share);
    println!(
        "  concentrated/fragmented markets: {}/{}",
        s.high_concentration_markets, s.fragmented_markets
    );

    println!();
    println!("=== TOP PROVIDERS ===");
    if report.providers.is_empty() {
        println!("  (No providers in input)");
    } else {
        let mut ranked: Vec<_> = report.providers.iter().collect();
        ranked.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        for p in ranked.iter().take(5) {
            println!(
                "  {:>3} {:<6} | {} | {} | at risk ${:.0}",
                p.risk_score,
                p.risk_tier.as_str(),
                p.display_name,
                p.intervention_type,
                p.revenue_at_risk
            );
        }
    }

    if !report.leakage_opportunities.is_empty() {
        println!();
        println!("=== LEAKAGE OPPORTUNITIES ===");
        for o in report.leakage_opportunities.iter().take(5) {
            println!("  {}", o.description);
        }
    }

    println!();
    println!("=== RECOVERY PLAN ===");
    for phase in &plan.phases {
        println!(
            "  {:<24} {:>4} providers | recover ${:.0} | cost ${:.0} | {}",
            phase.label, phase.providers, phase.recovery, phase.cost, phase.timeline
        );
    }
    println!("  total recovery:   ${:.0}", plan.total_recovery_potential);
    println!("  implementation:   ${:.0}", plan.implementation_cost);
    println!("  expected ROI:     {:.2}x", plan.expected_roi);
    println!("  payback:          {} months", plan.payback_period_months);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
