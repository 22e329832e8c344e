//! desk-runner: headless driver for the alert desk.
//!
//! Usage:
//!   desk-runner --data alerts.csv
//!   desk-runner --config desk.json
//!   desk-runner --config desk.json --ipc-mode

use alert_desk_core::{
    command::{DeskCommand, DeskReply},
    config::DeskConfig,
    filter::FilterSpec,
    AlertDesk,
};
use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = find_arg(&args, "--config");
    let data_path = find_arg(&args, "--data");

    let mut config = match config_path {
        Some(p) => DeskConfig::load(Path::new(p))?,
        None => DeskConfig::new("alerts.csv"),
    };
    if let Some(p) = data_path {
        config.data_path = p.into();
    }

    if !ipc_mode {
        println!("Alert Desk — desk-runner");
        println!("  data:     {}", config.data_path.display());
        println!("  refresh:  every {}h", config.refresh_interval_hours);
        println!();
    }

    // A dataset that cannot be loaded is fatal: no partial operation.
    let desk = AlertDesk::open(config)?;

    if ipc_mode {
        run_ipc_loop(&desk)?;
    } else {
        print_summary(&desk)?;
    }

    Ok(())
}

fn run_ipc_loop(desk: &AlertDesk) -> Result<()> {
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

        if let Err(e) = desk.refresh_if_due(chrono::Utc::now()) {
            log::warn!("Scheduled refresh failed: {e}");
        }

        let cmd: DeskCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match desk.execute(&cmd) {
            Ok(DeskReply::Bye) => {
                writeln!(stdout, "{}", serde_json::to_string(&DeskReply::Bye)?)?;
                stdout.flush()?;
                break;
            }
            Ok(reply) => writeln!(stdout, "{}", serde_json::to_string(&reply)?)?,
            Err(e) => write_error(&mut stdout, &e.to_string())?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(desk: &AlertDesk) -> Result<()> {
    let snapshot = desk.snapshot()?;
    let report = desk.apply_filters(&FilterSpec::new())?;

    println!("=== DETECTED ROLES ===");
    for (role, column) in snapshot.roles.present() {
        println!("  {:<9} -> {column}", role.keyword());
    }
    for role in snapshot.roles.missing() {
        println!("  {:<9} -> (not found)", role.keyword());
    }

    println!();
    println!("=== KPIS ===");
    for kpi in &report.kpis {
        println!("  {:<22} {}", kpi.label, kpi.value);
    }

    for series in report.aggregate.grouped.values() {
        println!();
        println!("=== ALERTS BY {} ===", series.role.keyword().to_uppercase());
        if series.points.is_empty() {
            println!("  (no data)");
        }
        for point in &series.points {
            println!("  {:<22} {}", point.value.to_text(), point.count);
        }
    }

    let panel = desk.panel()?;
    if let Some(bounds) = panel.date_bounds {
        println!();
        println!("=== DATES ===");
        println!("  range:    {} .. {}", bounds.min, bounds.max);
        println!("  months:   {}", panel.months.join(", "));
        let quarters: Vec<String> = panel.quarters.iter().map(|q| format!("Q{q}")).collect();
        println!("  quarters: {}", quarters.join(", "));
    }
    println!();
    println!("  next refresh: {}", desk.next_refresh()?);
    Ok(())
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
