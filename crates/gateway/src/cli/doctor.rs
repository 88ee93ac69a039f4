use std::sync::Arc;

use dh_domain::config::{Config, ConfigSeverity};
use dh_resources::community::SimulatedCommunityClientBuilder;
use dh_resources::engine_client::ConnectCounter;
use dh_resources::enterprise_system::{SimulatedEnterpriseClientBuilder, SystemStatus};
use dh_resources::ResourceRegistry;

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("dh-mcp-server doctor");
    println!("=====================\n");

    let mut all_passed = true;

    check_config_file(config_path, &mut all_passed);
    check_config_validation(config, &mut all_passed);
    check_enterprise_systems(config, &mut all_passed).await;

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists { config_path.to_owned() } else { format!("{config_path} not found") },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues.iter().filter(|e| e.severity == ConfigSeverity::Error).count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!("{} issue(s) ({} error(s))", issues.len(), error_count),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

/// Probes every configured enterprise system's controller handshake (§4.4
/// `status(probe=true)`). A system with no configured sessions is not a
/// failure on its own — only an actual probe failure fails this check.
async fn check_enterprise_systems(config: &Config, all_passed: &mut bool) {
    if config.enterprise.systems.is_empty() {
        print_check("Enterprise systems reachable", true, "none configured".into());
        return;
    }

    let registry = Arc::new(ResourceRegistry::new(
        Arc::new(SimulatedCommunityClientBuilder { counter: ConnectCounter::new() }),
        Arc::new(SimulatedEnterpriseClientBuilder),
    ));
    registry.replace_from_config(config).await;

    let mut ok = true;
    for key in registry.enterprise_system_keys().await {
        let Ok(system) = registry.enterprise_system(&key).await else { continue };
        let (status, detail) = system.status(true).await;
        let reachable = status == SystemStatus::Online;
        print_check(&format!("Enterprise system {key} reachable"), reachable, format!("{status:?}: {detail}"));
        ok = ok && reachable;
    }
    if !ok {
        *all_passed = false;
    }
    registry.close_all().await;
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
