//! Output formatting helpers for CLI commands

use crate::api::{ProbeResponse, ProbeStatus, StatusResponse};
use crate::health::DenyReason;
use crate::metadata::InstanceMetadata;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;

/// Tally of a run of probes against one instance
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProbeTally {
    pub total: u64,
    pub allowed: u64,
    pub random_failure: u64,
    pub manually_set_unhealthy: u64,
    /// Metadata reported by the last probe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstanceMetadata>,
}

impl ProbeTally {
    /// Count one probe response.
    pub fn record(&mut self, response: ProbeResponse) {
        self.total += 1;
        match (response.status, response.reason) {
            (ProbeStatus::Healthy, _) => self.allowed += 1,
            (ProbeStatus::Unhealthy, Some(DenyReason::ManuallySetUnhealthy)) => {
                self.manually_set_unhealthy += 1
            }
            (ProbeStatus::Unhealthy, _) => self.random_failure += 1,
        }
        self.metadata = Some(response.metadata);
    }

    pub fn denied(&self) -> u64 {
        self.random_failure + self.manually_set_unhealthy
    }

    /// Fraction of probes that passed, in percent
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.allowed as f64 * 100.0 / self.total as f64
    }
}

fn health_label(healthy: bool) -> String {
    if healthy {
        "Healthy".green().to_string()
    } else {
        "Unhealthy".red().to_string()
    }
}

fn readiness_label(percent: u8) -> String {
    let text = format!("{}%", percent);
    if percent == 100 {
        text.green().to_string()
    } else if percent == 0 {
        text.red().to_string()
    } else {
        text.yellow().to_string()
    }
}

/// Format a status response as a table
pub fn format_status_table(status: &StatusResponse) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    table.add_row(vec![Cell::new("Health"), Cell::new(health_label(status.healthy))]);
    table.add_row(vec![
        Cell::new("Readiness"),
        Cell::new(readiness_label(status.readiness_percent)),
    ]);
    table.add_row(vec![Cell::new("Region"), Cell::new(&status.metadata.region)]);
    table.add_row(vec![Cell::new("Service"), Cell::new(&status.metadata.service)]);
    table.add_row(vec![
        Cell::new("Instance"),
        Cell::new(&status.metadata.instance),
    ]);
    table.add_row(vec![
        Cell::new("Last updated"),
        Cell::new(status.last_updated.to_rfc3339()),
    ]);
    table.add_row(vec![
        Cell::new("Started"),
        Cell::new(status.startup_time.to_rfc3339()),
    ]);

    table.to_string()
}

/// Format a status response as JSON
pub fn format_status_json(status: &StatusResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(status)
}

/// Format a probe tally as a table
pub fn format_probe_table(tally: &ProbeTally) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Result", "Count"]);

    table.add_row(vec![Cell::new("Allowed".green().to_string()), Cell::new(tally.allowed)]);
    table.add_row(vec![
        Cell::new(format!("Denied ({})", DenyReason::RandomFailure).red().to_string()),
        Cell::new(tally.random_failure),
    ]);
    table.add_row(vec![
        Cell::new(
            format!("Denied ({})", DenyReason::ManuallySetUnhealthy)
                .red()
                .to_string(),
        ),
        Cell::new(tally.manually_set_unhealthy),
    ]);
    table.add_row(vec![Cell::new("Total"), Cell::new(tally.total)]);

    let mut output = table.to_string();
    output.push_str(&format!("\nPass rate: {:.1}%", tally.pass_rate()));
    if let Some(metadata) = &tally.metadata {
        output.push_str(&format!(
            "\nInstance: {} ({}, {})",
            metadata.instance, metadata.service, metadata.region
        ));
    }
    output
}

/// Format a probe tally as JSON
pub fn format_probe_json(tally: &ProbeTally) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tally)
}

/// Get status icon for a probe result
pub fn status_icon(status: ProbeStatus) -> &'static str {
    match status {
        ProbeStatus::Healthy => "✓",
        ProbeStatus::Unhealthy => "✗",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthConfig;
    use chrono::Utc;

    fn metadata() -> InstanceMetadata {
        InstanceMetadata {
            region: "europe-west1".to_string(),
            service: "checkout".to_string(),
            instance: "checkout-00001-abcd1234".to_string(),
        }
    }

    fn probe(status: ProbeStatus, reason: Option<DenyReason>) -> ProbeResponse {
        ProbeResponse {
            status,
            reason,
            readiness_percent: None,
            metadata: metadata(),
        }
    }

    #[test]
    fn test_format_status_table() {
        let status = StatusResponse::new(HealthConfig::new(false, 42, Utc::now()), metadata());
        let output = format_status_table(&status);
        assert!(output.contains("Unhealthy"));
        assert!(output.contains("42%"));
        assert!(output.contains("europe-west1"));
        assert!(output.contains("checkout-00001-abcd1234"));
    }

    #[test]
    fn test_format_status_json() {
        let status = StatusResponse::new(HealthConfig::new(true, 100, Utc::now()), metadata());
        let output = format_status_json(&status).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["healthy"], true);
        assert_eq!(parsed["readiness_percent"], 100);
        assert_eq!(parsed["service"], "checkout");
    }

    #[test]
    fn test_tally_counts_each_reason() {
        let mut tally = ProbeTally::default();
        tally.record(probe(ProbeStatus::Healthy, None));
        tally.record(probe(ProbeStatus::Healthy, None));
        tally.record(probe(ProbeStatus::Unhealthy, Some(DenyReason::RandomFailure)));
        tally.record(probe(
            ProbeStatus::Unhealthy,
            Some(DenyReason::ManuallySetUnhealthy),
        ));

        assert_eq!(tally.total, 4);
        assert_eq!(tally.allowed, 2);
        assert_eq!(tally.random_failure, 1);
        assert_eq!(tally.manually_set_unhealthy, 1);
        assert_eq!(tally.denied(), 2);
        assert!((tally.pass_rate() - 50.0).abs() < f64::EPSILON);
        assert_eq!(tally.metadata, Some(metadata()));
    }

    #[test]
    fn test_empty_tally_pass_rate() {
        assert_eq!(ProbeTally::default().pass_rate(), 0.0);
    }

    #[test]
    fn test_format_probe_table() {
        let mut tally = ProbeTally::default();
        tally.record(probe(ProbeStatus::Unhealthy, Some(DenyReason::RandomFailure)));
        let output = format_probe_table(&tally);
        assert!(output.contains("random_failure"));
        assert!(output.contains("Pass rate: 0.0%"));
        assert!(output.contains("checkout-00001-abcd1234"));
    }

    #[test]
    fn test_format_probe_json() {
        let mut tally = ProbeTally::default();
        tally.record(probe(ProbeStatus::Healthy, None));
        let output = format_probe_json(&tally).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["allowed"], 1);
        assert_eq!(parsed["metadata"]["region"], "europe-west1");
    }

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(ProbeStatus::Healthy), "✓");
        assert_eq!(status_icon(ProbeStatus::Unhealthy), "✗");
    }
}
