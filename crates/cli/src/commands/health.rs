//! Service health command

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::client::{ApiClient, HealthResponse, ReadinessResponse};
use crate::output::{color_status, print_info, print_json, print_success, print_warning, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Serialize)]
struct ServiceStatus {
    health: HealthResponse,
    readiness: ReadinessResponse,
}

/// Show liveness and readiness of the service
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_, health): (u16, HealthResponse) = client.get_with_status("healthz").await?;
    let (_, readiness): (u16, ReadinessResponse) = client.get_with_status("readyz").await?;

    match format {
        OutputFormat::Json => print_json(&ServiceStatus { health, readiness })?,
        OutputFormat::Table => {
            println!("{}", "Service Health".bold());
            println!("{}", "=".repeat(50));
            println!("Status: {}", color_status(&health.status));
            println!();

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(&component.status),
                    message: component.message.clone().unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));

            if rows.is_empty() {
                print_info("No components registered");
            } else {
                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}", table);
            }
            println!();

            if readiness.ready {
                print_success("Ready to serve predictions");
            } else {
                print_warning(&format!(
                    "Not ready: {}",
                    readiness.reason.as_deref().unwrap_or("unknown reason")
                ));
            }
        }
    }

    Ok(())
}
