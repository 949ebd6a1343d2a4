//! Water-use estimate command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, WaterUseAdvice, WaterUseRequest};
use crate::output::{print_json, print_warning, OutputFormat};

/// Crop and growing conditions for a water-use estimate
#[derive(Debug, Args)]
pub struct WaterUseArgs {
    /// Crop name, e.g. Rice
    #[arg(long)]
    pub crop_name: String,

    /// Rainfall requirement in mm/year
    #[arg(long)]
    pub rainfall_requirement: f64,

    /// Temperature requirement in °C
    #[arg(long, allow_negative_numbers = true)]
    pub temperature_requirement: f64,

    /// Soil type, e.g. Loamy
    #[arg(long)]
    pub soil_type: String,

    /// Irrigation type, e.g. Drip
    #[arg(long)]
    pub irrigation_type: String,

    /// Water scarcity level, e.g. Medium
    #[arg(long)]
    pub water_scarcity: String,

    /// Expected yield in tons/ha
    #[arg(long = "yield")]
    pub yield_tons_per_ha: f64,

    /// Crop cycle duration in days
    #[arg(long)]
    pub crop_cycle_duration: f64,
}

impl From<WaterUseArgs> for WaterUseRequest {
    fn from(args: WaterUseArgs) -> Self {
        Self {
            rainfall_requirement: args.rainfall_requirement,
            temperature_requirement: args.temperature_requirement,
            soil_type: args.soil_type,
            irrigation_type: args.irrigation_type,
            water_scarcity: args.water_scarcity,
            yield_tons_per_ha: args.yield_tons_per_ha,
            crop_cycle_duration: args.crop_cycle_duration,
            crop_name: args.crop_name,
        }
    }
}

#[derive(Tabled)]
struct EstimateRow {
    #[tabled(rename = "Estimate")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Request a water-use estimate
pub async fn estimate(client: &ApiClient, args: WaterUseArgs, format: OutputFormat) -> Result<()> {
    let crop_name = args.crop_name.clone();
    let request = WaterUseRequest::from(args);
    let result: WaterUseAdvice = client.post("api/water_use", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "Water Use Estimate".bold());
            println!("{}", "=".repeat(50));
            println!("Crop: {}", crop_name.cyan());
            println!();

            let rows = vec![
                EstimateRow {
                    name: "Water use",
                    value: result.predicted_water_use.clone(),
                },
                EstimateRow {
                    name: "Temperature requirement",
                    value: result.predicted_temperature_requirement.clone(),
                },
                EstimateRow {
                    name: "Rainfall requirement",
                    value: result.predicted_rainfall_requirement.clone(),
                },
            ];
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if result.degraded {
                println!();
                print_warning(&format!(
                    "Unrecognised values for {}; estimate may be less reliable",
                    result.unseen_categories.join(", ")
                ));
            }
        }
    }

    Ok(())
}
