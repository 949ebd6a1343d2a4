//! Crop recommendation command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, CropRecommendation, CropRequest};
use crate::output::{
    color_confidence, color_soil_quality, format_probability, print_json, print_warning,
    OutputFormat,
};

/// Soil and climate conditions for a crop recommendation
#[derive(Debug, Args)]
pub struct CropArgs {
    /// Nitrogen content of the soil
    #[arg(long)]
    pub n: f64,

    /// Phosphorus content of the soil
    #[arg(long)]
    pub p: f64,

    /// Potassium content of the soil
    #[arg(long)]
    pub k: f64,

    /// Average temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: f64,

    /// Soil pH
    #[arg(long)]
    pub ph: f64,

    /// Rainfall in mm
    #[arg(long)]
    pub rainfall: f64,

    /// Soil type (informational)
    #[arg(long)]
    pub soil_type: Option<String>,

    /// Irrigation type (informational)
    #[arg(long)]
    pub irrigation_type: Option<String>,

    /// Growing season (informational)
    #[arg(long)]
    pub season: Option<String>,

    /// Crop type (informational)
    #[arg(long)]
    pub crop_type: Option<String>,
}

impl From<CropArgs> for CropRequest {
    fn from(args: CropArgs) -> Self {
        Self {
            n: args.n,
            p: args.p,
            k: args.k,
            temperature: args.temperature,
            ph: args.ph,
            rainfall: args.rainfall,
            soil_type: args.soil_type,
            irrigation_type: args.irrigation_type,
            season: args.season,
            crop_type: args.crop_type,
        }
    }
}

/// Row for ranked crops table
#[derive(Tabled)]
struct RankedCropRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Crop")]
    crop: String,
    #[tabled(rename = "Probability")]
    probability: String,
}

/// Request a crop recommendation
pub async fn recommend(client: &ApiClient, args: CropArgs, format: OutputFormat) -> Result<()> {
    let request = CropRequest::from(args);
    let result: CropRecommendation = client.post("api/crop", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "Crop Recommendation".bold());
            println!("{}", "=".repeat(50));
            println!("Recommended:  {}", result.predicted_crop.cyan().bold());
            println!("Confidence:   {}", color_confidence(result.confidence));
            println!("Soil quality: {}", color_soil_quality(result.soil_quality));
            println!();

            let rows: Vec<RankedCropRow> = result
                .top_predictions
                .iter()
                .enumerate()
                .map(|(i, entry)| RankedCropRow {
                    rank: i + 1,
                    crop: entry.label.clone(),
                    probability: format_probability(entry.probability),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if result.low_confidence {
                println!();
                print_warning("Low confidence: conditions may be outside what the model was trained on");
            }
        }
    }

    Ok(())
}
