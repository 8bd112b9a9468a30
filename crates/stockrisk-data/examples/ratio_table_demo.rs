//! Example fetching one ticker's ratio table and risk scores.
//!
//! This example shows how to:
//! 1. Fetch and normalize a stockanalysis.com ratio table
//! 2. Fetch the Altman Z-Score and Piotroski F-Score
//!
//! Note: This requires network access to stockanalysis.com.

use stockrisk_data::period::{DATE_FORMAT, DateRules};
use stockrisk_data::stockanalysis::{
    MetricVocabulary, RatioProvider, ScoreProvider, StockAnalysisClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("stockanalysis.com Ratio Table Demo");
    println!("==================================\n");

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "AA".to_string());
    let client = StockAnalysisClient::new()?;

    println!("Example 1: Ratio table for {symbol}");
    println!("-----------------------------------");

    let ratios = RatioProvider::new(
        client.clone(),
        MetricVocabulary::default(),
        DateRules::default(),
    );
    match ratios.fetch_ratios(&symbol, None).await {
        Ok(table) => {
            println!("Date        {}", table.metrics().join(" | "));
            for row in table.rows() {
                println!("{}  {}", row.date.format(DATE_FORMAT), row.values.join(" | "));
            }
        }
        Err(e) => {
            eprintln!("Error fetching ratios: {e}");
            eprintln!("Note: This is expected without network access to stockanalysis.com");
        }
    }

    println!();

    println!("Example 2: Risk scores for {symbol}");
    println!("-----------------------------------");

    let scores = ScoreProvider::new(client).fetch_scores(&symbol, None).await;
    if scores.is_empty() {
        println!("No scores available");
    } else {
        println!("Altman Z-Score:    {}", scores.altman_z);
        println!("Piotroski F-Score: {}", scores.piotroski_f);
    }

    Ok(())
}
