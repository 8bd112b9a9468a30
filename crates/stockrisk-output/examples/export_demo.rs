//! Demonstration of the export functionality in stockrisk-output.

use chrono::NaiveDate;
use stockrisk_data::ScorePair;
use stockrisk_output::{
    ExportFormat, Exporter, Layout, OutputBook, PeriodValues, RunReport, TickerBlock,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== stockrisk Export Demo ===\n");

    let metrics = vec![
        "Current Ratio".to_string(),
        "Debt / Equity Ratio".to_string(),
        "Inventory Turnover".to_string(),
    ];

    let mut kaiser = TickerBlock::new("KALU", "Kaiser Aluminum")
        .with_category(Some("mills".to_string()))
        .with_scores(ScorePair {
            altman_z: "2.48".to_string(),
            piotroski_f: "6".to_string(),
        });
    kaiser.periods = vec![
        PeriodValues {
            date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            values: vec!["2.63".to_string(), "1.60".to_string(), "4.86".to_string()],
        },
        PeriodValues {
            date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            values: vec!["2.37".to_string(), String::new(), "5.12".to_string()],
        },
    ];

    let book = OutputBook::new(metrics)
        .with_block(kaiser)
        .with_block(TickerBlock::new("RS", "Reliance Steel & Aluminum").failed("HTTP 503"));

    // 1. Consolidated CSV
    println!("1. Consolidated CSV\n");
    println!(
        "{}",
        String::from_utf8(book.export_to_bytes(ExportFormat::Csv)?)?
    );

    // 2. Per-ticker JSON
    println!("2. Per-ticker JSON\n");
    let per_ticker = book.clone().with_layout(Layout::PerTicker);
    println!(
        "{}\n",
        String::from_utf8(per_ticker.export_to_bytes(ExportFormat::Json)?)?
    );

    // 3. Workbook in the temp directory
    let path = std::env::temp_dir().join("Stock_Risk_Scores_demo.xlsx");
    per_ticker.export_to_file(&path, ExportFormat::Xlsx)?;
    println!("3. Workbook written to {}\n", path.display());

    // 4. Run report
    println!("4. Run report\n");
    println!(
        "{}",
        RunReport::from_book(&book)
            .with_output(path.display().to_string())
            .summary()
    );

    Ok(())
}
