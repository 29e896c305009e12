//! End-to-end runs of the validate command against files on disk.

use std::path::{Path, PathBuf};

use survey_cli::cli::ValidateArgs;
use survey_cli::commands::run_validate;
use survey_cli::import::read_rows;
use survey_cli::summary::error_lines;
use survey_model::{QuantitativeDefinition, TaxonId, TaxonMeasurements};
use survey_validate::StaticTaxonomy;
use tempfile::TempDir;

const HEADER: &str = "itis_tsn,count,latitude,longitude,observation_date,Agent Count,notes";

fn write_taxonomy(dir: &Path) -> PathBuf {
    let taxonomy = StaticTaxonomy::new().with_taxon(
        TaxonId::new(2065),
        TaxonMeasurements {
            qualitative: vec![],
            quantitative: vec![QuantitativeDefinition {
                identifier: "agent_count".to_string(),
                label: "Agent Count".to_string(),
                description: None,
                min_value: Some(0.0),
                max_value: Some(50.0),
                unit: None,
            }],
        },
    );
    let path = dir.join("taxonomy.json");
    std::fs::write(&path, serde_json::to_string(&taxonomy).unwrap()).unwrap();
    path
}

fn write_rows(dir: &Path, records: &[&str]) -> PathBuf {
    let path = dir.join("rows.csv");
    let mut text = format!("{HEADER}\n");
    for record in records {
        text.push_str(record);
        text.push('\n');
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn args(dir: &TempDir, records: &[&str]) -> ValidateArgs {
    ValidateArgs {
        rows: write_rows(dir.path(), records),
        taxonomy: write_taxonomy(dir.path()),
        columns: vec![],
        survey: 1,
        state_dir: None,
        config: None,
        output: None,
    }
}

#[tokio::test]
async fn out_of_range_measurement_rejects_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let args = args(
        &dir,
        &[
            "2065,2,49.2,-123.1,2024-05-01,10,seen",
            "2065,1,49.2,-123.1,2024-05-01,75,",
        ],
    );

    let result = run_validate(&args).await.unwrap();
    assert!(result.has_errors());
    assert!(result.report.is_none());
    assert_eq!(result.staged, 2);
    insta::assert_snapshot!(
        error_lines(&result.errors, &result.columns),
        @"row 2 | Agent Count | Semantic | Value must be between 0 and 50."
    );
}

#[tokio::test]
async fn valid_file_is_committed_and_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = args(
        &dir,
        &[
            "2065,2,49.2,-123.1,2024-05-01,10,",
            "2065,1,49.3,-123.0,2024-05-02,,",
        ],
    );
    let output = dir.path().join("committed.json");
    let state = dir.path().join("state");
    args.output = Some(output.clone());
    args.state_dir = Some(state.clone());

    let result = run_validate(&args).await.unwrap();
    assert!(!result.has_errors());
    assert_eq!(result.report.as_ref().unwrap().saved.len(), 2);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 2);

    let settings = std::fs::read_to_string(state.join("survey-1.json")).unwrap();
    assert!(settings.contains("observations.dynamic_columns"));
    assert!(settings.contains("agent_count"));
}

#[tokio::test]
async fn missing_required_values_are_structural_errors() {
    let dir = tempfile::tempdir().unwrap();
    let args = args(&dir, &["2065,,49.2,-123.1,,,"]);

    let result = run_validate(&args).await.unwrap();
    insta::assert_snapshot!(
        error_lines(&result.errors, &result.columns),
        @r"
    row 1 | Count | Structural | Missing column: Count
    row 1 | Date | Structural | Missing column: Date
    "
    );
}

#[tokio::test]
async fn unknown_extra_column_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = args(&dir, &["2065,2,49.2,-123.1,2024-05-01,,"]);
    args.columns = vec!["wingspan".to_string()];

    let error = run_validate(&args).await.unwrap_err();
    assert!(error.to_string().contains("wingspan"));
}

#[test]
fn headers_match_display_names_and_bad_values_cite_the_line() {
    let csv = "Species,Count,Latitude\n180703,2,49.1\n180703,2.5,49.1\n";
    let error = read_rows(csv.as_bytes(), &[]).unwrap_err();
    let message = format!("{error:#}");
    assert!(message.contains("line 3"), "{message}");
    assert!(message.contains("count"), "{message}");

    let imported = read_rows("Species,Count\n180703,2\n".as_bytes(), &[]).unwrap();
    assert_eq!(imported.rows[0].itis_tsn, Some(TaxonId::new(180703)));
    assert_eq!(imported.rows[0].count, Some(2));
    assert!(imported.ignored_headers.is_empty());
}
