//! Command implementations.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{Instrument, info, info_span};

use survey_model::{ColumnDefinition, SurveyId};
use survey_persistence::{JsonFileStore, MemoryStore, SurveyStore};
use survey_table::{BatchErrors, EditController, MemorySink, SaveError};
use survey_validate::{ColumnSearch, StaticTaxonomy};

use crate::cli::{ColumnKindArg, ColumnsArgs, ValidateArgs};
use crate::config::CliConfig;
use crate::import::read_rows;
use crate::report::ValidateResult;
use crate::summary::column_table;

pub async fn run_validate(args: &ValidateArgs) -> Result<ValidateResult> {
    let survey = SurveyId::new(args.survey);
    let span = info_span!("validate", survey = %survey);
    validate_inner(args, survey).instrument(span).await
}

async fn validate_inner(args: &ValidateArgs, survey: SurveyId) -> Result<ValidateResult> {
    let config = CliConfig::load(args.config.as_deref())?;
    let taxonomy = Arc::new(load_taxonomy(&args.taxonomy)?);
    let catalogue = catalogue(&taxonomy);

    let file = File::open(&args.rows)
        .with_context(|| format!("open observation rows {}", args.rows.display()))?;
    let imported = read_rows(file, &catalogue)
        .with_context(|| format!("read observation rows {}", args.rows.display()))?;
    let extra = resolve_columns(&args.columns, &catalogue)?;

    let store: Arc<dyn SurveyStore> = match &args.state_dir {
        Some(dir) => Arc::new(JsonFileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    };
    let sink = Arc::new(MemorySink::new());
    let mut table = EditController::new(survey, config.table, taxonomy, sink.clone(), store);
    table.add_columns(imported.columns);
    table.add_columns(extra);
    let staged = table.stage_rows(imported.rows).len();
    info!(
        rows = staged,
        columns = table.registry().dynamic_columns().len(),
        "staged observation rows"
    );

    let (report, errors) = match table.stop_edit_and_save_rows().await {
        Ok(report) => (Some(report), BatchErrors::default()),
        Err(SaveError::Invalid(errors)) => (None, errors),
        Err(error) => return Err(error).context("save observation rows"),
    };

    let output = match (&report, &args.output) {
        (Some(_), Some(path)) => {
            write_rows(path, &sink, survey)?;
            Some(path.clone())
        }
        _ => None,
    };

    Ok(ValidateResult {
        source: args.rows.clone(),
        survey,
        staged,
        report,
        errors,
        columns: table.registry().columns(),
        output,
    })
}

pub async fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let taxonomy = load_taxonomy(&args.taxonomy)?;
    let mut columns = Vec::new();
    if matches!(args.kind, ColumnKindArg::Measurement | ColumnKindArg::All) {
        columns.extend(
            taxonomy
                .search_measurement_columns(&args.term)
                .await
                .context("search measurement columns")?,
        );
    }
    if matches!(args.kind, ColumnKindArg::Environment | ColumnKindArg::All) {
        columns.extend(
            taxonomy
                .search_environment_columns(&args.term)
                .await
                .context("search environment columns")?,
        );
    }
    if columns.is_empty() {
        println!("No columns match '{}'.", args.term);
        return Ok(());
    }
    println!("{}", column_table(&columns));
    Ok(())
}

fn load_taxonomy(path: &Path) -> Result<StaticTaxonomy> {
    StaticTaxonomy::from_json_file(path).context("load taxonomy")
}

/// Every column the taxonomy can activate.
fn catalogue(taxonomy: &StaticTaxonomy) -> Vec<ColumnDefinition> {
    let mut columns = taxonomy.measurement_columns();
    columns.extend(taxonomy.environments.iter().cloned());
    columns
}

fn resolve_columns(
    ids: &[String],
    catalogue: &[ColumnDefinition],
) -> Result<Vec<ColumnDefinition>> {
    ids.iter()
        .map(|id| {
            let id = id.trim();
            match catalogue
                .iter()
                .find(|column| column.field_id.eq_ignore_ascii_case(id))
            {
                Some(column) => Ok(column.clone()),
                None => bail!("unknown column '{id}' (not in the taxonomy catalogue)"),
            }
        })
        .collect()
}

fn write_rows(path: &Path, sink: &MemorySink, survey: SurveyId) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create output {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &sink.rows(survey))
        .with_context(|| format!("write output {}", path.display()))?;
    Ok(())
}
