use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use tracing::{info, info_span};

use relnorm_core::{NormalizeOptions, NormalizeOutcome, Normalizer, default_registry};
use relnorm_ingest::{SchemaSheet, read_schema_sheet};
use relnorm_model::NormalForm;
use relnorm_report::{JsonReport, TextReport};

use crate::cli::{CheckArgs, NormalizeArgs, ReportFormatArg};
use crate::summary::{apply_table_style, header_cell};
use crate::types::{CheckResult, LevelCheck, NormalizeResult, RelationRow};

pub fn run_levels() -> Result<()> {
    let registry = default_registry();
    let mut table = Table::new();
    table.set_header(vec![header_cell("Level"), header_cell("Description")]);
    apply_table_style(&mut table);
    for level in registry.levels() {
        table.add_row(vec![level.as_str().to_string(), level.description().to_string()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizeResult> {
    let start = Instant::now();
    let sheet = load_sheet(&args.sheet)?;
    let target = args.level.unwrap_or(sheet.level);
    let source = sheet.relation.name.clone();
    let span = info_span!("normalize", relation = %source, target = %target);
    let _guard = span.enter();

    let options = NormalizeOptions {
        max_passes_per_level: args.max_passes,
        infer_foreign_keys: !args.no_foreign_keys,
        clean_redundant: !args.keep_redundant,
    };
    let normalizer = Normalizer::new().with_options(options);
    let relations = vec![sheet.relation];

    let (outcome, printed): (NormalizeOutcome, Option<String>) = match args.format {
        ReportFormatArg::Text => {
            let mut report = TextReport::new();
            let outcome = normalizer.normalize_with_reporter(relations, target, &mut report)?;
            let printed = match &args.output {
                Some(path) => {
                    report.write_to(path)?;
                    None
                }
                None => Some(report.into_string()),
            };
            (outcome, printed)
        }
        ReportFormatArg::Json => {
            let mut report = JsonReport::new();
            let outcome = normalizer.normalize_with_reporter(relations, target, &mut report)?;
            let printed = match &args.output {
                Some(path) => {
                    report.write_to(path)?;
                    None
                }
                None => Some(report.to_json_string()?),
            };
            (outcome, printed)
        }
    };

    let duration_ms = start.elapsed().as_millis();
    info!(
        relations = outcome.relations.len(),
        levels = outcome.levels.len(),
        duration_ms,
        "normalization complete"
    );

    Ok(NormalizeResult {
        sheet: args.sheet.clone(),
        source,
        target,
        relations: outcome.relations.iter().map(RelationRow::from).collect(),
        levels: outcome.levels,
        output: args.output.clone(),
        printed,
        duration_ms,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<CheckResult> {
    let sheet = load_sheet(&args.sheet)?;
    let span = info_span!("check", relation = %sheet.relation.name);
    let _guard = span.enter();

    let registry = default_registry();
    let mut levels = Vec::with_capacity(NormalForm::ALL.len());
    let mut holds = true;
    for level in NormalForm::ALL {
        let rule = registry
            .for_level(level)
            .ok_or_else(|| anyhow!("no rule registered for {level}"))?;
        let satisfied = rule.is_satisfied(&sheet.relation);
        holds = holds && satisfied;
        levels.push(LevelCheck {
            level,
            satisfied,
            cumulative: holds,
        });
    }

    let result = CheckResult {
        sheet: args.sheet.clone(),
        relation: sheet.relation.name,
        requested: sheet.level,
        levels,
    };
    info!(
        highest = result.highest().map_or("none", |level| level.as_str()),
        "check complete"
    );
    Ok(result)
}

fn load_sheet(path: &Path) -> Result<SchemaSheet> {
    read_schema_sheet(path).with_context(|| format!("load schema sheet {}", path.display()))
}
