use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;
use usagom::{Field, ModelSchema, UsageError};
use walkdir::WalkDir;

use crate::context::ProjectContext;
use crate::output::{Output, Report, Tone};

pub const EXAMPLES: &str = "\
Examples:
  usagom schema list                                   # Schemas found in the schemas directory
  usagom schema inspect 'core\\Permission'              # Usage and constraints of each field
  usagom schema inspect schemas/permission.json        # Inspect a document directly
  usagom schema fields 'core\\Permission'               # Fields holding their own value
  usagom schema validate 'core\\Permission' rows.json   # Check one record or an array of records
";

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// List schema documents in the schemas directory
    #[command(name = "list")]
    List,

    /// Show the resolved usage and constraints of every field
    #[command(name = "inspect")]
    Inspect {
        /// Entity name or path to a schema document
        schema: String,
    },

    /// Validate records against a schema
    #[command(name = "validate")]
    Validate {
        /// Entity name or path to a schema document
        schema: String,

        /// JSON file holding a record object or an array of records
        records: PathBuf,
    },

    /// List fields that hold a value of their own
    #[command(name = "fields")]
    Fields {
        /// Entity name or path to a schema document
        schema: String,
    },
}

pub fn handle_schema_commands(command: SchemaCommands, output: &Output) -> Result<()> {
    let ctx = ProjectContext::find()?;
    if !ctx.is_initialized() {
        log::info!("no {} found, using {}", ctx.config_path.display(), ctx.schemas_dir.display());
    }

    match command {
        SchemaCommands::List => handle_list(&ctx, output),
        SchemaCommands::Inspect { schema } => handle_inspect(&ctx, &schema, output),
        SchemaCommands::Validate { schema, records } => handle_validate(&ctx, &schema, &records, output),
        SchemaCommands::Fields { schema } => handle_fields(&ctx, &schema, output),
    }
}

struct SchemaFile {
    path: PathBuf,
    schema: Result<ModelSchema, UsageError>,
}

fn discover_schemas(dir: &Path) -> Vec<SchemaFile> {
    let mut found: Vec<SchemaFile> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(|ext| ext.to_str()),
                Some("json") | Some("toml")
            )
        })
        .map(|entry| {
            let path = entry.into_path();
            let schema = ModelSchema::load(&path);
            SchemaFile { path, schema }
        })
        .collect();
    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}

/// Loads `target` as a document path, or finds the schema declaring that entity.
fn resolve_schema(ctx: &ProjectContext, target: &str) -> Result<ModelSchema> {
    let path = Path::new(target);
    if path.is_file() {
        return ModelSchema::load(path).with_context(|| format!("Failed to load {}", path.display()));
    }

    for file in discover_schemas(&ctx.schemas_dir) {
        match file.schema {
            Ok(schema) if schema.entity() == target => {
                log::info!("using {}", file.path.display());
                return Ok(schema);
            }
            Ok(_) => {}
            Err(err) => log::warn!("skipping {}: {err}", file.path.display()),
        }
    }

    anyhow::bail!("No schema for '{target}' in {}", ctx.schemas_dir.display())
}

#[derive(Serialize)]
struct SchemaSummary {
    entity: Option<String>,
    path: String,
    fields: usize,
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(transparent)]
struct SchemaList(Vec<SchemaSummary>);

impl Report for SchemaList {
    fn table(&self, output: &Output) -> Table {
        let mut table = output.table(&["Entity", "Fields", "Document"]);
        for summary in &self.0 {
            let entity = match (&summary.entity, &summary.error) {
                (Some(entity), _) => Cell::new(entity),
                (None, Some(error)) => output.flagged(error),
                (None, None) => Cell::new("-"),
            };
            table.add_row(vec![entity, Cell::new(summary.fields), Cell::new(&summary.path)]);
        }
        table
    }

    fn compact(&self) -> String {
        self.0
            .iter()
            .filter_map(|summary| summary.entity.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn handle_list(ctx: &ProjectContext, output: &Output) -> Result<()> {
    output.heading("Schemas");
    let files = discover_schemas(&ctx.schemas_dir);
    if files.is_empty() {
        output.status(Tone::Warn, &format!("No schema documents in {}", ctx.schemas_dir.display()));
        return Ok(());
    }

    let summaries = files
        .into_iter()
        .map(|file| {
            let path = file
                .path
                .strip_prefix(&ctx.project_root)
                .unwrap_or(&file.path)
                .display()
                .to_string();
            match file.schema {
                Ok(schema) => SchemaSummary {
                    entity: Some(schema.entity().to_string()),
                    path,
                    fields: schema.len(),
                    error: None,
                },
                Err(err) => SchemaSummary {
                    entity: None,
                    path,
                    fields: 0,
                    error: Some(err.to_string()),
                },
            }
        })
        .collect();
    output.emit(&SchemaList(summaries))
}

#[derive(Serialize)]
struct FieldReport {
    name: String,
    #[serde(rename = "type")]
    field_type: Option<String>,
    result_type: Option<String>,
    usage: Option<String>,
    constraints: Vec<String>,
    error: Option<String>,
}

impl FieldReport {
    fn from_field(field: &Field) -> Self {
        let descriptor = field.descriptor();
        let usage = field.usage().ok().map(|usage| usage.usage_string().to_string());
        let (constraints, error): (Vec<String>, Option<String>) = match field.constraints() {
            Ok(constraints) => (constraints.keys().map(str::to_string).collect(), None),
            Err(err) => (Vec::new(), Some(err.to_string())),
        };
        Self {
            name: field.name().to_string(),
            field_type: descriptor.field_type().map(str::to_string),
            result_type: descriptor.result_type().map(str::to_string),
            usage,
            constraints,
            error,
        }
    }
}

#[derive(Serialize)]
struct SchemaReport {
    entity: String,
    fields: Vec<FieldReport>,
}

impl Report for SchemaReport {
    fn table(&self, output: &Output) -> Table {
        let mut table = output.table(&["Field", "Type", "Result type", "Usage", "Constraints"]);
        for field in &self.fields {
            let usage = match (&field.usage, &field.error) {
                (Some(usage), None) => Cell::new(usage),
                (_, Some(error)) => output.flagged(error),
                (None, None) => Cell::new("-"),
            };
            table.add_row(vec![
                Cell::new(&field.name),
                Cell::new(field.field_type.as_deref().unwrap_or("-")),
                Cell::new(field.result_type.as_deref().unwrap_or("-")),
                usage,
                Cell::new(field.constraints.join(", ")),
            ]);
        }
        table
    }

    fn compact(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{}={}", field.name, field.usage.as_deref().unwrap_or("?")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn handle_inspect(ctx: &ProjectContext, target: &str, output: &Output) -> Result<()> {
    let schema = resolve_schema(ctx, target)?;
    match schema.description() {
        Some(description) => output.heading(&format!("{}: {description}", schema.entity())),
        None => output.heading(schema.entity()),
    }

    let report = SchemaReport {
        entity: schema.entity().to_string(),
        fields: schema.fields().map(FieldReport::from_field).collect(),
    };
    let unresolved = report.fields.iter().filter(|field| field.error.is_some()).count();
    output.emit(&report)?;
    if unresolved > 0 {
        output.status(Tone::Warn, &format!("{unresolved} field(s) could not be resolved"));
    }
    Ok(())
}

#[derive(Serialize)]
struct RecordIssue {
    record: usize,
    field: String,
    code: String,
    message: String,
}

#[derive(Serialize)]
struct ValidationReport {
    entity: String,
    records: usize,
    issues: Vec<RecordIssue>,
}

impl Report for ValidationReport {
    fn table(&self, output: &Output) -> Table {
        let mut table = output.table(&["Record", "Field", "Code", "Message"]);
        for issue in &self.issues {
            table.add_row(vec![
                Cell::new(issue.record),
                Cell::new(&issue.field),
                output.flagged(&issue.code),
                Cell::new(&issue.message),
            ]);
        }
        table
    }

    fn compact(&self) -> String {
        format!("{} record(s), {} issue(s)", self.records, self.issues.len())
    }
}

fn read_records(path: &Path) -> Result<Vec<serde_json::Map<String, Value>>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    let records = match value {
        Value::Object(record) => vec![record],
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                _ => anyhow::bail!("Record {index} in {} is not an object", path.display()),
            })
            .collect::<Result<_>>()?,
        _ => anyhow::bail!("{} must hold an object or an array of objects", path.display()),
    };
    Ok(records)
}

fn handle_validate(ctx: &ProjectContext, target: &str, records_path: &Path, output: &Output) -> Result<()> {
    let schema = resolve_schema(ctx, target)?;
    let records = read_records(records_path)?;
    output.heading(&format!("Validating {} record(s) of {}", records.len(), schema.entity()));

    let mut issues = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match schema.validate(record) {
            Ok(()) => {}
            Err(UsageError::Validation(err)) => {
                issues.extend(err.issues.into_iter().map(|issue| RecordIssue {
                    record: index,
                    field: issue.field,
                    code: issue.code,
                    message: issue.message,
                }));
            }
            Err(err) => return Err(err).with_context(|| format!("Record {index} could not be validated")),
        }
    }

    let report = ValidationReport {
        entity: schema.entity().to_string(),
        records: records.len(),
        issues,
    };

    if report.issues.is_empty() {
        output.status(Tone::Ok, "All records are valid");
        return Ok(());
    }
    output.emit(&report)?;
    anyhow::bail!("{} validation issue(s) found in {}", report.issues.len(), report.entity)
}

#[derive(Serialize)]
struct ExportableFields {
    entity: String,
    fields: Vec<String>,
}

impl Report for ExportableFields {
    fn table(&self, output: &Output) -> Table {
        let mut table = output.table(&["Field"]);
        for field in &self.fields {
            table.add_row(vec![Cell::new(field)]);
        }
        table
    }

    fn compact(&self) -> String {
        self.fields.join(",")
    }
}

fn handle_fields(ctx: &ProjectContext, target: &str, output: &Output) -> Result<()> {
    let schema = resolve_schema(ctx, target)?;
    output.heading(&format!("Exportable fields of {}", schema.entity()));
    let report = ExportableFields {
        entity: schema.entity().to_string(),
        fields: schema.exportable_fields().into_iter().map(str::to_string).collect(),
    };
    output.emit(&report)
}
