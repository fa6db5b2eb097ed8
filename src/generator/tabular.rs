//! Tabular data reporting tasks.
//!
//! The agent reads values from a text or CSV file, places them in a
//! spreadsheet and saves it as `result.xlsx` on the Desktop. Ground truth is
//! the value of a single result cell.

use crate::categories::TaskType;
use crate::error::GeneratorError;
use crate::generator::domains::{
    self, Aggregation, Calculation, DataFormat, DataScenario, ValueRange, DATA_SCENARIOS,
};
use crate::generator::format::{label_from_identifier, round_to, title_case, with_thousands, CellValue};
use crate::generator::instance::{Artifact, ArtifactRole, GroundTruth, TaskInstance};
use crate::generator::rng::SeededRng;
use crate::generator::{Result, SelectionHints};
use crate::setup::VmLayout;
use std::collections::BTreeMap;
use std::fmt;

const RESULT_FILE: &str = "result.xlsx";
const OUTPUT_FILE: &str = "output.txt";
const EXPECTED_SHEET: &str = "expected_result.xlsx";
const FILE_SUFFIXES: &[&str] = &["data", "records", "list", "info", "report"];
const FILE_EXTENSIONS: &[&str] = &[".txt", ".csv", ".dat"];

/// Scenario-derived names for one instance.
struct ScenarioContext {
    scenario: &'static DataScenario,
    format: DataFormat,
    data_type: &'static str,
    operation: &'static str,
    context: &'static str,
    file_prefix: &'static str,
    data_file: String,
}

fn select_context(rng: &mut SeededRng, hints: &SelectionHints) -> Result<ScenarioContext> {
    let scenario = domains::select(rng, DATA_SCENARIOS, hints.domain(), "data scenario")?;
    let format = *domains::select(rng, &DataFormat::ALL, hints.variant(), "data format")?;
    let data_type = *rng.pick(scenario.data_types, "data types")?;
    let operation = *rng.pick(scenario.operations, "operations")?;
    let context = *rng.pick(scenario.contexts, "contexts")?;
    let file_prefix = *rng.pick(scenario.file_prefixes, "file prefixes")?;
    let suffix = rng.pick(FILE_SUFFIXES, "file suffixes")?;
    let number = rng.range(100..=999);
    let extension = rng.pick(FILE_EXTENSIONS, "file extensions")?;
    Ok(ScenarioContext {
        scenario,
        format,
        data_type,
        operation,
        context,
        file_prefix,
        data_file: format!("{}_{}_{}{}", file_prefix, suffix, number, extension),
    })
}

/// Value magnitude drawn for a level.
#[derive(Debug, Clone, Copy)]
enum Magnitude {
    Low,
    Medium,
    High,
}

fn draw_values(
    rng: &mut SeededRng,
    scenario: &DataScenario,
    magnitude: Magnitude,
    count: usize,
) -> Vec<CellValue> {
    (0..count)
        .map(|_| match magnitude {
            Magnitude::Low => match scenario.low {
                ValueRange::Whole(lo, hi) => CellValue::Int(rng.range(lo..=hi)),
                ValueRange::Tenths(lo, hi) => CellValue::Float(round_to(rng.uniform(lo, hi), 1)),
            },
            Magnitude::Medium => CellValue::Int(rng.range(scenario.medium.0..=scenario.medium.1)),
            Magnitude::High => CellValue::Int(rng.range(scenario.high.0..=scenario.high.1)),
        })
        .collect()
}

fn integers(values: &[CellValue]) -> Result<Vec<i64>> {
    values
        .iter()
        .map(|value| match value {
            CellValue::Int(v) => Ok(*v),
            CellValue::Float(v) => Err(GeneratorError::Inconsistent(format!(
                "expected whole numbers for a two-column calculation, got {}",
                v
            ))),
        })
        .collect()
}

/// Renders data points in the instance's file format.
///
/// A single value gets a compact layout with no surrounding numbers, so there
/// is exactly one candidate for the agent to transfer.
fn render_data_file(values: &[CellValue], ctx: &ScenarioContext) -> Result<String> {
    let label = label_from_identifier(ctx.data_type);
    let content = match values {
        [] => {
            return Err(GeneratorError::Inconsistent(
                "cannot format a data file with no values".to_string(),
            ))
        }
        [value] => match ctx.format {
            DataFormat::SimpleValues => value.to_string(),
            DataFormat::LabeledEntries => format!("Target {}: {}", label, value),
            DataFormat::StructuredRecords => {
                format!("Data Record | {}: {} | Source: Verified", ctx.data_type, value)
            }
            DataFormat::FormattedReports => format!(
                "=== {} Data ===\n\nValue: {}\n\n[End of Report]",
                title_case(ctx.context),
                value
            ),
        },
        values => match ctx.format {
            DataFormat::SimpleValues => values
                .iter()
                .map(CellValue::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            DataFormat::LabeledEntries => values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("{} {}: {}", label, i + 1, v))
                .collect::<Vec<_>>()
                .join("\n"),
            DataFormat::StructuredRecords => values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("Record {} | {}: {} | Status: Active", i + 1, ctx.data_type, v))
                .collect::<Vec<_>>()
                .join("\n"),
            DataFormat::FormattedReports => {
                let mut lines = vec![format!("=== {} Report ===", title_case(ctx.context)), String::new()];
                lines.extend(values.iter().enumerate().map(|(i, v)| {
                    let rendered = match v {
                        CellValue::Int(n) => with_thousands(*n),
                        CellValue::Float(_) => v.to_string(),
                    };
                    format!("Entry {:02}: {}", i + 1, rendered)
                }));
                lines.push(format!("\nTotal entries: {}", values.len()));
                lines.push("Note: Use only the values after 'Entry XX:' for calculations".to_string());
                lines.join("\n")
            }
        },
    };
    Ok(content)
}

/// A spreadsheet cell such as `D4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRef {
    column: char,
    row: usize,
}

impl CellRef {
    fn draw(rng: &mut SeededRng, columns: &[char], max_row: usize) -> Result<Self> {
        let column = *rng.pick(columns, "cell columns")?;
        let row = rng.range(1..=max_row as i64) as usize;
        Ok(Self { column, row })
    }

    fn column_index(&self) -> usize {
        (self.column as u8 - b'A') as usize
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// Reference sheet as CSV: `rows` pre-filled from the top-left, then `value`
/// written at `cell`. Missing cells are left empty.
fn expected_sheet(rows: &[Vec<String>], cell: CellRef, value: CellValue) -> String {
    let height = rows.len().max(cell.row);
    let width = rows
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(cell.column_index() + 1);
    let mut grid = vec![vec![String::new(); width]; height];
    for (r, row) in rows.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            grid[r][c] = text.clone();
        }
    }
    grid[cell.row - 1][cell.column_index()] = value.to_string();
    grid.iter()
        .map(|row| format!("{}\n", row.join(",")))
        .collect()
}

fn assemble(
    task_type: TaskType,
    rng: &SeededRng,
    ctx: &ScenarioContext,
    artifacts: BTreeMap<ArtifactRole, Artifact>,
    ground_truth: GroundTruth,
    instructions: String,
    mut details: BTreeMap<String, String>,
) -> TaskInstance {
    details.insert("data_format".to_string(), ctx.format.as_str().to_string());
    details.insert("data_type".to_string(), ctx.data_type.to_string());
    details.insert("operation".to_string(), ctx.operation.to_string());
    TaskInstance {
        task_type,
        level: task_type.level(),
        seed: rng.seed(),
        domain: ctx.scenario.name.to_string(),
        template_variant: ctx.format.as_str().to_string(),
        artifacts,
        ground_truth,
        instructions,
        details,
    }
}

/// Level 1: copy one value from a text file into a given cell.
pub fn data_transfer(
    rng: &mut SeededRng,
    layout: &VmLayout,
    hints: &SelectionHints,
) -> Result<TaskInstance> {
    let ctx = select_context(rng, hints)?;
    let values = draw_values(rng, ctx.scenario, Magnitude::Low, 1);
    let content = render_data_file(&values, &ctx)?;
    let cell = CellRef::draw(rng, &['A', 'B', 'C', 'D'], 8)?;
    let value = values[0];

    let value_instruction = match ctx.format {
        DataFormat::SimpleValues => {
            "The standalone numeric value from the file should be identified (ignore headers or labels)"
                .to_string()
        }
        DataFormat::LabeledEntries => format!(
            "The value labeled 'Target {}' needs to be located",
            label_from_identifier(ctx.data_type)
        ),
        DataFormat::StructuredRecords => {
            format!("The {} value from the data record should be retrieved", ctx.data_type)
        }
        DataFormat::FormattedReports => {
            "The main 'Value' from the data report needs to be identified (ignore headers and footers)"
                .to_string()
        }
    };
    let instructions = format!(
        "Complete a data extraction task using '{}' from the Desktop with a text editor. {} and record \
         this result in cell {} of a blank spreadsheet. Save the completed analysis as '{}' on the Desktop.",
        ctx.data_file, value_instruction, cell, RESULT_FILE
    );

    let mut artifacts = BTreeMap::new();
    artifacts.insert(ArtifactRole::MainFile, Artifact::new(&ctx.data_file, content));
    artifacts.insert(
        ArtifactRole::ExpectedSpreadsheet,
        Artifact::workbook(EXPECTED_SHEET, expected_sheet(&[], cell, value)),
    );

    let ground_truth = GroundTruth::Cell {
        result_path: layout.desktop_path(RESULT_FILE),
        coordinate: cell.to_string(),
        value,
    };
    Ok(assemble(
        TaskType::SimpleDataTransfer,
        rng,
        &ctx,
        artifacts,
        ground_truth,
        instructions,
        BTreeMap::new(),
    ))
}

fn aggregate(aggregation: Aggregation, values: &[CellValue]) -> Result<CellValue> {
    if values.is_empty() {
        return Err(GeneratorError::Inconsistent(format!(
            "cannot compute {} over no values",
            aggregation.as_str()
        )));
    }
    let result = match aggregation {
        Aggregation::Count => CellValue::Int(values.len() as i64),
        Aggregation::Sum => match integers(values) {
            Ok(ints) => CellValue::Int(ints.iter().sum()),
            Err(_) => CellValue::Float(values.iter().map(CellValue::as_f64).sum()),
        },
        Aggregation::Average => {
            let total: f64 = values.iter().map(CellValue::as_f64).sum();
            CellValue::Float(round_to(total / values.len() as f64, 2))
        }
    };
    Ok(result)
}

/// Level 2: gather a list of values into column A and aggregate them.
pub fn aggregation(
    rng: &mut SeededRng,
    layout: &VmLayout,
    hints: &SelectionHints,
) -> Result<TaskInstance> {
    let ctx = select_context(rng, hints)?;
    let count = rng.range(3..=8) as usize;
    let values = draw_values(rng, ctx.scenario, Magnitude::Medium, count);
    let content = render_data_file(&values, &ctx)?;
    let cell = CellRef::draw(rng, &['D', 'E', 'F', 'G'], 8)?;
    let (aggregation, description) = *rng.pick(&ctx.scenario.aggregations, "aggregations")?;
    let value = aggregate(aggregation, &values)?;

    let extract_instruction = match ctx.format {
        DataFormat::SimpleValues => {
            "All numeric values from the file need to be gathered (one per line)".to_string()
        }
        DataFormat::LabeledEntries => format!(
            "Only the main data values after the colon should be collected (ignore entry numbers) from each '{}' line",
            label_from_identifier(ctx.data_type)
        ),
        DataFormat::StructuredRecords => format!(
            "Only the {} values from each data record should be collected (ignore record numbers and status)",
            ctx.data_type
        ),
        DataFormat::FormattedReports => {
            "Only the numeric values after 'Entry XX:' need to be gathered (ignore entry numbers, headers, and totals)"
                .to_string()
        }
    };
    let instructions = format!(
        "Complete a data aggregation task using '{}' from the Desktop with a text editor or file viewer \
         (avoid LibreOffice for proper data parsing). {} and compile these values in column A of \
         LibreOffice Calc spreadsheet. Then determine the {} in cell {}. Save the completed analysis as \
         '{}' on the Desktop.",
        ctx.data_file, extract_instruction, description, cell, RESULT_FILE
    );

    let column_a: Vec<Vec<String>> = values.iter().map(|v| vec![v.to_string()]).collect();
    let mut artifacts = BTreeMap::new();
    artifacts.insert(ArtifactRole::MainFile, Artifact::new(&ctx.data_file, content));
    artifacts.insert(
        ArtifactRole::ExpectedSpreadsheet,
        Artifact::workbook(EXPECTED_SHEET, expected_sheet(&column_a, cell, value)),
    );

    let mut details = BTreeMap::new();
    details.insert("aggregation".to_string(), aggregation.as_str().to_string());
    details.insert(
        "formula_hint".to_string(),
        format!("={}(A1:A{})", aggregation.as_str(), values.len()),
    );

    let ground_truth = GroundTruth::Cell {
        result_path: layout.desktop_path(RESULT_FILE),
        coordinate: cell.to_string(),
        value,
    };
    Ok(assemble(
        TaskType::BasicDataAggregation,
        rng,
        &ctx,
        artifacts,
        ground_truth,
        instructions,
        details,
    ))
}

fn calculate(calculation: Calculation, column_a: &[i64], column_b: &[i64]) -> Result<CellValue> {
    if column_a.is_empty() || column_a.len() != column_b.len() {
        return Err(GeneratorError::Inconsistent(format!(
            "two-column calculation needs equal, non-empty columns ({} vs {})",
            column_a.len(),
            column_b.len()
        )));
    }
    let result = match calculation {
        Calculation::SumColumns => {
            CellValue::Int(column_a.iter().sum::<i64>() + column_b.iter().sum::<i64>())
        }
        Calculation::MultiplyColumns => {
            CellValue::Int(column_a.iter().zip(column_b).map(|(a, b)| a * b).sum())
        }
        Calculation::AverageColumnA => {
            let total: i64 = column_a.iter().sum();
            CellValue::Float(round_to(total as f64 / column_a.len() as f64, 2))
        }
    };
    Ok(result)
}

/// Level 3: compute over a pre-populated two-column sheet and also write the
/// result to a text file.
///
/// The sheet is shipped as CSV with a header row, so data occupies rows
/// `2..=rows + 1`.
pub fn calculation_output(
    rng: &mut SeededRng,
    layout: &VmLayout,
    hints: &SelectionHints,
) -> Result<TaskInstance> {
    let ctx = select_context(rng, hints)?;
    let rows = rng.range(3..=5) as usize;
    let column_a = integers(&draw_values(rng, ctx.scenario, Magnitude::High, rows))?;
    let column_b = integers(&draw_values(rng, ctx.scenario, Magnitude::High, rows))?;
    let phrase = *rng.pick(&ctx.scenario.calculations, "calculations")?;
    let value = calculate(phrase.calculation, &column_a, &column_b)?;
    let last_row = rows + 1;
    let formula_hint = match phrase.calculation {
        Calculation::SumColumns => format!("=SUM(A2:A{0})+SUM(B2:B{0})", last_row),
        Calculation::MultiplyColumns => format!("=SUMPRODUCT(A2:A{0},B2:B{0})", last_row),
        Calculation::AverageColumnA => format!("=AVERAGE(A2:A{})", last_row),
    };
    let cell = CellRef::draw(rng, &['C', 'D', 'E'], rows + 5)?;
    let sheet_name = format!("{}_analysis_data.csv", ctx.file_prefix);

    let [header_a, header_b] = ctx.scenario.headers;
    let mut table = vec![vec![header_a.to_string(), header_b.to_string()]];
    table.extend(
        column_a
            .iter()
            .zip(&column_b)
            .map(|(a, b)| vec![a.to_string(), b.to_string()]),
    );
    let csv: String = table.iter().map(|row| format!("{}\n", row.join(","))).collect();

    let instructions = format!(
        "Complete a data analysis task using the pre-populated spreadsheet '{}' from the Desktop. \
         Using the values in the spreadsheet, {}. Record the {} in cell {} and save the updated \
         spreadsheet as '{}'. Additionally, save just the calculated result to '{}'.",
        sheet_name, phrase.description, phrase.result_name, cell, RESULT_FILE, OUTPUT_FILE
    );

    let mut artifacts = BTreeMap::new();
    artifacts.insert(ArtifactRole::MainFile, Artifact::new(&sheet_name, csv));
    artifacts.insert(
        ArtifactRole::ExpectedSpreadsheet,
        Artifact::workbook(EXPECTED_SHEET, expected_sheet(&table, cell, value)),
    );

    let mut details = BTreeMap::new();
    details.insert("calculation".to_string(), phrase.calculation.as_str().to_string());
    details.insert("formula_hint".to_string(), formula_hint);
    details.insert("context".to_string(), ctx.context.to_string());

    let ground_truth = GroundTruth::CellAndOutput {
        result_path: layout.desktop_path(RESULT_FILE),
        coordinate: cell.to_string(),
        value,
        output_path: layout.desktop_path(OUTPUT_FILE),
        output: format!("{}\n", value),
    };
    Ok(assemble(
        TaskType::SimpleCalculationOutput,
        rng,
        &ctx,
        artifacts,
        ground_truth,
        instructions,
        details,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::instance::ArtifactFormat;

    fn context(format: DataFormat) -> ScenarioContext {
        ScenarioContext {
            scenario: &DATA_SCENARIOS[0],
            format,
            data_type: "sales_records",
            operation: "analyze",
            context: "monthly sales",
            file_prefix: "sales",
            data_file: "sales_data_123.txt".to_string(),
        }
    }

    #[test]
    fn test_average_of_ten_twenty_thirty() {
        let values = [CellValue::Int(10), CellValue::Int(20), CellValue::Int(30)];
        assert_eq!(
            aggregate(Aggregation::Average, &values).unwrap(),
            CellValue::Float(20.0)
        );
        assert_eq!(aggregate(Aggregation::Sum, &values).unwrap(), CellValue::Int(60));
        assert_eq!(aggregate(Aggregation::Count, &values).unwrap(), CellValue::Int(3));
    }

    #[test]
    fn test_aggregate_rejects_empty_input() {
        let err = aggregate(Aggregation::Sum, &[]).unwrap_err();
        assert!(matches!(err, GeneratorError::Inconsistent(_)));
    }

    #[test]
    fn test_two_column_calculations() {
        let a = [2, 3, 4];
        let b = [10, 20, 30];
        assert_eq!(calculate(Calculation::SumColumns, &a, &b).unwrap(), CellValue::Int(69));
        assert_eq!(
            calculate(Calculation::MultiplyColumns, &a, &b).unwrap(),
            CellValue::Int(200)
        );
        assert_eq!(
            calculate(Calculation::AverageColumnA, &a, &b).unwrap(),
            CellValue::Float(3.0)
        );
        assert!(calculate(Calculation::SumColumns, &a, &b[..2]).is_err());
    }

    #[test]
    fn test_single_value_layouts() {
        let value = [CellValue::Int(250)];
        assert_eq!(
            render_data_file(&value, &context(DataFormat::SimpleValues)).unwrap(),
            "250"
        );
        assert_eq!(
            render_data_file(&value, &context(DataFormat::LabeledEntries)).unwrap(),
            "Target Sales Records: 250"
        );
        assert_eq!(
            render_data_file(&value, &context(DataFormat::StructuredRecords)).unwrap(),
            "Data Record | sales_records: 250 | Source: Verified"
        );
        assert_eq!(
            render_data_file(&value, &context(DataFormat::FormattedReports)).unwrap(),
            "=== Monthly Sales Data ===\n\nValue: 250\n\n[End of Report]"
        );
    }

    #[test]
    fn test_report_groups_thousands() {
        let values = [CellValue::Int(1500), CellValue::Int(720)];
        let report = render_data_file(&values, &context(DataFormat::FormattedReports)).unwrap();
        assert_eq!(
            report,
            "=== Monthly Sales Report ===\n\nEntry 01: 1,500\nEntry 02: 720\n\nTotal entries: 2\n\
             Note: Use only the values after 'Entry XX:' for calculations"
        );
    }

    #[test]
    fn test_empty_data_file_is_inconsistent() {
        let err = render_data_file(&[], &context(DataFormat::SimpleValues)).unwrap_err();
        assert!(matches!(err, GeneratorError::Inconsistent(_)));
    }

    #[test]
    fn test_expected_sheet_places_value() {
        let cell = CellRef { column: 'C', row: 2 };
        assert_eq!(expected_sheet(&[], cell, CellValue::Int(7)), ",,\n,,7\n");

        let rows = vec![vec!["10".to_string()], vec!["20".to_string()]];
        let cell = CellRef { column: 'B', row: 1 };
        assert_eq!(
            expected_sheet(&rows, cell, CellValue::Float(15.0)),
            "10,15.0\n20,\n"
        );
    }

    #[test]
    fn test_expected_sheet_is_workbook() {
        let mut rng = SeededRng::new(12);
        let instance =
            aggregation(&mut rng, &VmLayout::default(), &SelectionHints::default()).expect("generate");
        let sheet = instance.artifact(ArtifactRole::ExpectedSpreadsheet).unwrap();
        assert_eq!(sheet.filename, "expected_result.xlsx");
        assert_eq!(sheet.format, ArtifactFormat::Workbook);

        let GroundTruth::Cell { coordinate, value, .. } = &instance.ground_truth else {
            panic!("wrong ground truth");
        };
        let cell = CellRef {
            column: coordinate.chars().next().unwrap(),
            row: coordinate[1..].parse().unwrap(),
        };
        let row = sheet.content.lines().nth(cell.row - 1).unwrap();
        let text = row.split(',').nth(cell.column_index()).unwrap();
        assert_eq!(text, value.to_string());
    }

    #[test]
    fn test_scientific_transfer_uses_one_decimal() {
        let hints = SelectionHints::new().with_domain("scientific_research");
        for seed in 0..10 {
            let mut rng = SeededRng::new(seed);
            let instance = data_transfer(&mut rng, &VmLayout::default(), &hints).expect("generate");
            let GroundTruth::Cell { value, .. } = instance.ground_truth else {
                panic!("wrong ground truth");
            };
            let CellValue::Float(v) = value else {
                panic!("expected a fractional value, got {:?}", value);
            };
            assert_eq!(round_to(v, 1), v);
            assert!((0.1..=10.0).contains(&v));
        }
    }

    #[test]
    fn test_calculation_output_sheet_matches_columns() {
        for seed in 0..10 {
            let mut rng = SeededRng::new(seed);
            let instance = calculation_output(&mut rng, &VmLayout::default(), &SelectionHints::default())
                .expect("generate");
            let sheet = &instance.artifact(ArtifactRole::MainFile).unwrap();
            assert!(sheet.filename.ends_with("_analysis_data.csv"));
            let rows: Vec<&str> = sheet.content.lines().collect();
            assert!((4..=6).contains(&rows.len()));
            assert!(rows.iter().all(|row| row.split(',').count() == 2));

            let GroundTruth::CellAndOutput {
                value,
                output,
                output_path,
                ..
            } = &instance.ground_truth
            else {
                panic!("wrong ground truth");
            };
            assert_eq!(output, &format!("{}\n", value));
            assert_eq!(output_path, "/home/user/Desktop/output.txt");
            assert!(instance.detail("formula_hint").unwrap().starts_with('='));
        }
    }
}
