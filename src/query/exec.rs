//! Execution of parsed query programs.
//!
//! A program runs inside a transient `Scope` seeded with exactly one
//! binding: the dataset under [`DATASET_BINDING`]. Every verb derives a new
//! value, so the canonical dataset is never touched. After the last
//! statement the [`RESULT_BINDING`] is extracted; a missing binding is the
//! "no result generated" failure. The scope is dropped on every exit path.
//!
//! Known limitation: there is no resource bounding. A generated program may
//! chain arbitrarily many scans, and no timeout is imposed on execution.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::error::{ChatError, Result};
use crate::frame::{Column, Dtype, Frame, Value};
use crate::query::ast::{Arg, CmpOp, Expr, Literal, Program, Stmt};
use crate::query::{parse_program, DATASET_BINDING, RESULT_BINDING};

/// Failure message when a program never assigns the result binding.
pub const NO_RESULT_MSG: &str = "no result generated";

/// A value produced during program evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecValue {
    /// A full table.
    Table(Frame),
    /// A table grouped by a key column, awaiting an aggregation verb.
    Grouped { frame: Frame, key: String },
    /// A single named column.
    Series(Column),
    /// A single named value.
    Scalar { name: String, value: Value },
}

impl ExecValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Grouped { .. } => "grouped table",
            Self::Series(_) => "column",
            Self::Scalar { .. } => "value",
        }
    }
}

/// The transient binding map a program runs within.
///
/// Created fresh per execution and discarded afterwards; nothing leaks
/// between questions.
pub struct Scope {
    bindings: HashMap<String, ExecValue>,
}

impl Scope {
    /// Creates a scope exposing only the dataset binding.
    pub fn new(dataset: &Frame) -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(DATASET_BINDING.to_string(), ExecValue::Table(dataset.clone()));
        Self { bindings }
    }

    fn get(&self, name: &str) -> Result<ExecValue> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::query(format!("unknown name '{name}'")))
    }

    fn set(&mut self, name: String, value: ExecValue) {
        self.bindings.insert(name, value);
    }

    fn take_result(&mut self) -> Option<ExecValue> {
        self.bindings.remove(RESULT_BINDING)
    }
}

/// Parses and executes a candidate program against the dataset.
///
/// Returns the value bound to [`RESULT_BINDING`], or a query error for any
/// parse failure, evaluation failure, or missing result.
pub fn execute(dataset: &Frame, program_text: &str) -> Result<ExecValue> {
    let program = parse_program(program_text)?;
    let mut scope = Scope::new(dataset);

    run_program(&mut scope, &program)?;

    match scope.take_result() {
        Some(ExecValue::Grouped { key, .. }) => Err(ChatError::query(format!(
            "groupby(\"{key}\") must be followed by an aggregation (sum, mean, min, max, count)"
        ))),
        Some(value) => {
            debug!(kind = value.kind(), "Program produced a result");
            Ok(value)
        }
        None => Err(ChatError::query(NO_RESULT_MSG)),
    }
}

fn run_program(scope: &mut Scope, program: &Program) -> Result<()> {
    for stmt in &program.stmts {
        run_stmt(scope, stmt)?;
    }
    Ok(())
}

fn run_stmt(scope: &mut Scope, stmt: &Stmt) -> Result<()> {
    let value = eval(scope, &stmt.expr)?;
    if let Some(target) = &stmt.target {
        scope.set(target.clone(), value);
    }
    Ok(())
}

fn eval(scope: &Scope, expr: &Expr) -> Result<ExecValue> {
    match expr {
        Expr::Ident(name) => scope.get(name),
        Expr::Literal(lit) => Ok(ExecValue::Scalar {
            name: "value".to_string(),
            value: lit.to_value(),
        }),
        Expr::Projection { recv, column } => {
            let recv = eval(scope, recv)?;
            project_column(recv, column)
        }
        Expr::MethodCall { recv, name, args } => {
            let recv = eval(scope, recv)?;
            call_method(recv, name, args)
        }
    }
}

fn project_column(recv: ExecValue, column: &str) -> Result<ExecValue> {
    match recv {
        ExecValue::Table(frame) => {
            let col = lookup_column(&frame, column)?;
            Ok(ExecValue::Series(col.clone()))
        }
        other => Err(ChatError::query(format!(
            "cannot select a column from a {}",
            other.kind()
        ))),
    }
}

fn call_method(recv: ExecValue, name: &str, args: &[Arg]) -> Result<ExecValue> {
    match recv {
        ExecValue::Table(frame) => table_method(frame, name, args),
        ExecValue::Grouped { frame, key } => grouped_method(frame, &key, name, args),
        ExecValue::Series(column) => series_method(column, name, args),
        ExecValue::Scalar { .. } => Err(ChatError::query(format!(
            "'{name}' cannot be applied to a plain value"
        ))),
    }
}

// Table verbs

fn table_method(frame: Frame, name: &str, args: &[Arg]) -> Result<ExecValue> {
    match name {
        "filter" => {
            let [Arg::Comparison { column, op, value }] = args else {
                return Err(ChatError::query(
                    "filter expects a comparison, e.g. filter(\"Age\" > 30)",
                ));
            };
            let col = lookup_column(&frame, column)?;
            let target = value.to_value();
            let mask: Vec<bool> = col
                .values
                .iter()
                .map(|v| cmp_matches(v, *op, &target))
                .collect();
            Ok(ExecValue::Table(frame.take_rows(&mask)))
        }
        "groupby" => {
            let key = single_str_arg(args, "groupby")?;
            lookup_column(&frame, &key)?;
            Ok(ExecValue::Grouped { frame, key })
        }
        "select" => {
            if args.is_empty() {
                return Err(ChatError::query("select expects at least one column name"));
            }
            let mut columns = Vec::with_capacity(args.len());
            for arg in args {
                let name = str_arg(arg, "select")?;
                columns.push(lookup_column(&frame, &name)?.clone());
            }
            Ok(ExecValue::Table(Frame::with_columns(
                frame.name.clone(),
                columns,
            )))
        }
        "sort" => {
            let (column, descending) = sort_args(args)?;
            let col = lookup_column(&frame, &column)?;
            let mut order: Vec<usize> = (0..frame.n_rows()).collect();
            order.sort_by(|&a, &b| {
                let ord = null_last_cmp(&col.values[a], &col.values[b]);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
            Ok(ExecValue::Table(frame.reorder_rows(&order)))
        }
        "head" => {
            let n = single_int_arg(args, "head")?;
            if n < 0 {
                return Err(ChatError::query("head expects a non-negative count"));
            }
            let n = (n as usize).min(frame.n_rows());
            let mask: Vec<bool> = (0..frame.n_rows()).map(|i| i < n).collect();
            Ok(ExecValue::Table(frame.take_rows(&mask)))
        }
        "count" => {
            expect_no_args(args, "count")?;
            Ok(ExecValue::Scalar {
                name: "count".to_string(),
                value: Value::Int(frame.n_rows() as i64),
            })
        }
        other => Err(ChatError::query(format!(
            "unknown table verb '{other}' (expected filter, groupby, select, sort, head, or count)"
        ))),
    }
}

// Grouped-table verbs

fn grouped_method(frame: Frame, key: &str, name: &str, args: &[Arg]) -> Result<ExecValue> {
    let groups = group_rows(&frame, key)?;
    let key_col = lookup_column(&frame, key)?;

    match name {
        "sum" | "mean" | "min" | "max" => {
            let target = single_str_arg(args, name)?;
            let col = lookup_column(&frame, &target)?;
            if matches!(name, "sum" | "mean") && !col.dtype.is_numeric() {
                return Err(ChatError::query(format!(
                    "cannot {name} non-numeric column \"{target}\""
                )));
            }

            let mut keys = Vec::with_capacity(groups.len());
            let mut aggs = Vec::with_capacity(groups.len());
            for (key_value, rows) in &groups {
                keys.push(key_value.clone());
                aggs.push(aggregate(col, rows, name));
            }

            let agg_dtype = match name {
                "sum" if col.dtype == Dtype::Int => Dtype::Int,
                "sum" | "mean" => Dtype::Float,
                _ => col.dtype,
            };

            Ok(ExecValue::Table(Frame::with_columns(
                frame.name.clone(),
                vec![
                    Column::new(key.to_string(), key_col.dtype, keys),
                    Column::new(target, agg_dtype, aggs),
                ],
            )))
        }
        "count" => {
            expect_no_args(args, "count")?;
            let mut keys = Vec::with_capacity(groups.len());
            let mut counts = Vec::with_capacity(groups.len());
            for (key_value, rows) in &groups {
                keys.push(key_value.clone());
                counts.push(Value::Int(rows.len() as i64));
            }
            Ok(ExecValue::Table(Frame::with_columns(
                frame.name.clone(),
                vec![
                    Column::new(key.to_string(), key_col.dtype, keys),
                    Column::new("count", Dtype::Int, counts),
                ],
            )))
        }
        other => Err(ChatError::query(format!(
            "unknown aggregation '{other}' (expected sum, mean, min, max, or count)"
        ))),
    }
}

/// Groups row indices by the key column, preserving first-seen key order.
fn group_rows(frame: &Frame, key: &str) -> Result<Vec<(Value, Vec<usize>)>> {
    let key_col = lookup_column(frame, key)?;
    let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row, value) in key_col.values.iter().enumerate() {
        let slot = index.entry(value.to_display_string()).or_insert_with(|| {
            groups.push((value.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[*slot].1.push(row);
    }

    Ok(groups)
}

/// Aggregates the given rows of a column. Nulls are skipped.
fn aggregate(col: &Column, rows: &[usize], verb: &str) -> Value {
    let values: Vec<&Value> = rows
        .iter()
        .map(|&i| &col.values[i])
        .filter(|v| !v.is_null())
        .collect();

    if values.is_empty() {
        return Value::Null;
    }

    match verb {
        "sum" => {
            if col.dtype == Dtype::Int {
                Value::Int(values.iter().filter_map(|v| v.as_f64()).sum::<f64>() as i64)
            } else {
                Value::Float(values.iter().filter_map(|v| v.as_f64()).sum())
            }
        }
        "mean" => {
            let nums: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
            if nums.is_empty() {
                Value::Null
            } else {
                Value::Float(nums.iter().sum::<f64>() / nums.len() as f64)
            }
        }
        "min" => values
            .iter()
            .copied()
            .min_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal))
            .cloned()
            .unwrap_or_default(),
        "max" => values
            .iter()
            .copied()
            .max_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal))
            .cloned()
            .unwrap_or_default(),
        _ => Value::Null,
    }
}

// Series verbs

fn series_method(column: Column, name: &str, args: &[Arg]) -> Result<ExecValue> {
    expect_no_args(args, name)?;
    let rows: Vec<usize> = (0..column.len()).collect();

    match name {
        "sum" | "mean" => {
            if !column.dtype.is_numeric() {
                return Err(ChatError::query(format!(
                    "cannot {name} non-numeric column \"{}\"",
                    column.name
                )));
            }
            Ok(ExecValue::Scalar {
                name: column.name.clone(),
                value: aggregate(&column, &rows, name),
            })
        }
        "min" | "max" => Ok(ExecValue::Scalar {
            name: column.name.clone(),
            value: aggregate(&column, &rows, name),
        }),
        "count" => Ok(ExecValue::Scalar {
            name: "count".to_string(),
            value: Value::Int(column.values.iter().filter(|v| !v.is_null()).count() as i64),
        }),
        "unique" => {
            let mut seen: HashMap<String, ()> = HashMap::new();
            let mut distinct = Vec::new();
            for value in &column.values {
                if value.is_null() {
                    continue;
                }
                if seen.insert(value.to_display_string(), ()).is_none() {
                    distinct.push(value.clone());
                }
            }
            Ok(ExecValue::Series(Column::new(
                column.name,
                column.dtype,
                distinct,
            )))
        }
        other => Err(ChatError::query(format!(
            "unknown column verb '{other}' (expected sum, mean, min, max, count, or unique)"
        ))),
    }
}

// Argument helpers

fn cmp_matches(value: &Value, op: CmpOp, target: &Value) -> bool {
    match value.compare(target) {
        Some(ord) => match op {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        },
        // Nulls and mixed-type cells never match.
        None => false,
    }
}

fn null_last_cmp(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

fn lookup_column<'a>(frame: &'a Frame, name: &str) -> Result<&'a Column> {
    frame.column(name).ok_or_else(|| {
        ChatError::query(format!(
            "unknown column \"{name}\" (columns: {})",
            frame.column_names().join(", ")
        ))
    })
}

fn str_arg(arg: &Arg, verb: &str) -> Result<String> {
    match arg {
        Arg::Expr(Expr::Literal(Literal::Str(s))) => Ok(s.clone()),
        _ => Err(ChatError::query(format!(
            "{verb} expects a quoted column name"
        ))),
    }
}

fn single_str_arg(args: &[Arg], verb: &str) -> Result<String> {
    match args {
        [arg] => str_arg(arg, verb),
        _ => Err(ChatError::query(format!(
            "{verb} expects exactly one quoted column name"
        ))),
    }
}

fn single_int_arg(args: &[Arg], verb: &str) -> Result<i64> {
    match args {
        [Arg::Expr(Expr::Literal(Literal::Int(n)))] => Ok(*n),
        _ => Err(ChatError::query(format!("{verb} expects a number"))),
    }
}

fn sort_args(args: &[Arg]) -> Result<(String, bool)> {
    match args {
        [col] => Ok((str_arg(col, "sort")?, false)),
        [col, dir] => {
            let column = str_arg(col, "sort")?;
            match str_arg(dir, "sort")?.to_lowercase().as_str() {
                "asc" => Ok((column, false)),
                "desc" => Ok((column, true)),
                other => Err(ChatError::query(format!(
                    "sort direction must be \"asc\" or \"desc\", got \"{other}\""
                ))),
            }
        }
        _ => Err(ChatError::query(
            "sort expects a column name and an optional direction",
        )),
    }
}

fn expect_no_args(args: &[Arg], verb: &str) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ChatError::query(format!("{verb} takes no arguments")))
    }
}
