//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Diagnostics grouped by severity
//! - Planned changes with action colors
//! - Resource state summaries

use console::{StyledObject, style};
use platform_core::bridge::decode_state;
use platform_core::{Diagnostic, Diagnostics, PlannedAction, PlannedChange, Value};
use platform_resources::{STAGE_TYPE, StageState};

fn diagnostic_line(diag: &Diagnostic) -> String {
    match &diag.path {
        Some(path) => format!("{}: {}", style(path).cyan(), diag.summary),
        None => diag.summary.clone(),
    }
}

/// Print errors then warnings, one per line with detail indented below
pub fn print_diagnostics(diags: &Diagnostics) {
    for diag in diags.errors() {
        println!("  {} {}", style("✗").red(), diagnostic_line(diag));
        if !diag.detail.is_empty() {
            println!("    {}", style(&diag.detail).dim());
        }
    }
    for diag in diags.warnings() {
        println!("  {} {}", style("⚠").yellow(), diagnostic_line(diag));
        if !diag.detail.is_empty() {
            println!("    {}", style(&diag.detail).dim());
        }
    }
}

pub fn action_style(action: PlannedAction) -> StyledObject<&'static str> {
    match action {
        PlannedAction::Create => style(action.as_str()).green(),
        PlannedAction::Update => style(action.as_str()).yellow(),
        PlannedAction::Replace => style(action.as_str()).magenta(),
        PlannedAction::Delete => style(action.as_str()).red(),
        PlannedAction::NoOp => style(action.as_str()).dim(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Unknown => "(known after apply)".to_string(),
        Value::Null => "null".to_string(),
        other => other.to_json().to_string(),
    }
}

pub fn print_plan(resource_type: &str, change: &PlannedChange) {
    let action = change.action();
    println!(
        "{} {} will be {}",
        style("→").blue(),
        style(resource_type).bold(),
        action_style(action)
    );

    if let Some(Value::Object(fields)) = &change.planned {
        for (name, value) in fields {
            match change.prior.as_ref().map(|p| p.get(name)) {
                Some(prior) if prior != value => println!(
                    "  {} {} = {} -> {}",
                    style("~").yellow(),
                    name,
                    render(prior),
                    render(value)
                ),
                _ => println!("    {} = {}", name, render(value)),
            }
        }
    }

    for path in &change.requires_replace {
        println!("  {} {} forces replacement", style("!").magenta(), style(path).cyan());
    }
}

/// Short human summary of a state
pub fn print_state(resource_type: &str, state: &Value) {
    println!("{}", style(resource_type).bold().underlined());

    if resource_type == STAGE_TYPE {
        if let Ok(stage) = decode_state::<StageState>(state) {
            println!("  Name:       {}", style(&stage.name).cyan());
            println!("  Scope:      {}", style(stage.scope.as_deref().unwrap_or("-")).yellow());
            println!("  Category:   {}", stage.effective_category());
            if let Some(created) = stage.created_at() {
                println!("  Created:    {}", created.format("%Y-%m-%d %H:%M:%S"));
            }
            if let Some(modified) = stage.modified_at() {
                println!("  Modified:   {}", modified.format("%Y-%m-%d %H:%M:%S"));
            }
            return;
        }
    }

    if let Value::Object(fields) = state {
        for (name, value) in fields {
            println!("  {:<22} {}", name, render(value));
        }
    }
}
