// SPDX-License-Identifier: PMPL-1.0-or-later
//! Markdown rendering of a rule result, stored as the result comment.
//!
//! Headings stay in French: the platform displays these comments as-is
//! next to comments auditors wrote by hand.

use super::{ManualCheckNode, RuleResult};

/// Render the error nodes and manual checks of a rule result.
///
/// Returns an empty string when the rule result has nothing to report.
pub fn format_validations(result: &RuleResult) -> String {
    let mut lines = vec![format!("# {}", result.rule.id)];

    for validation in &result.validations {
        if !validation.error_nodes.is_empty() {
            lines.push("## Erreurs".to_string());
            for (index, node) in validation.error_nodes.iter().enumerate() {
                lines.push(format!("### Erreur {}", index + 1));
                lines.push("#### Selecteur CSS".to_string());
                lines.push(code(&node.selector));
                lines.push("#### Html".to_string());
                lines.push(code(node.html.as_deref().unwrap_or_default()));
            }
        }

        if !validation.nodes_to_check_manually.is_empty() {
            lines.push("## Vérifications manuelles".to_string());
            for (index, check) in validation.nodes_to_check_manually.iter().enumerate() {
                push_manual_check(&mut lines, index + 1, check);
            }
        }
    }

    if lines.len() <= 1 {
        return String::new();
    }
    lines.join("\n")
}

fn push_manual_check(lines: &mut Vec<String>, number: usize, check: &ManualCheckNode) {
    lines.push(format!("### Vérification {}", number));
    lines.push("#### Sélecteur CSS".to_string());
    lines.push(code(&check.selector));
    lines.push("#### Dom Html".to_string());
    lines.push("##### Element".to_string());
    // Scanners that cannot serialize live nodes only fill `html`
    let element = check
        .node
        .dom_node
        .outer_html
        .as_deref()
        .unwrap_or(check.html.as_str());
    lines.push(code(element));
    lines.push("##### Elements lié".to_string());
    for (index, linked) in check.node.linked_nodes.iter().enumerate() {
        lines.push(format!("##### Element {}", index + 1));
        lines.push(code(linked.outer_html.as_deref().unwrap_or_default()));
    }
    if !check.attributes.is_empty() {
        lines.push("#### Attributes".to_string());
        lines.push(code(&check.attributes));
    }
    if !check.help.is_empty() {
        lines.push("#### Help".to_string());
        lines.push(code(&check.help));
    }
}

fn code(text: &str) -> String {
    format!("`{}`", text)
}
