// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for auditbot

use auditbot::aggregate::Aggregator;
use auditbot::report::{export_csv, generate_report, OutputFormat};
use auditbot::scan::{self, ScanReport};
use auditbot::validate::{self, ResultUpdate};
use auditbot::{
    read_document, AuditError, AuditSnapshot, AuditStatus, Catalog, Config, CriterionId,
    CriterionStatus,
};
use std::path::Path;

fn snapshot() -> AuditSnapshot {
    read_document(Path::new("tests/fixtures/audit-snapshot.json")).expect("snapshot fixture should parse")
}

fn uuv_report() -> ScanReport {
    let content = std::fs::read_to_string("tests/fixtures/uuv-report.json").expect("fixture should exist");
    ScanReport::from_json(&content).expect("scan fixture should parse")
}

#[test]
fn test_aggregate_snapshot_fixture() {
    let report = Aggregator::new(Catalog::builtin()).aggregate_snapshot(&snapshot());

    let count = report.criteria_count;
    assert_eq!(count.total, 25);
    assert_eq!(count.compliant, 21);
    assert_eq!(count.not_compliant, 2);
    assert_eq!(count.not_applicable, 2);
    assert_eq!(count.applicable, 23);
    assert_eq!(count.blocking, 1);
    assert_eq!(report.accessibility_rate, Some(91));

    let rows = &report.result_distribution;
    assert_eq!(rows.tested(), 50);
    assert_eq!(rows.compliant.percentage, 84.0);
    assert_eq!(rows.not_compliant.percentage, 6.0);
    assert_eq!(rows.not_applicable.percentage, 10.0);

    assert_eq!(report.page_distributions[0].name, "Accueil");
    assert_eq!(report.page_distributions[0].distribution.not_compliant.raw, 2);
    assert_eq!(report.page_distributions[1].distribution.not_applicable.percentage, 12.0);

    // Topics 2 and 13 have no criterion in a fast audit
    assert_eq!(report.topic_distributions.len(), 11);
    assert_eq!(report.topic_distributions[0].name, "Images");
    assert_eq!(report.topic_distributions[0].distribution.not_compliant.percentage, 100.0);
}

#[test]
fn test_snapshot_status_and_export() {
    let snapshot = snapshot();
    let aggregator = Aggregator::new(Catalog::builtin());
    assert_eq!(aggregator.snapshot_status(&snapshot), AuditStatus::Publishable);

    let csv = export_csv(&aggregator.snapshot_export(&snapshot).unwrap());
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[0], "Critères,Accueil,Contact");
    assert_eq!(lines[1], "1.1,NC,NC");
    assert_eq!(lines[2], "3.1,NA,NA");
    assert_eq!(lines.len(), 27);
}

#[test]
fn test_export_with_missing_row_fails() {
    let mut snapshot = snapshot();
    snapshot.results.retain(|r| !(r.page_id == 2 && r.criterion() == CriterionId::new(12, 9)));

    let aggregator = Aggregator::new(Catalog::builtin());
    assert_eq!(aggregator.snapshot_status(&snapshot), AuditStatus::InProgress);
    match aggregator.snapshot_export(&snapshot) {
        Err(AuditError::MissingResult { criterion, page_id }) => {
            assert_eq!(criterion, CriterionId::new(12, 9));
            assert_eq!(page_id, 2);
        }
        other => panic!("expected a missing result, got {:?}", other.map(|m| m.rows.len())),
    }
}

#[test]
fn test_yaml_snapshot_reads_the_same() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("snapshot.yaml");
    std::fs::write(&path, serde_yaml::to_string(&snapshot()).unwrap()).unwrap();

    let from_yaml: AuditSnapshot = read_document(&path).unwrap();
    assert_eq!(from_yaml.results, snapshot().results);
}

#[test]
fn test_json_report_for_fixture() {
    let report = auditbot::audit_report(&snapshot(), Catalog::builtin(), &Config::default());
    let json: serde_json::Value =
        serde_json::from_str(&generate_report(&report, OutputFormat::Json)).unwrap();
    assert_eq!(json["accessibilityRate"], 91);
    assert_eq!(json["status"], "PUBLISHABLE");
    assert_eq!(json["procedureName"], "Site de la mairie");
    assert_eq!(json["resultDistribution"]["compliant"]["raw"], 42);
}

#[test]
fn test_normalize_uuv_fixture() {
    let results = scan::normalize_strict(&uuv_report(), 1).expect("fixture has valid criteria");
    assert_eq!(results.len(), 3);

    let statuses: Vec<CriterionStatus> = results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![CriterionStatus::NotCompliant, CriterionStatus::Compliant, CriterionStatus::NotApplicable]
    );
    assert!(results.iter().all(|r| r.page_id == 1 && r.topic == 1));

    let images = &results[0];
    assert_eq!(
        images.not_compliant_comment,
        concat!(
            "# 1.1.1\n## Erreurs\n### Erreur 1\n#### Selecteur CSS\n`html > body > main > img:nth-of-type(1)`\n",
            "#### Html\n`<img src=\"https://orange-opensource.github.io/uuv/img/uuv.png\" class=\"h-32px m-16px w-32px\" alt=\"\">`\n",
            "### Erreur 2\n#### Selecteur CSS\n`html > body > main > img:nth-of-type(2)`\n",
            "#### Html\n`<img src=\"https://orange-opensource.github.io/uuv/img/uuv.png\" class=\"h-32px m-16px w-32px\">`",
            "# 1.1.2\n## Erreurs\n### Erreur 1\n#### Selecteur CSS\n`html > body > main > map:nth-of-type(1) > area:nth-of-type(3)`\n",
            "#### Html\n`<area shape=\"poly\" coords=\"209,249,49,249,130,139\" href=\"https://developer.mozilla.org/docs/Web/JavaScript\" target=\"_blank\">`\n",
            "### Erreur 2\n#### Selecteur CSS\n`html > body > main > map:nth-of-type(1) > area:nth-of-type(4)`\n",
            "#### Html\n`<area shape=\"poly\" coords=\"48,249,0,96,129,138\" href=\"https://developer.mozilla.org/docs/Web/API\" target=\"_blank\">`\n",
            "### Erreur 3\n#### Selecteur CSS\n`html > body > main > map:nth-of-type(1) > area:nth-of-type(5)`\n",
            "#### Html\n`<area shape=\"poly\" coords=\"0,95,128,0,128,137\" href=\"https://developer.mozilla.org/docs/Web/CSS\" target=\"_blank\">`",
        )
    );
    assert_eq!(images.compliant_comment, "");
    assert_eq!(images.not_applicable_comment, "");

    // Success with nothing to report leaves the comment empty
    let decorative = &results[1];
    assert_eq!(decorative.criterium, 2);
    assert_eq!(decorative.compliant_comment, "");

    let relevance = &results[2];
    assert_eq!(relevance.criterium, 3);
    assert!(relevance.not_applicable_comment.starts_with(
        "# 1.3.1\n## Vérifications manuelles\n### Vérification 1\n#### Sélecteur CSS\n`html > body > main > img:nth-of-type(1)`\n#### Dom Html\n##### Element\n`<img src="
    ));
    assert!(relevance
        .not_applicable_comment
        .contains("#### Attributes\n`aria-label=je ne suis pas pertinent, alt=logo UUV`"));
    assert_eq!(relevance.not_applicable_comment.matches("#### Help\n").count(), 3);
    assert_eq!(relevance.not_compliant_comment, "");

    let json = serde_json::to_value(&results[2]).unwrap();
    assert!(json["userImpact"].is_null());
    assert_eq!(json["exampleImages"], serde_json::json!([]));
}

#[test]
fn test_normalize_isolates_malformed_criterion() {
    let mut report = uuv_report();
    report.rule_results[3].rule.criterion = "1".to_string();

    let lenient = auditbot::normalize_report(&report, 4, &Config::default()).unwrap();
    assert_eq!(lenient.len(), 2);

    let mut strict = Config::default();
    strict.normalize.strict = true;
    assert!(matches!(
        auditbot::normalize_report(&report, 4, &strict),
        Err(AuditError::MalformedCriterion(key)) if key == "1"
    ));
}

#[test]
fn test_seed_normalize_and_complete() {
    let snapshot = snapshot();
    let catalog = Catalog::builtin();
    let required = Aggregator::new(catalog).required_criteria(&snapshot.audit);
    let seeded = validate::seed_results(&snapshot.pages, &required);
    assert_eq!(seeded.len(), 50);

    // Scan results for criteria 1.1 to 1.3 only touch 1.1 of the fast list
    let scanned = scan::normalize(&uuv_report(), 1).results;
    let updates: Vec<ResultUpdate> = scanned
        .iter()
        .filter(|r| required.contains(&r.criterion()))
        .map(|r| ResultUpdate {
            status: Some(r.status),
            not_compliant_comment: Some(r.not_compliant_comment.clone()),
            ..ResultUpdate::new(r.page_id, r.criterion())
        })
        .collect();
    assert_eq!(updates.len(), 1);
    validate::validate_result_updates(catalog, snapshot.audit.referential, &snapshot.pages, &updates)
        .expect("updates target the audit");

    let merged = validate::apply_updates(&seeded, &updates);
    assert_eq!(merged.len(), 50);
    assert_eq!(merged[0].status, CriterionStatus::NotCompliant);
    assert!(merged[0].not_compliant_comment.starts_with("# 1.1.1"));
    assert_eq!(
        Aggregator::new(catalog).aggregate(&snapshot.audit, &snapshot.pages, &required, &merged)
            .criteria_count
            .not_compliant,
        1
    );
}
