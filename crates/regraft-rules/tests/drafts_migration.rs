//! Integration tests running the built-in drafts migration over a realistic handler file

use regraft_core::{Outcome, RuleEngine};
use regraft_rules::RuleSetRegistry;

const DRAFTS_GO: &str = include_str!("fixtures/drafts.go");

fn migrate(set: &str, input: &str) -> (String, regraft_core::ChangeReport) {
    let rules = RuleSetRegistry::new().rules(set).unwrap();
    RuleEngine::new(rules).run(input).unwrap()
}

/// Every rule in the migration finds its target exactly where expected
#[test]
fn test_every_rule_matches_fixture() {
    let (_, report) = migrate("drafts-migration", DRAFTS_GO);

    for app in report.applications() {
        println!("{:<36} {}", app.rule_id, app.match_count);
    }

    assert!(report.warnings().is_empty(), "unexpected warnings: {:?}", report.warnings());
    assert_eq!(report.application("draft-save-object").unwrap().match_count, 2);
    assert_eq!(report.application("workspace-service-calls").unwrap().match_count, 4);
    assert_eq!(report.application("workspace-adapter").unwrap().match_count, 2);
    assert_eq!(report.application("draft-index-drop-wait").unwrap().match_count, 2);
}

#[test]
fn test_migrated_output() {
    let (output, _) = migrate("drafts-migration", DRAFTS_GO);

    // Imports
    assert!(output.contains("import (\n\t\"context\"\n\t\"errors\"\n\t\"fmt\"\n"));
    assert!(!output.contains("algolia/errs\""));

    // Both handlers get a context
    assert_eq!(output.matches("\t\tctx := r.Context()\n").count(), 2);

    // No Algolia client calls remain
    for gone in ["ar.Drafts", "aw.Drafts", "ar.DraftsCreatedTime", "res.Wait()", "is404", "gw.NewAdapter"] {
        assert!(!output.contains(gone), "`{gone}` survived the migration");
    }

    assert!(output.contains(
        "\t\talgoObjDoc, err := searchProvider.DraftIndex().GetObject(ctx, docId)\n\t\tif err != nil {\n"
    ));
    assert!(output.contains("\t\talgoObj, err := searchDocumentToMap(algoObjDoc)\n"));
    assert!(output.contains("\t\t\terr = searchProvider.DraftIndex().Delete(ctx, strings.TrimSpace(docId))\n"));
    assert!(output.contains("\t\t\tdocObj, err := doc.ToAlgoliaObject(true)\n"));
    assert!(output.contains("if errors.Is(err, pkgsearch.ErrNotFound) {"));
    assert!(output.contains("workspaceProvider.DeleteFile(docId)"));
    assert!(output.contains("func removeSharing(workspaceProvider workspace.Provider, docId, email string) error {"));
    assert!(output.contains("draftsShareableHandler(w, r, docId, *doc, *cfg, l, searchProvider, workspaceProvider, db)"));
    assert!(output.contains("\tsearchProvider pkgsearch.Provider,\n\tworkspaceProvider workspace.Provider,\n\tdb *gorm.DB,\n"));

    // The template service block is gone entirely
    assert!(!output.contains("drive.NewService("));
    assert!(output.contains(
        "\t\t\t// Copy template to new draft file.\n\t\t\tf, err := copyTemplateSvc.CopyFile("
    ));

    // Sorted search is left commented out for a human
    assert!(output.contains("\t\t\t// TODO: Convert to SearchQuery pattern\n\t\t\t// var resp search.QueryRes\n"));
}

#[test]
fn test_manual_review_notices() {
    let (_, report) = migrate("drafts-migration", DRAFTS_GO);

    let ids: Vec<&str> = report.notices().iter().map(|n| n.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["copy-template-service-note", "sorted-search-todo"]);
    assert_eq!(
        report.application("sorted-search-todo").unwrap().outcome,
        Outcome::NeedsReview
    );
    assert_eq!(report.summary().manual_review, 2);
}

/// Running the migration over its own output changes nothing
#[test]
fn test_migration_is_self_terminating() {
    let (once, _) = migrate("drafts-migration", DRAFTS_GO);
    let (twice, report) = migrate("drafts-migration", &once);

    assert_eq!(once, twice);
    assert_eq!(report.total_matches(), 0);
    assert!(!report.has_changes());
    assert_eq!(report.warnings().len(), report.applications().len());
}

#[test]
fn test_stages_compose() {
    let (combined, _) = migrate("drafts-migration", DRAFTS_GO);

    let (stage_one, _) = migrate("search-provider", DRAFTS_GO);
    let (stage_two, _) = migrate("search-provider-fixups", &stage_one);

    assert_eq!(stage_two, combined);
}

#[test]
fn test_unrelated_file_untouched() {
    let input = "package api\n\nfunc Health(w http.ResponseWriter) {\n\tw.WriteHeader(http.StatusOK)\n}\n";

    let (output, report) = migrate("drafts-migration", input);

    assert_eq!(output, input);
    assert_eq!(report.summary().rules_applied, 0);
    assert_eq!(report.warnings().len(), report.applications().len());
}
