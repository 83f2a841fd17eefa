//! Stage two: repair what stage one leaves uncompilable
//!
//! The provider methods have different signatures from the Algolia client:
//! `GetObject` returns the document instead of filling a pointer, `Index` and
//! `Delete` return only an error, and there is no task to `Wait()` on. These
//! rules run against the output of [`super::provider`].

use regraft_core::{Match, Rule, RewriteError};

const SEARCH_TODO: &str = "// TODO: Convert to SearchQuery pattern";
const TEMPLATE_NOTE: &str = "// Use the workspace provider directly for template operations";

/// Lines of an `if err != nil { ... }` block, closing brace included
///
/// Body lines may not open a block, so a nested `}` is never taken for the end.
const ERR_BLOCK: &str = r"\n\t*if err != nil \{\n(?:[^{\n]*\n){0,12}?\t*\}";

/// Ordered stage-two rules
pub fn rules() -> Result<Vec<Rule>, RewriteError> {
    Ok(vec![
        Rule::builder("drop-algolia-errs-import")
            .description("Remove the Algolia errs import")
            .pattern("\t\"github\\.com/algolia/algoliasearch-client-go/v3/algolia/errs\"\n")
            .template("")
            .build()?,
        Rule::builder("add-errors-import")
            .description("Import errors for errors.Is")
            .pattern("(import \\(\n\t\"context\"\n)")
            .template("$1\t\"errors\"\n")
            .not_followed_by("\t\"errors\"\n")
            .build()?,
        Rule::builder("draft-fetch-to-map")
            .description("Take the document GetObject returns and convert it to a map")
            .pattern(r"(?m)^(\t*)err = searchProvider\.DraftIndex\(\)\.GetObject\(ctx, ([^,]+), &(\w+)\)")
            .with(fetch_to_map)
            .build()?,
        Rule::builder("draft-index-new-doc")
            .description("Convert a new document to a search document before indexing")
            .pattern(
                r"(?m)^(\t*)searchDoc := mapToSearchDocument\(doc\)\n\t*res, err := searchProvider\.DraftIndex\(\)\.Index\(ctx, searchDoc\)",
            )
            .template(index_template(true))
            .build()?,
        Rule::builder("draft-index-doc-object")
            .description("Check the search document conversion before indexing")
            .pattern(
                r"(?m)^(\t*)searchDoc := mapToSearchDocument\(docObj\)\n\t*res, err := searchProvider\.DraftIndex\(\)\.Index\(ctx, searchDoc\)",
            )
            .template(index_template(false))
            .build()?,
        Rule::builder("draft-index-drop-wait")
            .description("Drop the Wait() that followed SaveObject")
            .pattern(format!(
                r"(?P<call>err = searchProvider\.DraftIndex\(\)\.Index\(ctx, searchDoc\){ERR_BLOCK}\n)\t*err = res\.Wait\(\){ERR_BLOCK}\n"
            ))
            .template("${call}")
            .build()?,
        Rule::builder("draft-delete-drop-wait")
            .description("Delete returns only an error; drop the Wait() that followed it")
            .call_then(
                r"res, err := searchProvider\.DraftIndex\(\)\.Delete\(",
                format!(r"(?P<check>{ERR_BLOCK}\n)\t*err = res\.Wait\(\){ERR_BLOCK}\n"),
            )
            .template("err = searchProvider.DraftIndex().Delete(${args})${check}")
            .build()?,
        Rule::builder("remove-sharing-signature")
            .description("Take the workspace provider in removeSharing")
            .pattern(r"func removeSharing\(s \*gw\.Service, docId, email string\) error \{")
            .template("func removeSharing(workspaceProvider workspace.Provider, docId, email string) error {")
            .build()?,
        Rule::builder("remove-sharing-call")
            .description("Pass the workspace provider to removeSharing")
            .pattern(r"if err := removeSharing\(s, docId, c\); err != nil \{")
            .template("if err := removeSharing(workspaceProvider, docId, c); err != nil {")
            .build()?,
        Rule::builder("shareable-handler-call")
            .description("Pass the providers to draftsShareableHandler")
            .pattern(r"draftsShareableHandler\(([^\n]*?), ar, s, (\w+)\)")
            .template("draftsShareableHandler($1, searchProvider, workspaceProvider, $2)")
            .build()?,
        Rule::builder("shareable-handler-signature")
            .description("Take the providers in draftsShareableHandler")
            .pattern(r"func draftsShareableHandler\(\n([^\)]+)\n\tar \*algolia\.Client,\n\ts \*gw\.Service,")
            .template(
                "func draftsShareableHandler(\n$1\n\tsearchProvider pkgsearch.Provider,\n\tworkspaceProvider workspace.Provider,",
            )
            .build()?,
        Rule::builder("copy-template-service-note")
            .description("Stop dereferencing the workspace provider for template copies")
            .pattern(r"copyTemplateSvc := workspaceProvider\b")
            .template(TEMPLATE_NOTE)
            .manual_review("copyTemplateSvc is gone; point its remaining uses at workspaceProvider")
            .build()?,
        Rule::builder("copy-template-drive-service")
            .description("Remove the Drive service built for template copies")
            .call_then(
                r"\n\t*// Use the workspace provider directly for template operations\n\t*copyTemplateSvc\.Drive, err = drive\.NewService\(",
                ERR_BLOCK,
            )
            .template("")
            .build()?,
        Rule::builder("sorted-search-todo")
            .description("Comment out sorted searches that still pass Algolia options")
            .pattern(
                r#"(?m)^(\t*)(var resp search\.QueryRes.*?resp, err = searchProvider\.DraftIndex\(\)\.Search\(ctx, "", params\.\.\.\)(?:\n\t*\} else \{\n\t*resp, err = searchProvider\.DraftIndex\(\)\.Search\(ctx, "", params\.\.\.\))?\n\t*\})"#,
            )
            .dot_matches_newline()
            .with(comment_out_search)
            .manual_review("rebuild the opt.* params and sort order as a SearchQuery")
            .build()?,
    ])
}

fn fetch_to_map(m: &Match) -> String {
    let indent = m.get(1).unwrap_or_default();
    let id = m.get(2).unwrap_or_default();
    let dest = m.get(3).unwrap_or_default();

    [
        format!("{indent}{dest}Doc, err := searchProvider.DraftIndex().GetObject(ctx, {id})"),
        format!("{indent}if err != nil {{"),
        format!("{indent}\tl.Error(\"error getting draft from search\", \"error\", err, \"doc_id\", {id})"),
        format!("{indent}\thttp.Error(w, \"Error getting document draft\", http.StatusInternalServerError)"),
        format!("{indent}\treturn"),
        format!("{indent}}}"),
        format!("{indent}{dest}, err := searchDocumentToMap({dest}Doc)"),
    ]
    .join("\n")
}

/// Template for the Index fixups; `convert_doc` adds the ToAlgoliaObject step
fn index_template(convert_doc: bool) -> String {
    let action = if convert_doc { "creating" } else { "updating" };
    let check = |message: &str| {
        format!(
            "${{1}}if err != nil {{\n\
             ${{1}}\tl.Error(\"{message}\", \"error\", err)\n\
             ${{1}}\thttp.Error(w, \"Error {action} document draft\", http.StatusInternalServerError)\n\
             ${{1}}\treturn\n\
             ${{1}}}}\n"
        )
    };

    let mut out = String::new();
    if convert_doc {
        out.push_str("${1}docObj, err := doc.ToAlgoliaObject(true)\n");
        out.push_str(&check("error converting doc to Algolia object"));
    }
    out.push_str("${1}searchDoc, err := mapToSearchDocument(docObj)\n");
    out.push_str(&check("error converting to search document"));
    out.push_str("${1}err = searchProvider.DraftIndex().Index(ctx, searchDoc)");
    out
}

fn comment_out_search(m: &Match) -> String {
    let indent = m.get(1).unwrap_or_default();
    let block = m.get(2).unwrap_or_default();

    let mut out = format!("{indent}{SEARCH_TODO}");
    for (i, line) in block.lines().enumerate() {
        let line = if i == 0 {
            format!("{indent}{line}")
        } else {
            line.to_string()
        };
        let code = line.trim_start_matches('\t');
        let tabs = &line[..line.len() - code.len()];
        out.push('\n');
        out.push_str(tabs);
        out.push_str("// ");
        out.push_str(code);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use regraft_core::RuleEngine;

    fn run(input: &str) -> String {
        RuleEngine::new(rules().unwrap()).run(input).unwrap().0
    }

    #[test]
    fn test_imports() {
        let input = "import (\n\t\"context\"\n\t\"fmt\"\n\t\"github.com/algolia/algoliasearch-client-go/v3/algolia/errs\"\n)\n";
        let once = run(input);

        assert_eq!(once, "import (\n\t\"context\"\n\t\"errors\"\n\t\"fmt\"\n)\n");
        assert_eq!(run(&once), once);
    }

    #[test]
    fn test_fetch_to_map() {
        let out = run("\t\terr = searchProvider.DraftIndex().GetObject(ctx, docId, &algoObj)\n\t\tif err != nil {\n");

        assert_eq!(
            out,
            "\t\talgoObjDoc, err := searchProvider.DraftIndex().GetObject(ctx, docId)\n\
             \t\tif err != nil {\n\
             \t\t\tl.Error(\"error getting draft from search\", \"error\", err, \"doc_id\", docId)\n\
             \t\t\thttp.Error(w, \"Error getting document draft\", http.StatusInternalServerError)\n\
             \t\t\treturn\n\
             \t\t}\n\
             \t\talgoObj, err := searchDocumentToMap(algoObjDoc)\n\
             \t\tif err != nil {\n"
        );
    }

    #[test]
    fn test_index_new_doc_and_drop_wait() {
        let input = "\t\t\tsearchDoc := mapToSearchDocument(doc)\n\
                     \t\t\tres, err := searchProvider.DraftIndex().Index(ctx, searchDoc)\n\
                     \t\t\tif err != nil {\n\
                     \t\t\t\treturn\n\
                     \t\t\t}\n\
                     \t\t\terr = res.Wait()\n\
                     \t\t\tif err != nil {\n\
                     \t\t\t\treturn\n\
                     \t\t\t}\n\
                     \t\t\tw.WriteHeader(http.StatusOK)\n";

        let out = run(input);

        assert!(out.starts_with("\t\t\tdocObj, err := doc.ToAlgoliaObject(true)\n\t\t\tif err != nil {\n"));
        assert!(out.contains("\t\t\tsearchDoc, err := mapToSearchDocument(docObj)\n"));
        assert!(out.contains("Error creating document draft"));
        assert!(out.ends_with(
            "\t\t\terr = searchProvider.DraftIndex().Index(ctx, searchDoc)\n\
             \t\t\tif err != nil {\n\
             \t\t\t\treturn\n\
             \t\t\t}\n\
             \t\t\tw.WriteHeader(http.StatusOK)\n"
        ));
        assert!(!out.contains("res.Wait()"));
    }

    #[test]
    fn test_index_doc_object() {
        let out = run("\tsearchDoc := mapToSearchDocument(docObj)\n\
                       \tres, err := searchProvider.DraftIndex().Index(ctx, searchDoc)\n");

        assert!(out.contains("Error updating document draft"));
        assert!(!out.contains("ToAlgoliaObject"));
        assert!(out.ends_with("\terr = searchProvider.DraftIndex().Index(ctx, searchDoc)\n"));
    }

    #[test]
    fn test_delete_drops_wait() {
        let input = "\t\t\tres, err := searchProvider.DraftIndex().Delete(ctx, docId)\n\
                     \t\t\tif err != nil {\n\
                     \t\t\t\tl.Error(\"error deleting draft\", \"error\", err)\n\
                     \t\t\t\treturn\n\
                     \t\t\t}\n\
                     \t\t\terr = res.Wait()\n\
                     \t\t\tif err != nil {\n\
                     \t\t\t\treturn\n\
                     \t\t\t}\n\
                     \t\t\tw.WriteHeader(http.StatusNoContent)\n";

        assert_eq!(
            run(input),
            "\t\t\terr = searchProvider.DraftIndex().Delete(ctx, docId)\n\
             \t\t\tif err != nil {\n\
             \t\t\t\tl.Error(\"error deleting draft\", \"error\", err)\n\
             \t\t\t\treturn\n\
             \t\t\t}\n\
             \t\t\tw.WriteHeader(http.StatusNoContent)\n"
        );
    }

    #[test]
    fn test_shareable_handler() {
        let out = run("draftsShareableHandler(w, r, docId, *doc, *cfg, l, ar, s, db)\n\
                       func draftsShareableHandler(\n\tw http.ResponseWriter,\n\tl hclog.Logger,\n\tar *algolia.Client,\n\ts *gw.Service,\n");

        assert_eq!(
            out,
            "draftsShareableHandler(w, r, docId, *doc, *cfg, l, searchProvider, workspaceProvider, db)\n\
             func draftsShareableHandler(\n\tw http.ResponseWriter,\n\tl hclog.Logger,\n\
             \tsearchProvider pkgsearch.Provider,\n\tworkspaceProvider workspace.Provider,\n"
        );
    }

    #[test]
    fn test_copy_template_service_removed() {
        let input = "\t\t\t\tcopyTemplateSvc := workspaceProvider\n\
                     \t\t\t\tcopyTemplateSvc.Drive, err = drive.NewService(\n\
                     \t\t\t\t\tcontext.Background(),\n\
                     \t\t\t\t\toption.WithHTTPClient(jwtConf.Client(context.Background())),\n\
                     \t\t\t\t)\n\
                     \t\t\t\tif err != nil {\n\
                     \t\t\t\t\treturn\n\
                     \t\t\t\t}\n\
                     \t\t\t\tf, err := copyTemplateSvc.CopyFile(a, b)\n";
        let input = format!("\t\t\tdefer cancel()\n{input}");

        let (out, report) = RuleEngine::new(rules().unwrap()).run(&input).unwrap();

        assert_eq!(out, "\t\t\tdefer cancel()\n\t\t\t\tf, err := copyTemplateSvc.CopyFile(a, b)\n");
        assert_eq!(report.notices()[0].rule_id, "copy-template-service-note");
        assert_eq!(report.notices()[0].lines, vec![2]);
    }

    #[test]
    fn test_nested_err_block_left_alone() {
        let drive = "\t\t\t\tcopyTemplateSvc.Drive, err = drive.NewService(ctx)\n\
                     \t\t\t\tif err != nil {\n\
                     \t\t\t\t\tif l != nil {\n\
                     \t\t\t\t\t\tl.Error(\"error creating drive service\")\n\
                     \t\t\t\t\t}\n\
                     \t\t\t\t\treturn\n\
                     \t\t\t\t}\n";
        let input = format!("\t\t\tdefer cancel()\n\t\t\t\tcopyTemplateSvc := workspaceProvider\n{drive}");

        let (out, report) = RuleEngine::new(rules().unwrap()).run(&input).unwrap();

        assert_eq!(out, format!("\t\t\tdefer cancel()\n\t\t\t\t{TEMPLATE_NOTE}\n{drive}"));
        assert!(report
            .warnings()
            .iter()
            .any(|w| w.rule_id == "copy-template-drive-service"));
    }

    #[test]
    fn test_sorted_search_commented_out() {
        let input = "\t\t\tvar resp search.QueryRes\n\
                     \t\t\tif sortBy == \"dateAsc\" {\n\
                     \t\t\t\tresp, err = searchProvider.DraftIndex().Search(ctx, \"\", params...)\n\
                     \t\t\t} else {\n\
                     \t\t\t\tresp, err = searchProvider.DraftIndex().Search(ctx, \"\", params...)\n\
                     \t\t\t}\n\
                     \t\t\tif err != nil {\n";

        let (out, report) = RuleEngine::new(rules().unwrap()).run(input).unwrap();

        assert_eq!(
            out,
            "\t\t\t// TODO: Convert to SearchQuery pattern\n\
             \t\t\t// var resp search.QueryRes\n\
             \t\t\t// if sortBy == \"dateAsc\" {\n\
             \t\t\t\t// resp, err = searchProvider.DraftIndex().Search(ctx, \"\", params...)\n\
             \t\t\t// } else {\n\
             \t\t\t\t// resp, err = searchProvider.DraftIndex().Search(ctx, \"\", params...)\n\
             \t\t\t// }\n\
             \t\t\tif err != nil {\n"
        );
        assert_eq!(report.notices().len(), 1);
        assert_eq!(run(&out), out);
    }
}
