//! Stage one: move the drafts handlers onto the search and workspace providers
//!
//! Rewrites direct Algolia client calls (`ar.*` / `aw.*`) into calls on
//! `searchProvider.DraftIndex()`, and Google Workspace service calls (`s.*`)
//! into calls on `workspaceProvider`. Every handler gets a request context first,
//! since the provider methods take one.

use regraft_core::{Rule, RewriteError};

/// Workspace service methods that exist unchanged on the provider
const WORKSPACE_METHODS: &[&str] = &[
    "GetFile",
    "MoveFile",
    "CopyFile",
    "ShareFile",
    "DeleteFile",
    "SearchPeople",
    "RenameFile",
    "CreateFolder",
    "GetSubfolder",
    "CreateShortcut",
    "GetLatestRevision",
    "KeepRevisionForever",
];

/// Ordered stage-one rules
pub fn rules() -> Result<Vec<Rule>, RewriteError> {
    Ok(vec![
        handler_context("drafts-handler-context", "DraftsHandler")?,
        handler_context("drafts-document-handler-context", "DraftsDocumentHandler")?,
        Rule::builder("draft-get-object")
            .description("Fetch drafts through the search provider")
            .pattern(r"\bar\.Drafts\.GetObject\(([^,]+),\s*(&\w+)\)")
            .template("searchProvider.DraftIndex().GetObject(ctx, $1, $2)")
            .build()?,
        Rule::builder("draft-save-object")
            .description("Index drafts through the search provider")
            .pattern(r"(?m)^(\t*)res, err := aw\.Drafts\.SaveObject\((\w+)\)")
            .template(
                "${1}searchDoc := mapToSearchDocument($2)\n\
                 ${1}res, err := searchProvider.DraftIndex().Index(ctx, searchDoc)",
            )
            .build()?,
        Rule::builder("draft-delete-object")
            .description("Delete drafts through the search provider")
            .call(r"res, err := aw\.Drafts\.DeleteObject\(")
            .template("res, err := searchProvider.DraftIndex().Delete(ctx, ${args})")
            .build()?,
        Rule::builder("drafts-sorted-search")
            .description("Search the draft index instead of the sorted replicas")
            .pattern(r#"resp, err = ar\.DraftsCreatedTime(?:Asc|Desc)\.Search\("",\s*params\.\.\.\)"#)
            .template(r#"resp, err = searchProvider.DraftIndex().Search(ctx, "", params...)"#)
            .build()?,
        Rule::builder("workspace-service-calls")
            .description("Call Google Workspace methods on the workspace provider")
            .pattern(format!(r"\bs\.({})\(", WORKSPACE_METHODS.join("|")))
            .template("workspaceProvider.$1(")
            .build()?,
        Rule::builder("workspace-adapter")
            .description("Use the workspace provider instead of wrapping the service")
            .pattern(r"\bprovider (:?=) gw\.NewAdapter\(s\)")
            .template("provider $1 workspaceProvider")
            .build()?,
        Rule::builder("copy-template-service")
            .description("Stop copying the Google Workspace service for templates")
            .pattern(r"copyTemplateSvc := \*s\b")
            .template("copyTemplateSvc := workspaceProvider")
            .build()?,
        Rule::builder("algolia-not-found")
            .description("Check for the provider's not-found error instead of an Algolia 404")
            .pattern(r"if _, is404 := errs\.IsAlgoliaErrWithCode\(err, 404\); is404 \{")
            .template("if errors.Is(err, pkgsearch.ErrNotFound) {")
            .build()?,
    ])
}

fn handler_context(id: &str, handler: &str) -> Result<Rule, RewriteError> {
    Rule::builder(id)
        .description(format!("Declare the request context at the top of {handler}"))
        .pattern(format!(
            r"(func {handler}\([^{{]+\{{[\s\n]+return http\.HandlerFunc\(func\(w http\.ResponseWriter, r \*http\.Request\) \{{)"
        ))
        .template("$1\n\t\tctx := r.Context()")
        .not_followed_by(r"\n\t\tctx := r\.Context\(\)")
        .build()
}
