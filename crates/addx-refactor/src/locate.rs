use addx_config::RegistrationConfig;
use addx_core::FileId;
use addx_project::{enclosing_namespace, folder_prefixes, ProjectPath};
use addx_syntax::{AstNode, Block, ClassDeclaration, MethodDeclaration, SyntaxNode};
use tokio_util::sync::CancellationToken;

use crate::classify::{classify_method, first_parameter, is_container_type, Eligibility};
use crate::db::RegistrationDatabase;

/// An eligible registration method found by [`find_registration_method`].
///
/// The syntax handles point into the snapshot the search ran against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationMethod {
    pub file: FileId,
    pub method: MethodDeclaration,
    pub body: Block,
    pub name: String,
    /// Name of the container parameter calls are made through.
    pub receiver: String,
    /// Dotted namespace enclosing the method.
    pub namespace: String,
    pub eligibility: Eligibility,
}

impl RegistrationMethod {
    /// Root of the tree the method lives in.
    pub fn root(&self) -> SyntaxNode {
        self.method
            .syntax()
            .ancestors()
            .last()
            .unwrap_or_else(|| self.method.syntax().clone())
    }
}

/// Finds the registration method nearest to `trigger_file`.
///
/// Folders are searched from the trigger file's own folder up to the project
/// root. Within a folder documents are scanned in path order; the first
/// eligible method wins. Documents in subfolders of a searched folder are
/// never considered. Returns `None` when nothing qualifies or `cancel` fires.
pub fn find_registration_method(
    db: &dyn RegistrationDatabase,
    trigger_file: FileId,
    options: &RegistrationConfig,
    cancel: &CancellationToken,
) -> Option<RegistrationMethod> {
    let folder = db.document_path(trigger_file)?.parent();

    let mut documents: Vec<(&ProjectPath, FileId)> = db
        .documents()
        .into_iter()
        .filter(|&file| file != trigger_file)
        .filter_map(|file| Some((db.document_path(file)?, file)))
        .collect();
    documents.sort();

    for prefix in folder_prefixes(&folder) {
        if cancel.is_cancelled() {
            tracing::debug!(target = "addx.refactor", "registration method search cancelled");
            return None;
        }

        for &(path, file) in documents.iter().filter(|(path, _)| path.parent() == prefix) {
            if cancel.is_cancelled() {
                tracing::debug!(target = "addx.refactor", "registration method search cancelled");
                return None;
            }
            let Some(root) = db.syntax_root(file) else {
                continue;
            };
            if let Some(found) = scan_document(file, path, &root, options) {
                tracing::debug!(
                    target = "addx.refactor",
                    path = %path,
                    method = %found.name,
                    eligibility = ?found.eligibility,
                    "found registration method"
                );
                return Some(found);
            }
        }
    }

    tracing::debug!(
        target = "addx.refactor",
        folder = %folder,
        "no registration method between folder and project root"
    );
    None
}

fn scan_document(
    file: FileId,
    path: &ProjectPath,
    root: &SyntaxNode,
    options: &RegistrationConfig,
) -> Option<RegistrationMethod> {
    if path.file_stem() == Some(options.startup_file.as_str()) {
        return scan_startup(file, root, options);
    }

    root.descendants()
        .filter_map(MethodDeclaration::cast)
        .find_map(|method| {
            let eligibility = classify_method(&method, options);
            if !eligibility.is_eligible() {
                if eligibility == Eligibility::MissingBody {
                    tracing::trace!(
                        target = "addx.refactor",
                        path = %path,
                        "skipping registration method without a body"
                    );
                }
                return None;
            }
            registration_method(file, method, eligibility)
        })
}

/// Startup files only register through `Startup.ConfigureServices(C services)`.
fn scan_startup(
    file: FileId,
    root: &SyntaxNode,
    options: &RegistrationConfig,
) -> Option<RegistrationMethod> {
    root.descendants()
        .filter_map(ClassDeclaration::cast)
        .filter(|class| {
            class
                .name_token()
                .is_some_and(|name| name.text() == options.startup_file)
        })
        .filter_map(|class| class.body())
        .flat_map(|body| {
            body.syntax()
                .children()
                .filter_map(MethodDeclaration::cast)
                .collect::<Vec<_>>()
        })
        .filter(|method| {
            method
                .name_token()
                .is_some_and(|name| name.text() == options.configure_services_method)
        })
        .filter(|method| {
            first_parameter(method)
                .and_then(|param| param.ty())
                .is_some_and(|ty| is_container_type(&ty, &options.container_type))
        })
        .find_map(|method| registration_method(file, method, Eligibility::Conventional))
}

fn registration_method(
    file: FileId,
    method: MethodDeclaration,
    eligibility: Eligibility,
) -> Option<RegistrationMethod> {
    let body = method.body()?;
    let name = method.name_token()?.text().to_string();
    let Some(receiver) = first_parameter(&method).and_then(|param| param.name_token()) else {
        tracing::trace!(
            target = "addx.refactor",
            method = %name,
            "registration method has no container parameter"
        );
        return None;
    };
    let receiver = receiver.text().to_string();
    let namespace = enclosing_namespace(method.syntax());
    Some(RegistrationMethod {
        file,
        method,
        body,
        name,
        receiver,
        namespace,
        eligibility,
    })
}
