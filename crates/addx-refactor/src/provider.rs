use addx_config::RegistrationConfig;
use addx_core::{apply_text_edits, FileId, TextEdit, TextSize, WorkspaceEdit};
use addx_project::{Project, SemanticModel};
use addx_syntax::AstNode;
use tokio_util::sync::CancellationToken;

use crate::db::RegistrationDatabase;
use crate::imports::{reconcile_imports, RequiredImports};
use crate::locate::{find_registration_method, RegistrationMethod};
use crate::synthesize::{splice_strategy, synthesize, Registration, SpliceStrategy};
use crate::trigger::{resolve_trigger, BaseTypeRef};
use crate::RegistrationError;

/// A registration the user can pick.
///
/// Candidates hold plain data only and render their edit on demand, so a list
/// can be moved across threads and kept around while the user decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEdit {
    title: String,
    group: Option<String>,
    file: FileId,
    receiver: String,
    registration: Registration,
    strategy: SpliceStrategy,
    imports: Vec<TextEdit>,
}

impl CandidateEdit {
    /// `Register with AddScoped<IFoo, Foo>`
    pub fn title(&self) -> &str {
        &self.title
    }

    /// `Register as IFoo...` for candidates keyed off the first base type.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Document containing the registration method.
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn edit(&self) -> WorkspaceEdit {
        let mut edit = WorkspaceEdit::default();
        edit.extend(self.file, self.imports.iter().cloned());
        edit.add_edit(
            self.file,
            self.strategy.render(&self.receiver, &self.registration),
        );
        edit
    }

    /// The snapshot `db` with this candidate's edit applied.
    pub fn apply(&self, db: &dyn RegistrationDatabase) -> Result<Project, RegistrationError> {
        let edit = self.edit();
        let mut updated: Option<Project> = None;
        for file in edit.files() {
            let current: &dyn RegistrationDatabase = match &updated {
                Some(project) => project,
                None => db,
            };
            let text = current
                .file_text(file)
                .ok_or(RegistrationError::UnknownDocument(file))?;
            let new_text = apply_text_edits(text, edit.edits_for(file))?;
            let next = current
                .with_file_text(file, new_text)
                .ok_or(RegistrationError::UnknownDocument(file))?;
            updated = Some(next);
        }
        updated.ok_or(RegistrationError::UnknownDocument(self.file))
    }
}

/// Registration candidates for the declaration at `offset` in `file`.
///
/// Any failure (no class at the cursor, no registration method, cancellation,
/// ...) yields an empty list; the reason is logged at debug level.
pub fn compute_candidates(
    db: &dyn RegistrationDatabase,
    file: FileId,
    offset: TextSize,
    options: &RegistrationConfig,
    cancel: &CancellationToken,
) -> Vec<CandidateEdit> {
    match try_compute_candidates(db, file, offset, options, cancel) {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::debug!(target = "addx.refactor", %file, error = %err, "no registration candidates");
            Vec::new()
        }
    }
}

/// Like [`compute_candidates`], but reports why nothing was offered.
pub fn try_compute_candidates(
    db: &dyn RegistrationDatabase,
    file: FileId,
    offset: TextSize,
    options: &RegistrationConfig,
    cancel: &CancellationToken,
) -> Result<Vec<CandidateEdit>, RegistrationError> {
    if cancel.is_cancelled() {
        return Err(RegistrationError::Cancelled);
    }
    let root = db
        .syntax_root(file)
        .ok_or(RegistrationError::UnknownDocument(file))?;
    let trigger = resolve_trigger(&root, offset).ok_or(RegistrationError::NoTriggerTarget)?;
    tracing::debug!(
        target = "addx.refactor",
        name = %trigger.ty.qualified_name,
        base = ?trigger.selected_base.as_ref().map(|base| &base.text),
        "resolved registration trigger"
    );

    let Some(method) = find_registration_method(db, file, options, cancel) else {
        return Err(if cancel.is_cancelled() {
            RegistrationError::Cancelled
        } else {
            RegistrationError::NoRegistrationMethodFound
        });
    };

    let text = db
        .file_text(method.file)
        .ok_or(RegistrationError::UnknownDocument(method.file))?;
    let strategy = splice_strategy(&method.body, text)?;

    let unresolved = || RegistrationError::SymbolResolutionFailure {
        name: trigger.ty.qualified_name.clone(),
    };
    let semantic = db.semantic_model().ok_or_else(unresolved)?;
    let symbol = semantic
        .declared_symbol(file, &trigger.ty.declaration)
        .ok_or_else(unresolved)?;
    let lookup = Lookup {
        semantic: &semantic,
        file,
        namespace: &symbol.namespace,
    };

    let mut groups = Vec::new();
    match &trigger.selected_base {
        Some(base) => groups.push(group(&lookup, &method, Some(base), None)),
        None => {
            groups.push(group(&lookup, &method, None, None));
            if let Some(first) = trigger.ty.base_types.first() {
                if options.offer_first_base_type {
                    let label = format!("Register as {}...", first.text);
                    groups.push(group(&lookup, &method, Some(first), Some(label)));
                }
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(RegistrationError::Cancelled);
    }

    let candidates: Vec<CandidateEdit> = groups
        .into_iter()
        .flat_map(|group| {
            synthesize(group.service.as_deref(), &trigger.ty.qualified_name, &options.lifetimes)
                .into_iter()
                .map(|registration| CandidateEdit {
                    title: registration.title(),
                    group: group.label.clone(),
                    file: method.file,
                    receiver: method.receiver.clone(),
                    strategy: strategy.clone(),
                    imports: group.imports.clone(),
                    registration,
                })
                .collect::<Vec<_>>()
        })
        .collect();
    tracing::debug!(
        target = "addx.refactor",
        count = candidates.len(),
        method = %method.name,
        "computed registration candidates"
    );
    Ok(candidates)
}

/// What one group of candidates (one per lifetime) has in common.
struct Group {
    label: Option<String>,
    service: Option<String>,
    imports: Vec<TextEdit>,
}

/// Where base types are resolved from: the declaring file and the concrete
/// type's namespace.
struct Lookup<'a> {
    semantic: &'a SemanticModel,
    file: FileId,
    namespace: &'a str,
}

fn group(
    lookup: &Lookup<'_>,
    method: &RegistrationMethod,
    service: Option<&BaseTypeRef>,
    label: Option<String>,
) -> Group {
    let mut required = RequiredImports::new();
    required.push(lookup.namespace);
    if let Some(base) = service {
        let symbol = lookup
            .semantic
            .resolve_type(lookup.file, lookup.namespace, &base.text);
        match symbol {
            Some(symbol) => {
                required.push(&symbol.namespace);
            }
            None => {
                let err = RegistrationError::SymbolResolutionFailure {
                    name: base.text.clone(),
                };
                tracing::debug!(target = "addx.refactor", error = %err, "no import added for base type");
            }
        }
    }

    let imports = reconcile_imports(&method.root(), method.method.syntax(), &required);
    Group {
        label,
        service: service.map(|base| base.text.clone()),
        imports,
    }
}
