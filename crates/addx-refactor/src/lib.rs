//! "Register with AddX" refactoring for C# dependency-injection setups.
//!
//! Given a cursor on a class or record declaration, the engine finds the
//! nearest registration method (walking folders outward from the declaring
//! file) and offers one candidate edit per configured lifetime, e.g.
//! `services.AddScoped<IFoo, Foo>();`.
//!
//! - [`resolve_trigger`]: which type (and optionally which base type) the cursor selects
//! - [`find_registration_method`]: folder-distance search for an eligible method
//! - [`classify_method`]: marker attributes or conventional extension-method shape
//! - [`splice_strategy`] / [`synthesize`]: where and what to insert
//! - [`reconcile_imports`]: `using` directives the target file is missing
//! - [`compute_candidates`]: the public entry point tying it all together

mod classify;
mod db;
mod imports;
mod locate;
mod provider;
mod synthesize;
mod trigger;

pub use classify::{classify_method, is_container_type, Eligibility, MarkerAttribute};
pub use db::RegistrationDatabase;
pub use imports::{reconcile_imports, RequiredImports};
pub use locate::{find_registration_method, RegistrationMethod};
pub use provider::{compute_candidates, try_compute_candidates, CandidateEdit};
pub use synthesize::{splice_strategy, synthesize, Registration, SpliceStrategy};
pub use trigger::{resolve_trigger, BaseTypeRef, TriggerContext, TypeToRegister};

pub use addx_config::RegistrationConfig;
pub use addx_project::DeclarationKind;
pub use tokio_util::sync::CancellationToken;

use thiserror::Error;

/// Why a request produced no candidates.
///
/// [`compute_candidates`] logs these and returns an empty list;
/// [`try_compute_candidates`] hands them to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("no class or record declaration at the cursor")]
    NoTriggerTarget,
    #[error("no registration method found between the declaring folder and the project root")]
    NoRegistrationMethodFound,
    #[error("registration method `{method}` has a malformed body")]
    MalformedMethodBody { method: String },
    #[error("could not resolve `{name}`")]
    SymbolResolutionFailure { name: String },
    #[error("request was cancelled")]
    Cancelled,
    #[error("{0} is not part of the project")]
    UnknownDocument(addx_core::FileId),
    #[error(transparent)]
    Edit(#[from] addx_core::EditError),
}
