use std::sync::Arc;

use addx_core::FileId;
use addx_project::{Project, ProjectPath, SemanticModel};
use addx_refactor::{
    compute_candidates, try_compute_candidates, CancellationToken, RegistrationConfig,
    RegistrationDatabase, RegistrationError,
};
use addx_syntax::SyntaxNode;
use pretty_assertions::assert_eq;

use crate::suite::fixture::Fixture;

const REGISTRATOR: &str = r#"
//- /Registrator.cs
public static class Registrator
{
    public static IServiceCollection Register(this IServiceCollection services)
    {
        return services;
    }
}
"#;

fn with_registrator(trigger: &str) -> Fixture {
    Fixture::new(&format!("//- /Trigger.cs\n{trigger}\n{REGISTRATOR}"))
}

#[test]
fn cursor_inside_members_offers_nothing() {
    for trigger in [
        "public class Foo { public int Pr$0op { get; set; } }",
        "public class Foo { private readonly int _co$0unt; }",
        "public class Foo { public Fo$0o() { } }",
        "public class Foo { public void Run() { var x = 1$0; } }",
    ] {
        let fixture = with_registrator(trigger);
        assert_eq!(fixture.error(), RegistrationError::NoTriggerTarget, "{trigger}");
        assert!(fixture.candidates().is_empty());
    }
}

#[test]
fn non_registrable_declarations_offer_nothing() {
    for trigger in [
        "public struct Po$0int { }",
        "public record struct Po$0int(int X, int Y);",
        "public interface IFo$0o { }",
        "public enum Col$0or { Red, Green }",
        "public class Box$0<T> { }",
        "public static class Exten$0sions { }",
        "[Seri$0alizable] public class Box<T> { }",
        "public class Box<T> : IBo$0x { }",
        "public class Box<T$0> { }",
        "public class Box<T> where T : cla$0ss { }",
        "[Seri$0alizable] public static class Extensions { }",
        "public sta$0tic class Extensions { }",
        "public static class Extensions : IExten$0sions { }",
        "namespace Ap$0p { public class Foo { } }",
        "using Sys$0tem;\npublic class Foo { }",
    ] {
        let fixture = with_registrator(trigger);
        assert_eq!(fixture.error(), RegistrationError::NoTriggerTarget, "{trigger}");
    }
}

#[test]
fn missing_registration_method_offers_nothing() {
    let fixture = Fixture::new(
        r#"
//- /Top/Foo.cs
public class F$0oo { }
//- /Top/Helpers.cs
public static class Helpers
{
    public static void Log(string message) { }
}
//- /Other/Registrator.cs
public static class Registrator
{
    public static IServiceCollection Register(this IServiceCollection services)
    {
        return services;
    }
}
"#,
    );
    assert_eq!(fixture.error(), RegistrationError::NoRegistrationMethodFound);
    assert!(fixture.candidates().is_empty());
}

#[test]
fn expression_bodied_registration_method_is_skipped() {
    let fixture = Fixture::new(
        r#"
//- /Foo.cs
public class F$0oo { }
//- /Registrator.cs
public static class Registrator
{
    public static IServiceCollection Register(this IServiceCollection services) => services;
}
"#,
    );
    assert_eq!(fixture.error(), RegistrationError::NoRegistrationMethodFound);
}

#[test]
fn cancelled_request_offers_nothing() {
    let fixture = with_registrator("public class F$0oo { }");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let options = RegistrationConfig::default();
    assert_eq!(
        try_compute_candidates(&fixture.project, fixture.file, fixture.offset, &options, &cancel),
        Err(RegistrationError::Cancelled)
    );
    assert!(
        compute_candidates(&fixture.project, fixture.file, fixture.offset, &options, &cancel)
            .is_empty()
    );
}

/// A host whose semantic model is not available.
struct WithoutSemanticModel(Project);

impl RegistrationDatabase for WithoutSemanticModel {
    fn documents(&self) -> Vec<FileId> {
        self.0.documents()
    }

    fn document_path(&self, file: FileId) -> Option<&ProjectPath> {
        self.0.document_path(file)
    }

    fn file_text(&self, file: FileId) -> Option<&str> {
        self.0.file_text(file)
    }

    fn syntax_root(&self, file: FileId) -> Option<SyntaxNode> {
        self.0.syntax_root(file)
    }

    fn semantic_model(&self) -> Option<Arc<SemanticModel>> {
        None
    }

    fn with_file_text(&self, file: FileId, text: String) -> Option<Project> {
        RegistrationDatabase::with_file_text(&self.0, file, text)
    }
}

#[test]
fn missing_semantic_model_offers_nothing() {
    let fixture = with_registrator("public class Fo$0o : IFoo { }");
    assert_eq!(fixture.candidates().len(), 6);

    let db = WithoutSemanticModel(fixture.project.clone());
    let options = RegistrationConfig::default();
    let cancel = CancellationToken::new();
    assert_eq!(
        try_compute_candidates(&db, fixture.file, fixture.offset, &options, &cancel),
        Err(RegistrationError::SymbolResolutionFailure {
            name: "Foo".to_string()
        })
    );
    assert!(compute_candidates(&db, fixture.file, fixture.offset, &options, &cancel).is_empty());
}
