use addx_refactor::{compute_candidates, CancellationToken, RegistrationConfig};
use pretty_assertions::assert_eq;

use crate::suite::fixture::Fixture;

const FIXTURE: &str = r#"
//- /Domain/Services/Mailer.cs
using Domain.Contracts;

namespace Domain.Services
{
    public class Mail$0er : IMailer { }
    public class Sms : ISms { }
}
//- /Domain/Services/IMailer.cs
namespace Domain.Contracts
{
    public interface IMailer { }
}
//- /Domain/Registrations.cs
namespace Domain
{
    public static class Registrations
    {
        public static IServiceCollection AddDomain(this IServiceCollection services)
        {
            return services;
        }
    }
}
"#;

#[test]
fn apply_replaces_only_the_registration_document() {
    let fixture = Fixture::new(FIXTURE);
    let candidates = fixture.candidates();
    let updated = candidates[0].apply(&fixture.project).unwrap();

    for file in fixture.project.file_ids() {
        if file == candidates[0].file() {
            assert_ne!(updated.text(file), fixture.project.text(file));
        } else {
            assert_eq!(updated.text(file), fixture.project.text(file));
        }
    }
}

#[test]
fn repeated_registrations_do_not_duplicate_usings() {
    let fixture = Fixture::new(FIXTURE);
    let registrations = fixture.file_id("Domain/Registrations.cs");

    let first = fixture.candidates();
    let updated = first[0].apply(&fixture.project).unwrap();

    // Register the sibling type against the updated snapshot.
    let sms = fixture.file_id("Domain/Services/Mailer.cs");
    let text = updated.text(sms).unwrap();
    let offset = text.find("Sms").unwrap() as u32;
    let second = compute_candidates(
        &updated,
        sms,
        offset.into(),
        &RegistrationConfig::default(),
        &CancellationToken::new(),
    );
    let updated = second[0].apply(&updated).unwrap();

    let expected = r#"using Domain.Services;

namespace Domain
{
    public static class Registrations
    {
        public static IServiceCollection AddDomain(this IServiceCollection services)
        {
            services.AddSingleton<Sms>();
            services.AddSingleton<Mailer>();
            return services;
        }
    }
}
"#;
    assert_eq!(updated.text(registrations).unwrap(), expected);
}

#[test]
fn first_base_type_resolves_its_namespace() {
    let fixture = Fixture::new(FIXTURE);
    let candidates = fixture.candidates();
    let grouped = candidates
        .iter()
        .find(|candidate| candidate.group() == Some("Register as IMailer..."))
        .unwrap();
    assert_eq!(grouped.title(), "Register with AddSingleton<IMailer, Mailer>");

    let text = fixture.applied(grouped, "Domain/Registrations.cs");
    assert!(
        text.starts_with("using Domain.Services;\nusing Domain.Contracts;\n\nnamespace Domain"),
        "{text}"
    );
}

#[test]
fn edit_targets_the_registration_document_only() {
    let fixture = Fixture::new(FIXTURE);
    let candidates = fixture.candidates();
    let edit = candidates[0].edit();
    assert_eq!(
        edit.files().collect::<Vec<_>>(),
        vec![fixture.file_id("Domain/Registrations.cs")]
    );
    // One import, one registration.
    assert_eq!(edit.edits_for(candidates[0].file()).len(), 2);
}
