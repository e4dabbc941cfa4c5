use addx_refactor::RegistrationConfig;
use pretty_assertions::assert_eq;

use crate::suite::fixture::Fixture;

const NESTED_FOLDER: &str = r#"
//- /Top/Nested/Bar.cs
namespace App.Top.Nested
{
    public class $0Bar
    {
        public int Prop { get; set; }
    }
}
//- /Top/Registrator.cs
using Microsoft.Extensions.DependencyInjection;

namespace App.Top
{
    public static class Registrator
    {
        public static IServiceCollection RegisterServices(this IServiceCollection services)
        {
            return services;
        }
    }
}
"#;

#[test]
fn registers_in_parent_folder_as_separate_statement() {
    let fixture = Fixture::new(NESTED_FOLDER);
    let candidates = fixture.candidates();

    assert_eq!(
        fixture.titles(),
        vec![
            "Register with AddSingleton<Bar>",
            "Register with AddScoped<Bar>",
            "Register with AddTransient<Bar>",
        ]
    );
    assert!(candidates.iter().all(|candidate| candidate.group().is_none()));
    assert!(candidates
        .iter()
        .all(|candidate| fixture.path(candidate.file()) == "Top/Registrator.cs"));

    let expected = r#"using Microsoft.Extensions.DependencyInjection;
using App.Top.Nested;

namespace App.Top
{
    public static class Registrator
    {
        public static IServiceCollection RegisterServices(this IServiceCollection services)
        {
            services.AddScoped<Bar>();
            return services;
        }
    }
}
"#;
    assert_eq!(fixture.applied(&candidates[1], "Top/Registrator.cs"), expected);

    for (candidate, lifetime) in candidates.iter().zip(["Singleton", "Scoped", "Transient"]) {
        let text = fixture.applied(candidate, "Top/Registrator.cs");
        assert!(
            text.contains(&format!("services.Add{lifetime}<Bar>();\n            return services;")),
            "{text}"
        );
    }
}

const EMPTY_METHOD: &str = r#"
//- /Lib/Contracts/Contracts.cs
namespace Lib.Contracts
{
    public interface IFoo { }
    public interface IBar { }
}
//- /Lib/Foo.cs
using Lib.Contracts;

namespace Lib
{
    public class Foo : IFoo, I$0Bar
    {
        public int Prop { get; set; }
    }
}
//- /Lib/Registrator.cs
using System;

namespace Lib
{
    public static class Registrator
    {
        public static IServiceCollection RegisterServices(this IServiceCollection services)
        {

        }
    }
}
"#;

#[test]
fn selected_base_type_in_empty_method_returns_registration() {
    let fixture = Fixture::new(EMPTY_METHOD);
    let candidates = fixture.candidates();

    assert_eq!(
        fixture.titles(),
        vec![
            "Register with AddSingleton<IBar, Foo>",
            "Register with AddScoped<IBar, Foo>",
            "Register with AddTransient<IBar, Foo>",
        ]
    );

    let expected = r#"using System;
using Lib.Contracts;

namespace Lib
{
    public static class Registrator
    {
        public static IServiceCollection RegisterServices(this IServiceCollection services)
        {
            return services.AddTransient<IBar, Foo>();
        }
    }
}
"#;
    assert_eq!(fixture.applied(&candidates[2], "Lib/Registrator.cs"), expected);
}

const CHAIN: &str = r#"
//- /Foo.cs
namespace Lib
{
    public class F$0oo : IFoo, IBar
    {
    }
}
//- /Registrator.cs
namespace Lib
{
    public static class Registrator
    {
        public static IServiceCollection RegisterServices(this IServiceCollection services)
        {
            return services.AddSingleton<X>().AddScoped<Y, Z>();
        }
    }
}
"#;

#[test]
fn extends_returned_invocation_chain() {
    let fixture = Fixture::new(CHAIN);
    let candidates = fixture.candidates();
    assert_eq!(candidates.len(), 6);

    let text = fixture.applied(&candidates[2], "Registrator.cs");
    assert!(
        text.contains("return services.AddSingleton<X>().AddScoped<Y, Z>().AddTransient<Foo>();"),
        "{text}"
    );
    // Same namespace, nothing to import.
    assert!(!text.contains("using"), "{text}");
}

#[test]
fn first_base_type_group_follows_plain_candidates() {
    let fixture = Fixture::new(CHAIN);
    let candidates = fixture.candidates();

    let listed: Vec<(Option<&str>, &str)> = candidates
        .iter()
        .map(|candidate| (candidate.group(), candidate.title()))
        .collect();
    assert_eq!(
        listed,
        vec![
            (None, "Register with AddSingleton<Foo>"),
            (None, "Register with AddScoped<Foo>"),
            (None, "Register with AddTransient<Foo>"),
            (Some("Register as IFoo..."), "Register with AddSingleton<IFoo, Foo>"),
            (Some("Register as IFoo..."), "Register with AddScoped<IFoo, Foo>"),
            (Some("Register as IFoo..."), "Register with AddTransient<IFoo, Foo>"),
        ]
    );

    let text = fixture.applied(&candidates[4], "Registrator.cs");
    assert!(
        text.contains(".AddScoped<Y, Z>().AddScoped<IFoo, Foo>();"),
        "{text}"
    );
}

#[test]
fn first_base_type_group_can_be_disabled() {
    let fixture = Fixture::new(CHAIN);
    let options = RegistrationConfig {
        offer_first_base_type: false,
        ..RegistrationConfig::default()
    };
    let candidates = fixture.candidates_with(&options);
    assert_eq!(candidates.len(), 3);
    assert!(candidates.iter().all(|candidate| candidate.group().is_none()));
}

#[test]
fn lifetimes_follow_configuration_order() {
    let fixture = Fixture::new(NESTED_FOLDER);
    let options = RegistrationConfig {
        lifetimes: vec!["Transient".to_string(), "Pooled".to_string()],
        ..RegistrationConfig::default()
    };
    let titles: Vec<String> = fixture
        .candidates_with(&options)
        .iter()
        .map(|candidate| candidate.title().to_string())
        .collect();
    assert_eq!(
        titles,
        vec!["Register with AddTransient<Bar>", "Register with AddPooled<Bar>"]
    );
}

#[test]
fn candidates_are_computed_against_the_same_snapshot() {
    let fixture = Fixture::new(NESTED_FOLDER);
    let candidates = fixture.candidates();
    let file = candidates[0].file();

    let ranges: Vec<_> = candidates
        .iter()
        .map(|candidate| {
            candidate
                .edit()
                .edits_for(file)
                .iter()
                .map(|edit| edit.range)
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(ranges.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn nested_types_are_registered_by_qualified_name() {
    let fixture = Fixture::new(
        r#"
//- /Outer.cs
namespace App
{
    public class Outer
    {
        public class In$0ner : IInner { }
    }
}
//- /Registrator.cs
namespace App
{
    public static class Registrator
    {
        public static IServiceCollection Register(this IServiceCollection services)
        {
            return services;
        }
    }
}
"#,
    );
    let candidates = fixture.candidates();
    assert_eq!(candidates[0].title(), "Register with AddSingleton<Outer.Inner>");
    assert_eq!(candidates[3].title(), "Register with AddSingleton<IInner, Outer.Inner>");
}

#[test]
fn records_are_registered() {
    let fixture = Fixture::new(
        r#"
//- /Person.cs
public record Per$0son(string Name);
//- /Registrator.cs
public static class Registrator
{
    public static IServiceCollection Register(this IServiceCollection services)
    {
        return services;
    }
}
"#,
    );
    assert_eq!(fixture.candidates().len(), 3);
}

#[test]
fn generic_base_type_is_used_as_written() {
    let fixture = Fixture::new(
        r#"
//- /Data/Repositories.cs
namespace App.Data
{
    public interface IRepository<T> { }
}
//- /Web/Customers.cs
using App.Data;

namespace App.Web
{
    public class CustomerRepository : IRepository<Cust$0omer> { }
}
//- /Web/Registrator.cs
namespace App.Web.Setup
{
    public static class Registrator
    {
        public static IServiceCollection Register(this IServiceCollection services)
        {
            return services;
        }
    }
}
"#,
    );
    let candidates = fixture.candidates();
    assert_eq!(
        candidates[0].title(),
        "Register with AddSingleton<IRepository<Customer>, CustomerRepository>"
    );

    let text = fixture.applied(&candidates[0], "Web/Registrator.cs");
    // `App.Web` encloses `App.Web.Setup`, so only the repository namespace is added.
    assert!(text.starts_with("using App.Data;\n\nnamespace App.Web.Setup"), "{text}");
}
