use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

use super::{addx, bar_offset, project, REGISTRATOR};

const REGISTERED_SCOPED: &str = r#"using Microsoft.Extensions.DependencyInjection;
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

#[test]
fn writes_the_registration_file() {
    let temp = project();
    addx()
        .current_dir(temp.path())
        .args(["apply", "Top/Nested/Bar.cs", "--index", "1", "--offset"])
        .arg(bar_offset())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "applied: Register with AddScoped<Bar> (Top/Registrator.cs)",
        ));

    let written = std::fs::read_to_string(temp.child("Top/Registrator.cs").path()).unwrap();
    assert_eq!(written, REGISTERED_SCOPED);
    temp.child("Top/Nested/Bar.cs")
        .assert(predicate::str::contains("public class Bar"));
}

#[test]
fn dry_run_prints_without_writing() {
    let temp = project();
    let output = addx()
        .current_dir(temp.path())
        .args(["apply", "Top/Nested/Bar.cs", "--index", "1", "--dry-run", "--offset"])
        .arg(bar_offset())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    assert_eq!(String::from_utf8(output.stdout).unwrap(), REGISTERED_SCOPED);
    temp.child("Top/Registrator.cs").assert(REGISTRATOR);
}

#[test]
fn explicit_root_is_used_for_the_search() {
    let temp = project();
    std::fs::remove_file(temp.child("App.csproj").path()).unwrap();

    addx()
        .args(["apply", "--index", "0", "--root"])
        .arg(temp.path())
        .arg(temp.child("Top/Nested/Bar.cs").path())
        .arg("--offset")
        .arg(bar_offset())
        .assert()
        .success();

    temp.child("Top/Registrator.cs")
        .assert(predicate::str::contains("services.AddSingleton<Bar>();"));
}

#[test]
fn no_candidates_exits_with_one() {
    let temp = project();
    addx()
        .current_dir(temp.path())
        .args(["apply", "Top/Nested/Bar.cs", "--index", "0", "--offset", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no registration candidates"));
    temp.child("Top/Registrator.cs").assert(REGISTRATOR);
}

#[test]
fn out_of_range_index_is_an_error() {
    let temp = project();
    addx()
        .current_dir(temp.path())
        .args(["apply", "Top/Nested/Bar.cs", "--index", "7", "--offset"])
        .arg(bar_offset())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("out of range (3 available)"));
    temp.child("Top/Registrator.cs").assert(REGISTRATOR);
}

#[test]
fn file_outside_the_project_is_an_error() {
    let temp = project();
    let other = assert_fs::TempDir::new().unwrap();
    other.child("Loose.cs").write_str("public class Loose { }\n").unwrap();

    addx()
        .args(["candidates", "--offset", "14", "--root"])
        .arg(temp.path())
        .arg(other.child("Loose.cs").path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is not a C# document beneath"));
}
