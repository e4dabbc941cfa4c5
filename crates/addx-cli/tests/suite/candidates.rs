use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::{addx, bar_offset, project};

#[test]
fn help_mentions_core_commands() {
    addx().arg("--help").assert().success().stdout(
        predicate::str::contains("candidates")
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("parse")),
    );
}

#[test]
fn lists_candidates_as_json() {
    let temp = project();
    let output = addx()
        .current_dir(temp.path())
        .args(["candidates", "Top/Nested/Bar.cs", "--offset"])
        .arg(bar_offset())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        listed,
        json!([
            { "index": 0, "group": null, "title": "Register with AddSingleton<Bar>", "file": "Top/Registrator.cs" },
            { "index": 1, "group": null, "title": "Register with AddScoped<Bar>", "file": "Top/Registrator.cs" },
            { "index": 2, "group": null, "title": "Register with AddTransient<Bar>", "file": "Top/Registrator.cs" },
        ])
    );
}

#[test]
fn line_and_column_select_the_same_cursor() {
    let temp = project();
    addx()
        .current_dir(temp.path())
        .args(["candidates", "Top/Nested/Bar.cs", "--line", "3", "--column", "19"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[1] Register with AddScoped<Bar> (Top/Registrator.cs)",
        ));
}

#[test]
fn cursor_outside_a_type_lists_nothing() {
    let temp = project();
    addx()
        .current_dir(temp.path())
        .args(["candidates", "Top/Nested/Bar.cs", "--offset", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no registration candidates"));
}

#[test]
fn lifetimes_come_from_project_config() {
    let temp = project();
    temp.child("addx.toml")
        .write_str("[registration]\nlifetimes = [\"Scoped\"]\n")
        .unwrap();

    addx()
        .current_dir(temp.path())
        .args(["candidates", "Top/Nested/Bar.cs", "--offset"])
        .arg(bar_offset())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Register with AddScoped<Bar>")
                .and(predicate::str::contains("AddSingleton").not()),
        );
}

#[test]
fn explicit_config_overrides_discovery() {
    let temp = project();
    temp.child("addx.toml")
        .write_str("[registration]\nlifetimes = [\"Scoped\"]\n")
        .unwrap();
    let custom = temp.child("custom.toml");
    custom
        .write_str("[registration]\nlifetimes = [\"Transient\"]\n")
        .unwrap();

    addx()
        .current_dir(temp.path())
        .args(["--config"])
        .arg(custom.path())
        .args(["candidates", "Top/Nested/Bar.cs", "--offset"])
        .arg(bar_offset())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("AddTransient<Bar>")
                .and(predicate::str::contains("AddScoped").not()),
        );
}

#[test]
fn config_env_var_is_honored() {
    let temp = project();
    temp.child("ci.toml")
        .write_str("[registration]\nlifetimes = [\"Pooled\"]\n")
        .unwrap();

    addx()
        .current_dir(temp.path())
        .env("ADDX_CONFIG", "ci.toml")
        .args(["candidates", "Top/Nested/Bar.cs", "--offset"])
        .arg(bar_offset())
        .assert()
        .success()
        .stdout(predicate::str::contains("Register with AddPooled<Bar>"));
}

#[test]
fn invalid_config_is_an_error() {
    let temp = project();
    temp.child("addx.toml")
        .write_str("[registration]\nunknown_key = true\n")
        .unwrap();

    addx()
        .current_dir(temp.path())
        .args(["candidates", "Top/Nested/Bar.cs", "--offset"])
        .arg(bar_offset())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn offset_past_end_of_file_is_an_error() {
    let temp = project();
    addx()
        .current_dir(temp.path())
        .args(["candidates", "Top/Nested/Bar.cs", "--offset", "100000"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("past the end of the file"));
}
