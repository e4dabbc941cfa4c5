use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

use super::addx;

#[test]
fn prints_the_syntax_tree() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("Foo.cs");
    file.write_str("public class Foo { }\n").unwrap();

    addx()
        .arg("parse")
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("CompilationUnit")
                .and(predicate::str::contains("ClassDeclaration")),
        );
}

#[test]
fn json_output_lists_errors() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("Foo.cs");
    file.write_str("namespace App { public class Foo { } }\n").unwrap();

    let output = addx()
        .args(["parse", "--json"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["errors"], serde_json::json!([]));
    assert!(value["tree"]
        .as_str()
        .unwrap()
        .contains("NamespaceDeclaration"));
}

#[test]
fn missing_file_is_an_error() {
    addx()
        .args(["parse", "does/not/exist.cs"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}
