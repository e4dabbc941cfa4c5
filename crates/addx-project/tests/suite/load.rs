use std::fs;

use addx_project::{find_project_root, load_project, LoadError, ProjectPath};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn loads_cs_files_and_skips_build_output() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("Top/Nested")).unwrap();
    fs::create_dir_all(root.join("bin/Debug")).unwrap();
    fs::create_dir_all(root.join("obj")).unwrap();
    fs::write(root.join("App.csproj"), "<Project />").unwrap();
    fs::write(root.join("Top/Registrations.cs"), "class Registrations {}").unwrap();
    fs::write(root.join("Top/Nested/Bar.cs"), "class Bar {}").unwrap();
    fs::write(root.join("Top/Nested/notes.txt"), "not code").unwrap();
    fs::write(root.join("bin/Debug/Generated.cs"), "class Generated {}").unwrap();
    fs::write(root.join("obj/AssemblyInfo.cs"), "class AssemblyInfo {}").unwrap();

    let project = load_project(root).expect("load project");
    let paths: Vec<String> = project
        .file_ids()
        .map(|id| project.path(id).unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["Top/Nested/Bar.cs", "Top/Registrations.cs"]);

    let bar = project
        .file_id(&ProjectPath::new("Top/Nested/Bar.cs"))
        .unwrap();
    assert_eq!(project.text(bar), Some("class Bar {}"));

    let canonical = fs::canonicalize(root).unwrap();
    assert_eq!(project.root(), Some(canonical.as_path()));
    assert_eq!(
        project.file_id_for_fs_path(&canonical.join("Top").join("Nested").join("Bar.cs")),
        Some(bar)
    );
}

#[test]
fn project_root_is_nearest_marker_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/App/Services")).unwrap();
    fs::write(root.join("src/App/App.csproj"), "<Project />").unwrap();
    let file = root.join("src/App/Services/Foo.cs");
    fs::write(&file, "class Foo {}").unwrap();

    assert_eq!(find_project_root(&file), root.join("src/App"));
}

#[test]
fn project_root_falls_back_to_the_file_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("loose");
    fs::create_dir_all(&root).unwrap();
    let file = root.join("Foo.cs");
    fs::write(&file, "class Foo {}").unwrap();

    // The temp dir itself may live below a repository; only assert that the
    // result is an ancestor of the file.
    let found = find_project_root(&file);
    assert!(file.starts_with(&found), "{found:?}");
}

#[test]
fn missing_root_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_project(dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "{err}");
}

#[test]
fn file_root_is_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("Foo.cs");
    fs::write(&file, "class Foo {}").unwrap();
    let err = load_project(&file).unwrap_err();
    assert!(matches!(err, LoadError::NotADirectory { .. }), "{err}");
}
