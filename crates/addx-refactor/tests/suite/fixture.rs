use addx_core::{FileId, TextSize};
use addx_project::{Project, ProjectPath};
use addx_refactor::{
    compute_candidates, try_compute_candidates, CancellationToken, CandidateEdit,
    RegistrationConfig, RegistrationError,
};

/// A multi-file project with one cursor.
///
/// ```text
/// //- /Top/Nested/Bar.cs
/// class $0Bar {}
/// //- /Top/Registrator.cs
/// ...
/// ```
///
/// Every `//- <path>` line starts a new document; `$0` marks the cursor and is
/// removed from the text.
pub struct Fixture {
    pub project: Project,
    pub file: FileId,
    pub offset: TextSize,
}

impl Fixture {
    pub fn new(fixture: &str) -> Self {
        let mut files: Vec<(String, String)> = Vec::new();
        for line in fixture.split_inclusive('\n') {
            if let Some(path) = line.trim_start().strip_prefix("//- ") {
                files.push((path.trim().to_string(), String::new()));
                continue;
            }
            if let Some((_, text)) = files.last_mut() {
                text.push_str(line);
            }
        }

        let mut cursor = None;
        for (path, text) in &mut files {
            if let Some(idx) = text.find("$0") {
                assert!(cursor.is_none(), "fixture must contain exactly one $0 cursor");
                text.replace_range(idx..idx + 2, "");
                cursor = Some((path.clone(), idx));
            }
        }
        let (cursor_path, offset) = cursor.expect("fixture must contain a $0 cursor");

        let project = Project::new(files);
        let file = project
            .file_id(&ProjectPath::new(&cursor_path))
            .expect("cursor file is part of the project");
        Self {
            project,
            file,
            offset: TextSize::from(offset as u32),
        }
    }

    pub fn candidates(&self) -> Vec<CandidateEdit> {
        self.candidates_with(&RegistrationConfig::default())
    }

    pub fn candidates_with(&self, options: &RegistrationConfig) -> Vec<CandidateEdit> {
        compute_candidates(
            &self.project,
            self.file,
            self.offset,
            options,
            &CancellationToken::new(),
        )
    }

    pub fn error(&self) -> RegistrationError {
        try_compute_candidates(
            &self.project,
            self.file,
            self.offset,
            &RegistrationConfig::default(),
            &CancellationToken::new(),
        )
        .expect_err("expected no candidates")
    }

    pub fn titles(&self) -> Vec<String> {
        self.candidates()
            .iter()
            .map(|candidate| candidate.title().to_string())
            .collect()
    }

    pub fn file_id(&self, path: &str) -> FileId {
        self.project
            .file_id(&ProjectPath::new(path))
            .unwrap_or_else(|| panic!("no document at {path}"))
    }

    pub fn path(&self, file: FileId) -> String {
        self.project.path(file).unwrap().to_string()
    }

    /// Text of `path` after applying `candidate`.
    pub fn applied(&self, candidate: &CandidateEdit, path: &str) -> String {
        let project = candidate.apply(&self.project).expect("candidate applies");
        let file = project.file_id(&ProjectPath::new(path)).unwrap();
        project.text(file).unwrap().to_string()
    }
}
