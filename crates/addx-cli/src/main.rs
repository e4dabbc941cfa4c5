use addx_config::{AddxConfig, RegistrationConfig};
use addx_core::{FileId, LineCol, LineIndex, TextSize};
use addx_project::{find_project_root, load_project, Project};
use addx_refactor::{compute_candidates, CancellationToken, CandidateEdit};
use addx_syntax::{debug_dump, parse_csharp};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "addx",
    version,
    about = "Register C# classes with dependency-injection AddX calls"
)]
struct Cli {
    /// Config file (defaults to `addx.toml` or `.addx.toml` in the project root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registrations offered at a cursor position
    Candidates(CandidatesArgs),
    /// Apply one of the offered registrations
    Apply(ApplyArgs),
    /// Print a debug parse tree / errors for a single file
    Parse(ParseArgs),
}

#[derive(Args)]
struct CursorArgs {
    /// C# file containing the cursor
    file: PathBuf,
    /// Cursor as a byte offset into the file
    #[arg(
        long,
        conflicts_with_all = ["line", "column"],
        required_unless_present = "line"
    )]
    offset: Option<u32>,
    /// Cursor line (1-based)
    #[arg(long, requires = "column")]
    line: Option<u32>,
    /// Cursor column in bytes (1-based)
    #[arg(long, requires = "line")]
    column: Option<u32>,
    /// Project root (defaults to the nearest folder with a `*.csproj`, `*.sln` or `.git`)
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Args)]
struct CandidatesArgs {
    #[command(flatten)]
    cursor: CursorArgs,
    /// Emit JSON suitable for editor integrations
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ApplyArgs {
    #[command(flatten)]
    cursor: CursorArgs,
    /// Index of the candidate, as listed by `addx candidates`
    #[arg(long)]
    index: usize,
    /// Print the updated registration file instead of writing it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct ParseArgs {
    /// File to parse
    file: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Candidates(args) => {
            let session = Session::open(&args.cursor, cli.config.as_deref())?;
            let (session, candidates) = compute(session)?;
            let listed = CandidateList(
                candidates
                    .iter()
                    .enumerate()
                    .map(|(index, candidate)| CandidateSummary {
                        index,
                        group: candidate.group().map(str::to_string),
                        title: candidate.title().to_string(),
                        file: session.display_path(candidate.file()),
                    })
                    .collect(),
            );
            print_output(&listed, args.json)?;
            Ok(0)
        }
        Command::Apply(args) => {
            let session = Session::open(&args.cursor, cli.config.as_deref())?;
            let (session, candidates) = compute(session)?;
            if candidates.is_empty() {
                eprintln!("no registration candidates at this position");
                return Ok(1);
            }
            let candidate = candidates.get(args.index).with_context(|| {
                format!(
                    "candidate index {} is out of range ({} available)",
                    args.index,
                    candidates.len()
                )
            })?;

            let target = candidate.file();
            let updated = candidate
                .apply(&session.project)
                .with_context(|| format!("failed to apply `{}`", candidate.title()))?;
            let text = updated
                .text(target)
                .context("registration document missing from the updated project")?;

            if args.dry_run {
                print!("{text}");
                return Ok(0);
            }

            let path = updated
                .fs_path(target)
                .context("project was not loaded from disk")?;
            write_atomically(&path, text)?;
            tracing::info!(
                target = "addx.cli",
                path = %path.display(),
                title = candidate.title(),
                "applied registration"
            );
            println!(
                "applied: {} ({})",
                candidate.title(),
                session.display_path(target)
            );
            Ok(0)
        }
        Command::Parse(args) => {
            let root = find_project_root(&args.file);
            let (config, _) = load_config(&root, cli.config.as_deref())?;
            addx_config::init_tracing(&config.logging);

            let text = std::fs::read_to_string(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            let parse = parse_csharp(&text);
            let index = LineIndex::new(&text);
            let output = ParseOutput {
                tree: debug_dump(&parse.syntax()),
                errors: parse
                    .errors
                    .iter()
                    .map(|error| {
                        let pos = index.line_col(error.range.start());
                        ParseErrorOutput {
                            message: error.message.clone(),
                            line: pos.line + 1,
                            column: pos.col + 1,
                        }
                    })
                    .collect(),
            };
            let exit = if output.errors.is_empty() { 0 } else { 1 };
            print_output(&output, args.json)?;
            Ok(exit)
        }
    }
}

/// A loaded project plus the resolved cursor.
struct Session {
    project: Project,
    file: FileId,
    offset: TextSize,
    options: RegistrationConfig,
}

impl Session {
    fn open(cursor: &CursorArgs, config_path: Option<&Path>) -> Result<Self> {
        let file_path = std::fs::canonicalize(&cursor.file)
            .with_context(|| format!("failed to resolve {}", cursor.file.display()))?;
        let root = match &cursor.root {
            Some(root) => root.clone(),
            None => find_project_root(&file_path),
        };

        let (config, loaded_from) = load_config(&root, config_path)?;
        addx_config::init_tracing(&config.logging);
        if let Some(path) = &loaded_from {
            tracing::debug!(target = "addx.cli", path = %path.display(), "loaded config");
        }

        let project = load_project(&root)
            .with_context(|| format!("failed to load project at {}", root.display()))?;
        let file = project.file_id_for_fs_path(&file_path).with_context(|| {
            format!(
                "{} is not a C# document beneath {}",
                file_path.display(),
                root.display()
            )
        })?;
        let text = project.text(file).unwrap_or_default();
        let offset = cursor_offset(cursor, text)?;
        tracing::debug!(
            target = "addx.cli",
            root = %root.display(),
            documents = project.file_ids().count(),
            offset = u32::from(offset),
            "project loaded"
        );

        Ok(Self {
            project,
            file,
            offset,
            options: config.registration,
        })
    }

    fn display_path(&self, file: FileId) -> String {
        self.project
            .path(file)
            .map(ToString::to_string)
            .unwrap_or_else(|| file.to_string())
    }
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Result<(AddxConfig, Option<PathBuf>)> {
    match explicit {
        Some(path) => {
            let config = AddxConfig::load_from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, Some(path.to_path_buf())))
        }
        None => addx_config::load_for_project(root)
            .with_context(|| format!("failed to load config for {}", root.display())),
    }
}

fn cursor_offset(cursor: &CursorArgs, text: &str) -> Result<TextSize> {
    let offset = match (cursor.offset, cursor.line, cursor.column) {
        (Some(offset), _, _) => TextSize::from(offset),
        (None, Some(line), Some(column)) => {
            if line == 0 || column == 0 {
                bail!("--line and --column are 1-based");
            }
            LineIndex::new(text)
                .offset(LineCol::new(line - 1, column - 1))
                .with_context(|| format!("{line}:{column} is outside the file"))?
        }
        _ => bail!("either --offset or --line and --column is required"),
    };
    if offset > TextSize::of(text) {
        bail!("offset {} is past the end of the file", u32::from(offset));
    }
    Ok(offset)
}

/// Runs the refactoring on a blocking worker; Ctrl-C cancels it.
fn compute(session: Session) -> Result<(Session, Vec<CandidateEdit>)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let cancel = CancellationToken::new();

    runtime.block_on(async move {
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!(target = "addx.cli", "interrupted, cancelling");
                    cancel.cancel();
                }
            })
        };

        let task = {
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                let candidates = compute_candidates(
                    &session.project,
                    session.file,
                    session.offset,
                    &session.options,
                    &cancel,
                );
                (session, candidates)
            })
        };

        let result = task.await.context("registration worker panicked");
        interrupt.abort();
        let (session, candidates) = result?;
        if cancel.is_cancelled() {
            bail!("interrupted");
        }
        Ok((session, candidates))
    })
}

fn write_atomically(path: &Path, text: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create a temporary file in {}", parent.display()))?;
    let tmp_path = file.path().to_path_buf();
    file.write_all(text.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    file.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[derive(Serialize)]
#[serde(transparent)]
struct CandidateList(Vec<CandidateSummary>);

#[derive(Serialize)]
struct CandidateSummary {
    index: usize,
    group: Option<String>,
    title: String,
    file: String,
}

#[derive(Serialize)]
struct ParseOutput {
    tree: String,
    errors: Vec<ParseErrorOutput>,
}

#[derive(Serialize)]
struct ParseErrorOutput {
    message: String,
    line: u32,
    column: u32,
}

fn print_output<T: Serialize + 'static>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    } else {
        // Human output for key types. Everything else falls back to pretty JSON.
        let any = value as &dyn std::any::Any;
        if let Some(CandidateList(candidates)) = any.downcast_ref::<CandidateList>() {
            if candidates.is_empty() {
                println!("no registration candidates");
            }
            for candidate in candidates {
                match &candidate.group {
                    Some(group) => println!(
                        "[{}] {} > {} ({})",
                        candidate.index, group, candidate.title, candidate.file
                    ),
                    None => println!(
                        "[{}] {} ({})",
                        candidate.index, candidate.title, candidate.file
                    ),
                }
            }
        } else if let Some(output) = any.downcast_ref::<ParseOutput>() {
            print!("{}", output.tree);
            for error in &output.errors {
                println!("error {}:{}: {}", error.line, error.column, error.message);
            }
        } else {
            let out = serde_json::to_string_pretty(value)?;
            println!("{out}");
        }
    }
    Ok(())
}
