use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ilfunc_core::{RewriteError, Rewriter, Splice, SpliceError};

use crate::toolchain::{AssembleJob, BuildType, Toolchain};

/// Where a round trip stopped. Each stage maps to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FindAssembler,
    FindDisassembler,
    FindInput,
    Disassemble,
    Assemble,
    Rewrite,
    Io,
}

impl Stage {
    pub fn exit_code(self) -> u8 {
        match self {
            Stage::FindAssembler => 1,
            Stage::FindDisassembler => 2,
            Stage::FindInput => 3,
            Stage::Disassemble => 4,
            Stage::Assemble => 5,
            Stage::Rewrite => 6,
            Stage::Io => 7,
        }
    }
}

#[derive(Debug)]
pub struct Failure {
    pub stage: Stage,
    pub error: anyhow::Error,
}

impl Failure {
    /// Stable name of the splice failure behind a failed rewrite, if that is what stopped us.
    pub fn splice_kind(&self) -> Option<&'static str> {
        self.error
            .downcast_ref::<RewriteError>()?
            .splice_error()
            .map(SpliceError::kind)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)
    }
}

pub trait StageExt<T> {
    fn stage(self, stage: Stage) -> Result<T, Failure>;
}

impl<T, E: Into<anyhow::Error>> StageExt<T> for Result<T, E> {
    fn stage(self, stage: Stage) -> Result<T, Failure> {
        self.map_err(|e| Failure {
            stage,
            error: e.into(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub build: BuildType,
    /// Copy the rewritten IL (and resources) here before assembling.
    pub keep_il: Option<PathBuf>,
}

impl Job {
    fn is_dll(&self) -> bool {
        self.input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dll"))
    }
}

/// Fail early, with distinct stages, when a tool or the input is missing.
pub fn check_paths(ilasm: &Path, ildasm: &Path, input: &Path) -> Result<(), Failure> {
    if !ilasm.is_file() {
        return Err(anyhow!(
            "cannot find ilasm at '{}', specify it with --ilasm <PATH>",
            ilasm.display()
        ))
        .stage(Stage::FindAssembler);
    }
    if !ildasm.is_file() {
        return Err(anyhow!(
            "cannot find ildasm at '{}', specify it with --ildasm <PATH>",
            ildasm.display()
        ))
        .stage(Stage::FindDisassembler);
    }
    if !input.is_file() {
        return Err(anyhow!("cannot find input file '{}'", input.display()))
            .stage(Stage::FindInput);
    }
    Ok(())
}

/// Disassemble, rewrite every marked method, reassemble.
///
/// Works inside a fresh temporary directory that is removed on every exit path.
pub fn roundtrip(
    toolchain: &dyn Toolchain,
    rewriter: &Rewriter,
    job: &Job,
) -> Result<Vec<Splice>, Failure> {
    let dir = tempfile::Builder::new()
        .prefix("ilfunc-")
        .tempdir()
        .context("creating temporary directory")
        .stage(Stage::Io)?;

    let file_name = job
        .input
        .file_name()
        .ok_or_else(|| anyhow!("input has no file name: {}", job.input.display()))
        .stage(Stage::FindInput)?;
    let il = dir.path().join(Path::new(file_name).with_extension("il"));

    toolchain
        .disassemble(&job.input, &il)
        .with_context(|| format!("disassembling {}", job.input.display()))
        .stage(Stage::Disassemble)?;

    let text = read_il(&il).stage(Stage::Io)?;
    let plan = rewriter.plan(&text).stage(Stage::Rewrite)?;
    let rewritten = plan.apply(&text).stage(Stage::Rewrite)?;
    log::info!(
        "{}: replaced {} method bodies",
        job.input.display(),
        plan.splices.len()
    );
    write_il(&il, &rewritten).stage(Stage::Io)?;

    let res = il.with_extension("res");
    let resource = res.is_file().then_some(res);

    if let Some(keep) = &job.keep_il {
        keep_files(keep, &il, resource.as_deref()).stage(Stage::Io)?;
    }

    let assemble = AssembleJob {
        il,
        resource,
        output: job.output.clone(),
        dll: job.is_dll(),
        build: job.build,
    };
    toolchain
        .assemble(&assemble)
        .with_context(|| format!("assembling {}", job.output.display()))
        .stage(Stage::Assemble)?;

    Ok(plan.splices)
}

/// Read ildasm output, honouring whatever byte order mark it starts with.
pub fn read_il(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading IL: {}", path.display()))?;
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        return Err(anyhow!(
            "{} is not valid {}",
            path.display(),
            encoding.name()
        ));
    }
    Ok(text.into_owned())
}

/// Write IL as UTF-8 with a byte order mark, which ilasm expects for non-ASCII text.
pub fn write_il(path: &Path, text: &str) -> Result<()> {
    let mut bytes = Vec::with_capacity(text.len() + 3);
    bytes.extend_from_slice(b"\xEF\xBB\xBF");
    bytes.extend_from_slice(text.as_bytes());
    std::fs::write(path, bytes).with_context(|| format!("writing IL: {}", path.display()))
}

fn keep_files(dir: &Path, il: &Path, resource: Option<&Path>) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for file in std::iter::once(il).chain(resource) {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = dir.join(name);
        std::fs::copy(file, &target)
            .with_context(|| format!("copying {} to {}", file.display(), target.display()))?;
    }
    Ok(())
}
