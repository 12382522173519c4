use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildType {
    /// Neither `--debug` nor `--release`; assembled like a release build.
    #[default]
    Agnostic,
    Debug,
    Release,
}

impl BuildType {
    pub fn from_flags(debug: bool, release: bool) -> Self {
        if debug {
            BuildType::Debug
        } else if release {
            BuildType::Release
        } else {
            BuildType::Agnostic
        }
    }

    fn ilasm_flag(self) -> &'static str {
        match self {
            BuildType::Debug => "/debug",
            BuildType::Release | BuildType::Agnostic => "/debug=opt",
        }
    }
}

/// Everything ilasm needs to rebuild the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleJob {
    pub il: PathBuf,
    /// Win32 resources ildasm split off next to the `.il`, if any.
    pub resource: Option<PathBuf>,
    pub output: PathBuf,
    pub dll: bool,
    pub build: BuildType,
}

impl AssembleJob {
    pub fn args(&self) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("/highentropyva"),
            OsString::from(self.build.ilasm_flag()),
        ];
        if let Some(res) = &self.resource {
            args.push(prefixed("/resource=", res));
        }
        args.push(self.il.clone().into_os_string());
        if self.dll {
            args.push(OsString::from("/dll"));
        }
        args.push(prefixed("/output=", &self.output));
        args
    }
}

pub fn disassemble_args(input: &Path, il: &Path) -> Vec<OsString> {
    vec![
        OsString::from("/linenum"),
        OsString::from("/typelist"),
        OsString::from("/utf8"),
        OsString::from("/nobar"),
        input.as_os_str().to_owned(),
        prefixed("/out=", il),
    ]
}

fn prefixed(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_os_str());
    arg
}

/// The external programs converting between a binary and its IL text.
pub trait Toolchain {
    /// Write the disassembly of `input` to `il`.
    fn disassemble(&self, input: &Path, il: &Path) -> Result<()>;

    fn assemble(&self, job: &AssembleJob) -> Result<()>;
}

/// ildasm/ilasm from the .NET Framework SDK, run as child processes.
#[derive(Debug, Clone)]
pub struct SdkToolchain {
    pub ilasm: PathBuf,
    pub ildasm: PathBuf,
}

impl Toolchain for SdkToolchain {
    fn disassemble(&self, input: &Path, il: &Path) -> Result<()> {
        run(&self.ildasm, &disassemble_args(input, il))
    }

    fn assemble(&self, job: &AssembleJob) -> Result<()> {
        run(&self.ilasm, &job.args())
    }
}

/// Run `tool` to completion, capturing its output. A non-zero exit status is an
/// error and the captured streams are logged.
pub fn run(tool: &Path, args: &[OsString]) -> Result<()> {
    log::debug!("running {} {:?}", tool.display(), args);

    let mut command = Command::new(tool);
    command.args(args).stdin(Stdio::null());
    hide_window(&mut command);

    let output = command
        .output()
        .with_context(|| format!("starting {}", tool.display()))?;

    if !output.status.success() {
        log::error!(
            "'{}' failed with {}. Output:\n{}\nErrors:\n{}",
            tool.display(),
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        bail!("{} exited with {}", tool.display(), output.status);
    }

    Ok(())
}

#[cfg(windows)]
fn hide_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_window(_command: &mut Command) {}
