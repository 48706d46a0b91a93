//! External notebook converter.
//!
//! The renderer is an opaque subprocess: it receives the notebook paths, an
//! output format and an output directory, and reports failure through its
//! exit status.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument, warn};

use nbdeploy_shared::{ConverterConfig, NbDeployError, Result};

/// Result of one converter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Everything the converter wrote to stderr.
    pub stderr: String,
}

impl ConversionOutcome {
    /// A successful run with no diagnostics.
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a nonzero exit into [`NbDeployError::Converter`].
    pub fn into_result(self, program: &str) -> Result<()> {
        if self.success() {
            return Ok(());
        }
        Err(NbDeployError::Converter {
            program: program.to_string(),
            code: self.code,
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Renders a batch of notebooks into an output directory.
pub trait Converter {
    /// Program name used in logs and errors.
    fn name(&self) -> &str;

    /// Convert all `inputs` in one invocation, writing into `output_dir`.
    ///
    /// Only failures to run the tool are errors here; the tool's own verdict
    /// is carried in the outcome.
    fn convert(&self, inputs: &[PathBuf], output_dir: &Path) -> Result<ConversionOutcome>;
}

/// `jupyter nbconvert`-style command-line renderer.
#[derive(Debug, Clone)]
pub struct NbConvert {
    config: ConverterConfig,
}

impl NbConvert {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// The full argument list for one invocation.
    pub fn command_args(&self, inputs: &[PathBuf], output_dir: &Path) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.push("--to".to_string());
        args.push(self.config.format.clone());
        args.push("--output-dir".to_string());
        args.push(output_dir.to_string_lossy().to_string());
        args.extend(inputs.iter().map(|p| p.to_string_lossy().to_string()));
        args
    }
}

impl Converter for NbConvert {
    fn name(&self) -> &str {
        &self.config.program
    }

    #[instrument(skip_all, fields(program = %self.config.program, inputs = inputs.len()))]
    fn convert(&self, inputs: &[PathBuf], output_dir: &Path) -> Result<ConversionOutcome> {
        let args = self.command_args(inputs, output_dir);
        debug!(?args, "spawning converter");

        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| NbDeployError::ConverterSpawn {
                program: self.config.program.clone(),
                source: e,
            })?;

        let outcome = ConversionOutcome {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if outcome.success() {
            info!("converter finished");
        } else {
            warn!(code = ?outcome.code, "converter failed");
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nbconvert(program: &str) -> NbConvert {
        NbConvert::new(ConverterConfig {
            program: program.into(),
            ..ConverterConfig::default()
        })
    }

    #[test]
    fn builds_nbconvert_command_line() {
        let converter = NbConvert::new(ConverterConfig::default());
        let args = converter.command_args(
            &[
                PathBuf::from("notebooks/2022-a.ipynb"),
                PathBuf::from("notebooks/2022-b.ipynb"),
            ],
            Path::new("docs/_posts"),
        );
        assert_eq!(
            args,
            vec![
                "nbconvert",
                "--to",
                "html",
                "--output-dir",
                "docs/_posts",
                "notebooks/2022-a.ipynb",
                "notebooks/2022-b.ipynb",
            ]
        );
        assert_eq!(converter.name(), "jupyter");
    }

    #[test]
    fn nonzero_outcome_becomes_error() {
        let outcome = ConversionOutcome {
            code: Some(1),
            stderr: "NotJSONError: Notebook does not appear to be JSON\n".into(),
        };
        let err = outcome.into_result("jupyter").unwrap_err();
        match err {
            NbDeployError::Converter { program, code, stderr } => {
                assert_eq!(program, "jupyter");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "NotJSONError: Notebook does not appear to be JSON");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ok_outcome_is_success() {
        assert!(ConversionOutcome::ok().into_result("jupyter").is_ok());
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let converter = nbconvert("nbdeploy-test-no-such-program");
        let err = converter
            .convert(&[PathBuf::from("2022-a.ipynb")], Path::new("."))
            .unwrap_err();
        assert!(matches!(err, NbDeployError::ConverterSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_captured() {
        let ok = nbconvert("true")
            .convert(&[PathBuf::from("2022-a.ipynb")], Path::new("."))
            .unwrap();
        assert!(ok.success());

        let failed = nbconvert("false")
            .convert(&[PathBuf::from("2022-a.ipynb")], Path::new("."))
            .unwrap();
        assert_eq!(failed.code, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn stderr_is_captured() {
        let converter = NbConvert::new(ConverterConfig {
            program: "sh".into(),
            args: vec!["-c".into(), "echo render failed >&2; exit 3".into()],
            format: "html".into(),
        });
        let outcome = converter
            .convert(&[PathBuf::from("2022-a.ipynb")], Path::new("."))
            .unwrap();
        assert_eq!(outcome.code, Some(3));
        assert_eq!(outcome.stderr.trim(), "render failed");
    }
}
