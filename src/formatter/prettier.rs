//! External formatter backend.
//!
//! Pipes each page through a command-line formatter (prettier by default):
//!
//! ```text
//! <command…> --parser html --stdin-filepath <page> [--config <file>]
//! ```
//!
//! The program lookup on `PATH` and the check for the options file happen once,
//! on the first page, and are reused for every page after that.

use super::{FormatError, Formatter};
use std::cell::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Resolved on first use, then fixed for the rest of the run.
#[derive(Debug)]
struct Invocation {
    program: Option<PathBuf>,
    config: Option<PathBuf>,
}

/// Formats pages with an external command.
#[derive(Debug)]
pub struct Prettier {
    command: Vec<String>,
    config_path: PathBuf,
    invocation: OnceCell<Invocation>,
}

impl Prettier {
    /// `command` is the program plus leading arguments; `config_path` the
    /// options file, used only if it exists.
    pub fn new(command: Vec<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            command,
            config_path: config_path.into(),
            invocation: OnceCell::new(),
        }
    }

    fn program_name(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    fn invocation(&self) -> &Invocation {
        self.invocation.get_or_init(|| {
            let program = which::which(self.program_name()).ok();
            let config = if self.config_path.is_file() {
                debug!(config = %self.config_path.display(), "using formatter config");
                Some(self.config_path.clone())
            } else {
                warn!(
                    config = %self.config_path.display(),
                    "formatter config not found, using formatter defaults"
                );
                None
            };
            Invocation { program, config }
        })
    }

    fn build_command(&self, program: &Path, config: Option<&Path>, page: &Path) -> Command {
        let mut command = Command::new(program);
        command
            .args(self.command.iter().skip(1))
            .args(["--parser", "html", "--stdin-filepath"])
            .arg(page);
        if let Some(config) = config {
            command.arg("--config").arg(config);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Formatter for Prettier {
    fn format(&self, html: &str, path: &Path) -> Result<String, FormatError> {
        let invocation = self.invocation();
        let program = invocation
            .program
            .as_deref()
            .ok_or_else(|| FormatError::NotFound(self.program_name().to_string()))?;

        let mut child = self
            .build_command(program, invocation.config.as_deref(), path)
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("formatter stdin unavailable"))?;

        // Feed stdin from a second thread so a large page can't deadlock
        // against the child filling its stdout pipe.
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(html.as_bytes()));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("formatter stdin writer panicked")));
            (written, output)
        });
        let output = output?;

        // A formatter that exits early breaks the stdin pipe; its own status
        // and stderr say why.
        if !output.status.success() {
            return Err(FormatError::Failed {
                command: self.command.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        Ok(String::from_utf8(output.stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_program_is_not_found() {
        let prettier = Prettier::new(
            vec!["definitely-not-a-real-formatter-binary".to_string()],
            "/nonexistent/.prettierrc",
        );
        let err = prettier.format("<p>x</p>", Path::new("a.html")).unwrap_err();
        assert!(
            matches!(err, FormatError::NotFound(ref name) if name == "definitely-not-a-real-formatter-binary")
        );
    }

    #[test]
    fn config_is_resolved_once() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join(".prettierrc");
        std::fs::write(&config, "{}").unwrap();

        let prettier = Prettier::new(vec!["prettier".to_string()], &config);
        assert_eq!(prettier.invocation().config.as_deref(), Some(config.as_path()));

        // Removing the file later doesn't change the resolved invocation.
        std::fs::remove_file(&config).unwrap();
        assert_eq!(prettier.invocation().config.as_deref(), Some(config.as_path()));
    }

    #[test]
    fn command_includes_parser_and_config() {
        let prettier = Prettier::new(
            vec!["npx".to_string(), "prettier".to_string()],
            ".prettierrc",
        );
        let command = prettier.build_command(
            Path::new("/usr/bin/npx"),
            Some(Path::new("/etc/.prettierrc")),
            Path::new("site/index.html"),
        );
        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "prettier",
                "--parser",
                "html",
                "--stdin-filepath",
                "site/index.html",
                "--config",
                "/etc/.prettierrc"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_status() {
        let prettier = Prettier::new(vec!["false".to_string()], "/nonexistent/.prettierrc");
        let err = prettier.format("<p>x</p>", Path::new("a.html")).unwrap_err();
        assert!(matches!(err, FormatError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_on_large_page_reports_stderr() {
        // The command never reads stdin, so writing a page bigger than the
        // pipe buffer fails with a broken pipe.
        let prettier = Prettier::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo boom >&2; exit 3".to_string(),
            ],
            "/nonexistent/.prettierrc",
        );
        let page = format!("<p>{}</p>", "x".repeat(2 * 1024 * 1024));
        let err = prettier.format(&page, Path::new("a.html")).unwrap_err();
        match err {
            FormatError::Failed { stderr, status, .. } => {
                assert_eq!(stderr, "boom");
                assert!(status.contains('3'), "status: {status}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn output_is_taken_from_stdout() {
        // `sh -c cat` swallows the trailing formatter flags as positional
        // parameters, leaving a plain stdin echo.
        let prettier = Prettier::new(
            vec!["sh".to_string(), "-c".to_string(), "cat".to_string()],
            "/nonexistent/.prettierrc",
        );
        let html = "<p>piped</p>";
        assert_eq!(prettier.format(html, Path::new("a.html")).unwrap(), html);
    }
}
