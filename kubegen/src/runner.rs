//! Talking back to the CI runner: where the kubeconfig goes, and the workflow
//! commands that mask secrets and hand values to later steps.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const RUNNER_TEMP: &str = "RUNNER_TEMP";
pub const GITHUB_ENV: &str = "GITHUB_ENV";
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// `explicit` if given, else a timestamped file in the runner's temp
/// directory (or the system one outside a runner).
pub fn kubeconfig_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_owned();
    }
    let dir = env::var_os(RUNNER_TEMP)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir);
    dir.join(format!("kubeconfig_{}", Utc::now().timestamp_millis()))
}

/// Writes the kubeconfig readable by the owner only.
pub fn write_kubeconfig(path: &Path, contents: &str) -> Result<()> {
    let io_err = |action: &'static str| {
        move |source: io::Error| Error::Io {
            action,
            path: path.to_owned(),
            source,
        }
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(io_err("Opening kubeconfig"))?;

    // mode() only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(io_err("Restricting permissions on"))?;
    }
    file.write_all(contents.as_bytes())
        .map_err(io_err("Writing kubeconfig"))?;

    debug!(path = %path.display(), "Wrote kubeconfig");
    Ok(())
}

/// Workflow commands and the runner's file-based environment and output
/// channels. Commands go to `out`, normally stdout.
#[derive(Debug)]
pub struct Runner<W> {
    out: W,
    env_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

impl Runner<io::Stdout> {
    pub fn from_env() -> Self {
        let file = |var: &str| env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from);
        Runner {
            out: io::stdout(),
            env_file: file(GITHUB_ENV),
            output_file: file(GITHUB_OUTPUT),
        }
    }
}

impl<W: Write> Runner<W> {
    pub fn new(out: W, env_file: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
        Runner {
            out,
            env_file,
            output_file,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Ask the runner to redact `value`, line by line, from all later log output.
    pub fn add_mask(&mut self, value: &str) -> Result<()> {
        for line in value.lines().map(str::trim).filter(|l| !l.is_empty()) {
            writeln!(self.out, "::add-mask::{line}").map_err(|source| Error::Io {
                action: "Writing workflow command to",
                path: PathBuf::from("stdout"),
                source,
            })?;
        }
        Ok(())
    }

    /// Make `name=value` visible to the environment of later steps.
    pub fn export_variable(&mut self, name: &str, value: &str) -> Result<()> {
        env::set_var(name, value);
        match &self.env_file {
            Some(file) => append_key_value(file, name, value),
            None => {
                warn!(name, "{GITHUB_ENV} is not set, variable not exported");
                Ok(())
            }
        }
    }

    pub fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        match &self.output_file {
            Some(file) => append_key_value(file, name, value),
            None => {
                warn!(name, "{GITHUB_OUTPUT} is not set, output not recorded");
                Ok(())
            }
        }
    }
}

/// Appends `name<<DELIM\nvalue\nDELIM`, the form runner command files accept
/// for values that may span lines.
fn append_key_value(file: &Path, name: &str, value: &str) -> Result<()> {
    let mut delimiter = format!(
        "ghadelimiter_{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    while name.contains(&delimiter) || value.contains(&delimiter) {
        delimiter.push('_');
    }

    let io_err = |source: io::Error| Error::Io {
        action: "Appending to",
        path: file.to_owned(),
        source,
    };
    let mut f = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(file)
        .map_err(io_err)?;
    write!(f, "{name}<<{delimiter}\n{value}\n{delimiter}\n").map_err(io_err)?;
    debug!(name, file = %file.display(), "Recorded value");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = kubeconfig_path(Some(Path::new("/tmp/my-kubeconfig")));
        assert_eq!(path, Path::new("/tmp/my-kubeconfig"));
    }

    #[test]
    fn test_generated_path_is_timestamped() {
        let path = kubeconfig_path(None);
        let name = path.file_name().unwrap().to_str().unwrap();
        let millis = name.strip_prefix("kubeconfig_").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_generated_path_uses_runner_temp() {
        let previous = env::var_os(RUNNER_TEMP);
        env::set_var(RUNNER_TEMP, "/runner/tmp");
        let path = kubeconfig_path(None);
        match previous {
            Some(value) => env::set_var(RUNNER_TEMP, value),
            None => env::remove_var(RUNNER_TEMP),
        }

        assert_eq!(path.parent(), Some(Path::new("/runner/tmp")));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("kubeconfig_")));
    }

    #[test]
    fn test_add_mask_per_line() {
        let mut runner = Runner::new(Vec::new(), None, None);
        runner.add_mask("first\n\n  second  \n").unwrap();
        let out = String::from_utf8(runner.into_inner()).unwrap();
        assert_eq!(out, "::add-mask::first\n::add-mask::second\n");
    }

    #[test]
    fn test_set_output_appends() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("output");
        fs::write(&file, "earlier=1\n").unwrap();

        let mut runner = Runner::new(Vec::new(), None, Some(file.clone()));
        runner.set_output("kubeconfig-path", "/tmp/kc").unwrap();

        let written = fs::read_to_string(&file).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("earlier=1"));
        let header = lines.next().unwrap();
        let delimiter = header.strip_prefix("kubeconfig-path<<").unwrap();
        assert_eq!(lines.next(), Some("/tmp/kc"));
        assert_eq!(lines.next(), Some(delimiter));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_variable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("env");

        let mut runner = Runner::new(Vec::new(), Some(file.clone()), None);
        runner
            .export_variable("KUBEGEN_TEST_KUBECONFIG", "/runner/tmp/kubeconfig_1")
            .unwrap();

        assert_eq!(
            env::var("KUBEGEN_TEST_KUBECONFIG").unwrap(),
            "/runner/tmp/kubeconfig_1"
        );
        let written = fs::read_to_string(&file).unwrap();
        assert!(written.starts_with("KUBEGEN_TEST_KUBECONFIG<<ghadelimiter_"));
        assert!(written.contains("\n/runner/tmp/kubeconfig_1\n"));
    }

    #[test]
    fn test_missing_command_files_are_not_fatal() {
        let mut runner = Runner::new(Vec::new(), None, None);
        runner.set_output("kubeconfig-path", "/tmp/kc").unwrap();
        assert!(runner.into_inner().is_empty());
    }

    #[test]
    fn test_export_without_env_file_is_skipped() {
        let mut runner = Runner::new(Vec::new(), None, None);
        runner
            .export_variable("KUBEGEN_TEST_UNEXPORTED", "/tmp/kc")
            .unwrap();
        assert!(runner.into_inner().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_kubeconfig_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "stale contents that are longer").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_kubeconfig(&path, "apiVersion: v1\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "apiVersion: v1\n");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
