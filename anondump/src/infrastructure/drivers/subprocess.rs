// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Client Tool Invocation
//!
//! Shared machinery for drivers that shell out to a backend's native client
//! tools (`mysql`, `mysqldump`, `psql`, `pg_dump`). Responsibilities:
//!
//! - **Fail fast**: a missing tool is detected at driver construction, not
//!   halfway through a run.
//! - **Password hygiene**: any command line that can appear in an error is
//!   rewritten to mask the password first. The secret never reaches a log
//!   sink or error chain.
//! - **Exit-code observation**: every spawned child is waited on and a
//!   nonzero exit becomes a [`AnonymizerError::Dependency`] naming the tool
//!   and never silently swallowed.

use std::process::{Child, Command, Stdio};

use anondump_domain::AnonymizerError;

const MASK: &str = "******";

/// One invocation of a client tool.
#[derive(Debug, Clone)]
pub struct ClientTool {
    tool: &'static str,
    args: Vec<String>,
    env: Vec<(String, String)>,
    secret: Option<String>,
}

impl ClientTool {
    pub fn new(tool: &'static str) -> Self {
        Self {
            tool,
            args: Vec::new(),
            env: Vec::new(),
            secret: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Marks `secret` for masking in any error-path rendering of this
    /// command.
    pub fn mask_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.secret = Some(secret);
        }
        self
    }

    /// Runs to completion, capturing stdout.
    ///
    /// # Errors
    ///
    /// [`AnonymizerError::Dependency`] when the tool is missing or exits
    /// nonzero; the message carries the masked command line and stderr.
    pub fn run_capture(&self) -> Result<String, AnonymizerError> {
        let output = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| self.spawn_error(err))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnonymizerError::dependency(
                self.tool,
                format!(
                    "`{}` exited with {}: {}",
                    self.masked_command_line(),
                    output.status,
                    self.mask(stderr.trim())
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Spawns the tool with stdin piped, for streaming a dump into it.
    /// Stderr stays attached to the terminal so client diagnostics reach
    /// the operator.
    pub fn spawn_writer(&self) -> Result<Child, AnonymizerError> {
        self.command()
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| self.spawn_error(err))
    }

    /// Spawns the tool with stdout piped, for streaming a dump out of it.
    pub fn spawn_reader(&self) -> Result<Child, AnonymizerError> {
        self.command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| self.spawn_error(err))
    }

    /// Waits for a spawned child and observes its exit code.
    pub fn finish(&self, mut child: Child) -> Result<(), AnonymizerError> {
        let status = child
            .wait()
            .map_err(|err| AnonymizerError::dependency(self.tool, format!("failed to wait for child: {}", err)))?;

        if !status.success() {
            return Err(AnonymizerError::dependency(
                self.tool,
                format!("`{}` exited with {}", self.masked_command_line(), status),
            ));
        }
        Ok(())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.tool);
        command.args(&self.args);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }

    fn spawn_error(&self, err: std::io::Error) -> AnonymizerError {
        if err.kind() == std::io::ErrorKind::NotFound {
            AnonymizerError::dependency(
                self.tool,
                format!("the '{}' client must be present in the $PATH", self.tool),
            )
        } else {
            AnonymizerError::dependency(self.tool, self.mask(&err.to_string()))
        }
    }

    fn mask(&self, text: &str) -> String {
        match &self.secret {
            Some(secret) => text.replace(secret.as_str(), MASK),
            None => text.to_string(),
        }
    }

    /// The argv rendered for error messages, password masked.
    pub fn masked_command_line(&self) -> String {
        let mut rendered = vec![self.tool.to_string()];
        rendered.extend(self.args.iter().map(|arg| self.mask(arg)));
        rendered.join(" ")
    }
}

/// Checks whether `tool` resolves on the current `$PATH`.
pub fn tool_on_path(tool: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(tool).is_file())
}

/// Fails fast with a [`AnonymizerError::Dependency`] when `tool` is not on
/// the `$PATH`.
pub fn require_tool(tool: &'static str) -> Result<(), AnonymizerError> {
    if tool_on_path(tool) {
        Ok(())
    } else {
        Err(AnonymizerError::dependency(
            tool,
            format!("the '{}' client must be present in the $PATH", tool),
        ))
    }
}

/// Shell-splits user-supplied extra tool options (`--mysql-cmd-opts` and
/// friends) into argv entries.
pub fn split_extra_opts(opts: Option<&str>) -> Result<Vec<String>, AnonymizerError> {
    match opts {
        None => Ok(Vec::new()),
        Some(raw) => shlex::split(raw).ok_or_else(|| {
            AnonymizerError::ArgumentValidation(vec![format!("unparsable tool options: {}", raw)])
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_command_line_hides_secret() {
        let tool = ClientTool::new("mysql")
            .arg("--host")
            .arg("db.internal")
            .arg("-phunter2")
            .mask_secret("hunter2");

        let rendered = tool.masked_command_line();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("-p******"));
    }

    #[test]
    fn test_empty_secret_is_not_masked() {
        let tool = ClientTool::new("mysql").arg("--verbose").mask_secret("");
        assert_eq!(tool.masked_command_line(), "mysql --verbose");
    }

    #[test]
    fn test_missing_tool_is_dependency_error() {
        let tool = ClientTool::new("definitely-not-a-real-client-tool");
        let err = tool.run_capture().unwrap_err();
        assert!(matches!(err, AnonymizerError::Dependency { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-client-tool"));
    }

    #[test]
    fn test_split_extra_opts() {
        assert_eq!(split_extra_opts(None).unwrap(), Vec::<String>::new());
        assert_eq!(
            split_extra_opts(Some("--single-transaction --column-statistics=0")).unwrap(),
            vec!["--single-transaction".to_string(), "--column-statistics=0".to_string()]
        );
        assert_eq!(
            split_extra_opts(Some("--opt 'quoted value'")).unwrap(),
            vec!["--opt".to_string(), "quoted value".to_string()]
        );
        assert!(split_extra_opts(Some("'unterminated")).is_err());
    }
}
