use std::fmt;
use std::path::{Path, PathBuf};

/// One external process launch: the program followed by its arguments.
///
/// Invocations are built once and never modified afterwards; every workflow
/// step constructs its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl CommandInvocation {
    pub(crate) fn new(args: Vec<String>) -> Self {
        Self {
            args,
            working_dir: None,
            env: Vec::new(),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// The program to launch (first element of the argument vector)
    pub fn program(&self) -> &str {
        &self.args[0]
    }

    /// Arguments passed to the program, excluding the program itself
    pub fn arguments(&self) -> &[String] {
        &self.args[1..]
    }

    /// The full argument vector, program included
    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = String::new();
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                cmd.push(' ');
            }
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(arg);
            }
        }
        cmd
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_command())
    }
}
