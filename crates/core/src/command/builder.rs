//! Argument vector construction for project-aware tools
//!
//! Produces `tool [-P<project>] [-X<name>=<value>]... [extra]...`, the layout
//! shared by `gnatemu` and `gprbuild`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::CommandInvocation;
use crate::error::{Error, Result};

/// Builder for a single [`CommandInvocation`]
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    tool: String,
    project: Option<PathBuf>,
    scenario_variables: BTreeMap<String, String>,
    extra_args: Vec<String>,
}

impl CommandBuilder {
    /// Create a new builder for the given tool
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project: Option<PathBuf>) -> Self {
        self.project = project;
        self
    }

    pub fn with_scenario_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.scenario_variables.insert(name.into(), value.into());
        self
    }

    pub fn with_scenario_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.scenario_variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build the final invocation.
    ///
    /// Scenario variables are emitted in ascending name order so the same
    /// inputs always give the same argument vector.
    pub fn build(self) -> Result<CommandInvocation> {
        if self.tool.trim().is_empty() {
            return Err(Error::InvalidArgument("tool path is empty".to_string()));
        }

        let mut args = vec![self.tool];

        if let Some(project) = &self.project {
            args.push(format!("-P{}", project.display()));
        }

        for (name, value) in &self.scenario_variables {
            args.push(format!("-X{name}={value}"));
        }

        args.extend(self.extra_args);

        Ok(CommandInvocation::new(args))
    }
}
