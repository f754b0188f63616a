// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable component identity: a name unique within the supervising
//! process.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of component kinds this supervisor manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    ApiServer,
    WorkflowWorker,
    WorkflowEngine,
    AgentContainer,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentKind::ApiServer => "api-server",
            ComponentKind::WorkflowWorker => "workflow-worker",
            ComponentKind::WorkflowEngine => "workflow-engine",
            ComponentKind::AgentContainer => "agent-container",
        };
        write!(f, "{s}")
    }
}

/// A component's stable name, unique within the supervising process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_the_fixed_kebab_case_names() {
        assert_eq!(ComponentKind::ApiServer.to_string(), "api-server");
        assert_eq!(ComponentKind::WorkflowWorker.to_string(), "workflow-worker");
        assert_eq!(ComponentKind::WorkflowEngine.to_string(), "workflow-engine");
        assert_eq!(ComponentKind::AgentContainer.to_string(), "agent-container");
    }
}
