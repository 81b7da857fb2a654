//! Prompt composition: a template pair with the example corpus pre-bound,
//! completed per request with the caller's topic, event and requirements.

use std::collections::HashMap;

use serde::Deserialize;

use crate::prompt::template::{Template, TemplateError};

/// Placeholder filled once at startup with the example corpus.
pub const EXAMPLES_VAR: &str = "examples";

#[derive(Debug, Clone)]
pub struct TemplatePair {
    pub system: Template,
    pub user: Template,
}

/// Request-specific values substituted into the bound pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeParams {
    pub topic: String,
    pub event: String,
    pub requirements: String,
}

impl RuntimeParams {
    fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("topic", self.topic.as_str()),
            ("event", self.event.as_str()),
            ("requirements", self.requirements.as_str()),
        ]
    }
}

/// The two fully substituted chat messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessages {
    pub system: String,
    pub user: String,
}

/// Templates with the example corpus already substituted. Built once at
/// startup and shared read-only by every request.
#[derive(Debug)]
pub struct BoundPipeline {
    templates: TemplatePair,
    bound: Vec<(String, String)>,
}

impl BoundPipeline {
    pub fn new(templates: TemplatePair, examples: String) -> Self {
        Self {
            templates,
            bound: vec![(EXAMPLES_VAR.to_string(), examples)],
        }
    }

    /// Placeholder names across both templates that still need a value.
    pub fn input_variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self
            .templates
            .system
            .variables()
            .into_iter()
            .chain(self.templates.user.variables())
        {
            let is_bound = self.bound.iter().any(|(key, _)| key == name);
            if !is_bound && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Renders both messages. Runtime values take precedence over bound ones.
    pub fn compose(&self, params: &RuntimeParams) -> Result<ComposedMessages, TemplateError> {
        let mut vars: HashMap<&str, &str> = self
            .bound
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        vars.extend(params.entries());

        Ok(ComposedMessages {
            system: self.templates.system.render(&vars)?,
            user: self.templates.user.render(&vars)?,
        })
    }
}
