use crate::config::BoundaryConfig;
use crate::error::BillParseError;
use regex::Regex;

/// A named text predicate that demotes a section header to body content
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    name: String,
    pattern: Regex,
}

impl ExclusionRule {
    pub fn new(name: &str, pattern: &str) -> Result<Self, BillParseError> {
        let pattern = Regex::new(pattern).map_err(|source| BillParseError::InvalidRulePattern {
            name: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered rule table, evaluated first to last
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    rules: Vec<ExclusionRule>,
}

impl ExclusionRules {
    /// Compile the enabled rules from config, in config order
    pub fn from_config(config: &BoundaryConfig) -> Result<Self, BillParseError> {
        let rules = config
            .exclusion_rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| ExclusionRule::new(&rule.name, &rule.pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// First rule matching `text`, if any
    pub fn first_match(&self, text: &str) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.matches(text))
    }

    pub fn is_excluded(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }
}
