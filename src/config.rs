use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{reserialize, YamlObject};

/// Top-level document key holding the [`TemplateConfig`] section.
pub const CONFIG_KEY: &str = "template";

/// Delimiters marking an expression inside a YAML string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub open: String,
    pub close: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        TemplateConfig {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

impl TemplateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.open.is_empty() || self.close.is_empty() {
            return Err(Error::InvalidConfig(
                "template delimiters must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the substitution pattern; group 1 is the expression source.
    pub fn pattern(&self) -> Result<regex::Regex> {
        self.validate()?;
        let pattern = format!(
            "(?s){}(.*?){}",
            regex::escape(&self.open),
            regex::escape(&self.close)
        );
        Ok(regex::Regex::new(&pattern)?)
    }
}

pub fn config_from_map(obj: &YamlObject, key: &str) -> Result<TemplateConfig> {
    let config = match obj {
        YamlObject::Map(map) => match map.get(key) {
            Some(section @ YamlObject::Map(_)) => reserialize(section)?,
            Some(_) => return Err(Error::ExpectedMap("template config section")),
            None => TemplateConfig::default(),
        },
        _ => return Err(Error::ExpectedMap("template document")),
    };
    config.validate()?;
    Ok(config)
}
