#![allow(clippy::just_underscores_and_digits)]
#[macro_use]
extern crate lalrpop_util;
lalrpop_mod!(pub template);

pub mod ast;
pub mod config;
pub mod error;

pub use ast::{Expr, ExprNode, MAX_DEPTH};
pub use config::{config_from_map, TemplateConfig, CONFIG_KEY};
pub use error::{Error, Result};

use serde::{Deserialize, Serialize};

use ::std::collections::BTreeMap;
use regex::Regex;

pub type YamlMap = BTreeMap<String, YamlObject>;

// `Number` must precede `Float` so integers stay integers.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Number(i64),
    Float(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum YamlObject {
    Scalar(Scalar),
    Array(Vec<YamlObject>),
    Map(YamlMap),
}

fn eval_sum(left: &Expr, right: &Expr, depth: usize) -> Result<i64> {
    let left = eval_at(left, depth + 1)?;
    let right = eval_at(right, depth + 1)?;
    left.checked_add(right).ok_or(Error::Overflow { left, right })
}

fn eval_at(expr: &Expr, depth: usize) -> Result<i64> {
    if depth > MAX_DEPTH {
        return Err(Error::TooDeep { limit: MAX_DEPTH });
    }
    let result = match expr {
        Expr::Num(value) => *value,
        Expr::Sum(left, right) => eval_sum(left, right, depth)?,
    };
    Ok(result)
}

/// Evaluates `expr` depth-first, left operand before right.
///
/// Sums use checked `i64` addition and fail with [`Error::Overflow`]
/// instead of wrapping. Trees deeper than [`MAX_DEPTH`] fail with
/// [`Error::TooDeep`].
pub fn eval_expr(expr: &Expr) -> Result<i64> {
    eval_at(expr, 1)
}

/// Evaluates the open node form. Any `kind` outside the closed variant set
/// fails with [`Error::UnrecognizedExpressionKind`].
pub fn eval_node(node: &ExprNode) -> Result<i64> {
    eval_expr(&Expr::try_from(node)?)
}

pub fn eval_str(source: &str) -> Result<i64> {
    eval_expr(&Expr::parse(source)?)
}

pub fn eval_document(yaml: &str) -> Result<i64> {
    let node: ExprNode = serde_yaml::from_str(yaml)?;
    let value = eval_node(&node)?;
    tracing::debug!(value, "evaluated expression document");
    Ok(value)
}

/// Substitutes delimited expressions found in YAML string scalars.
#[derive(Debug, Clone)]
pub struct Templater {
    pattern: Regex,
}

impl Templater {
    pub fn new(config: &TemplateConfig) -> Result<Templater> {
        Ok(Templater {
            pattern: config.pattern()?,
        })
    }

    /// A string that is exactly one template (modulo surrounding whitespace)
    /// becomes a number; otherwise each template is replaced by its value's text.
    pub fn expand_string(&self, string: &str) -> Result<YamlObject> {
        let mut expanded = String::with_capacity(string.len());
        let mut last = 0;
        let mut sole = None;
        let mut count = 0;
        for capture in self.pattern.captures_iter(string) {
            let whole = match capture.get(0) {
                Some(m) => m,
                None => continue,
            };
            let source = &capture[1];
            let value = eval_str(source)?;
            tracing::debug!(template = source.trim(), value, "expanded template");

            expanded.push_str(&string[last..whole.start()]);
            expanded.push_str(&value.to_string());
            last = whole.end();
            count += 1;
            let bare_before = string[..whole.start()].trim().is_empty();
            let bare_after = string[whole.end()..].trim().is_empty();
            if bare_before && bare_after {
                sole = Some(value);
            }
        }
        if count == 0 {
            return Ok(YamlObject::Scalar(Scalar::String(string.to_string())));
        }
        if let (1, Some(value)) = (count, sole) {
            return Ok(YamlObject::Scalar(Scalar::Number(value)));
        }
        expanded.push_str(&string[last..]);
        Ok(YamlObject::Scalar(Scalar::String(expanded)))
    }

    pub fn expand_map(&self, map: &YamlMap) -> Result<YamlObject> {
        let mut new_map: YamlMap = BTreeMap::new();
        for (k, v) in map {
            new_map.insert(k.to_string(), self.expand(v)?);
        }
        Ok(YamlObject::Map(new_map))
    }

    pub fn expand_array(&self, array: &[YamlObject]) -> Result<YamlObject> {
        let mut new_array: Vec<YamlObject> = Vec::with_capacity(array.len());
        for v in array.iter() {
            new_array.push(self.expand(v)?);
        }
        Ok(YamlObject::Array(new_array))
    }

    pub fn expand(&self, yaml: &YamlObject) -> Result<YamlObject> {
        let result = match yaml {
            YamlObject::Scalar(scalar) => match scalar {
                Scalar::String(string) => self.expand_string(string)?,
                _ => yaml.clone(),
            },
            YamlObject::Map(map) => self.expand_map(map)?,
            YamlObject::Array(array) => self.expand_array(array)?,
        };
        Ok(result)
    }
}

/// Expands every template in a YAML document and re-emits it.
///
/// Delimiters come from the top-level [`CONFIG_KEY`] section, which is
/// dropped from the output.
pub fn expand_document(yaml: &str) -> Result<String> {
    let mut obj: YamlObject = serde_yaml::from_str(yaml)?;
    let config = match &obj {
        YamlObject::Map(_) => config_from_map(&obj, CONFIG_KEY)?,
        _ => TemplateConfig::default(),
    };
    if let YamlObject::Map(map) = &mut obj {
        map.remove(CONFIG_KEY);
    }
    let expanded = Templater::new(&config)?.expand(&obj)?;
    Ok(serde_yaml::to_string(&expanded)?)
}

pub fn reserialize<T: serde::de::DeserializeOwned>(obj: &YamlObject) -> Result<T> {
    Ok(serde_yaml::from_str(&serde_yaml::to_string(&obj)?)?)
}

#[cfg(test)]
mod property_tests;
