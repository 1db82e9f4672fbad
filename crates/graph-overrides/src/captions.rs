use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Captions {
    options: BTreeMap<String, Caption>,
}

impl Captions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, option: &str, label: &str) -> Self {
        self.options.entry(option.to_string()).or_default().label = Some(label.to_string());
        self
    }

    pub fn with_value(mut self, option: &str, value: &str, label: &str) -> Self {
        self.options
            .entry(option.to_string())
            .or_default()
            .values
            .insert(value.to_string(), label.to_string());
        self
    }

    pub fn label<'a>(&'a self, option: &'a str) -> &'a str {
        self.options
            .get(option)
            .and_then(|c| c.label.as_deref())
            .unwrap_or(option)
    }

    pub fn value<'a>(&'a self, option: &str, value: &'a str) -> &'a str {
        self.options
            .get(option)
            .and_then(|c| c.values.get(value))
            .map(String::as_str)
            .unwrap_or(value)
    }

    pub fn display(&self, option: &str, value: Option<&str>) -> String {
        let value = value.map(|v| self.value(option, v)).unwrap_or("");
        format!("{}: {}", self.label(option), value)
    }
}
