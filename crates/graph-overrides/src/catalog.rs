use serde::{Deserialize, Serialize};

use crate::path::{OptionPath, split_path};

pub const DEFAULT_CALLBACK: &str = "addOverride";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAction {
    pub callback: String,
    pub args: Vec<String>,
}

impl MenuAction {
    pub fn option(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOption {
    pub name: String,
    #[serde(default = "default_callback")]
    pub callback: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_callback() -> String {
    DEFAULT_CALLBACK.to_string()
}

impl CatalogOption {
    pub fn new(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            callback: default_callback(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn descriptor(&self) -> OptionDescriptor {
        OptionDescriptor {
            path: split_path(&self.name),
            payload: MenuAction {
                callback: self.callback.clone(),
                args: self.args.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CatalogOption>,
}

impl CatalogSection {
    pub fn new(name: impl Into<String>, options: Vec<CatalogOption>) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = OptionDescriptor> + '_ {
        self.options.iter().map(CatalogOption::descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub path: OptionPath,
    pub payload: MenuAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub sections: Vec<CatalogSection>,
}

impl Catalog {
    pub fn new(sections: Vec<CatalogSection>) -> Self {
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.options.is_empty())
    }

    pub fn offers(&self, option: &str) -> bool {
        self.sections
            .iter()
            .flat_map(|s| s.options.iter())
            .any(|o| o.args.first().map(String::as_str) == Some(option))
    }
}
