use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Hidden,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: Option<String>,
}

impl Field {
    pub fn hidden(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Hidden,
            value,
        }
    }

    pub fn text(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            value,
        }
    }

    pub fn serialized_value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct FieldSelector {
    pub kind: Option<FieldKind>,
    pub name: Option<Regex>,
}

impl Default for FieldSelector {
    fn default() -> Self {
        Self {
            kind: Some(FieldKind::Hidden),
            name: None,
        }
    }
}

impl FieldSelector {
    pub fn new(kind: Option<FieldKind>, pattern: Option<&str>) -> Result<Self> {
        let name = pattern.map(Regex::new).transpose()?;
        Ok(Self { kind, name })
    }

    pub fn matches(&self, field: &Field) -> bool {
        if let Some(kind) = self.kind {
            if field.kind != kind {
                return false;
            }
        }
        self.name.as_ref().is_none_or(|re| re.is_match(&field.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMarkup {
    pub id: String,
    #[serde(default)]
    pub row: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMarkup {
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub triggers: Vec<TriggerMarkup>,
}

impl ControlMarkup {
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_trigger(mut self, id: &str, row: Option<&str>) -> Self {
        self.triggers.push(TriggerMarkup {
            id: id.to_string(),
            row: row.map(str::to_string),
        });
        self
    }

    pub fn trigger(&self, id: &str) -> Option<&TriggerMarkup> {
        self.triggers.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pill {
    Editable { field: Field },
    Labeled {
        option: String,
        text: String,
        field: Field,
    },
}

impl Pill {
    pub fn field(&self) -> &Field {
        match self {
            Pill::Editable { field } | Pill::Labeled { field, .. } => field,
        }
    }

    pub fn field_mut(&mut self) -> &mut Field {
        match self {
            Pill::Editable { field } | Pill::Labeled { field, .. } => field,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Pill::Editable { field } => field.serialized_value(),
            Pill::Labeled { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row<'a> {
    Pill { option: &'a str, pill: &'a Pill },
    AddTrigger { row: Option<&'a str> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selector_takes_hidden_fields() {
        let sel = FieldSelector::default();
        assert!(sel.matches(&Field::hidden("type", None)));
        assert!(!sel.matches(&Field::text("color", None)));
    }

    #[test]
    fn selector_filters_by_name_pattern() {
        let sel = FieldSelector::new(None, Some(r"^ds\[0\]")).unwrap();
        assert!(sel.matches(&Field::text("ds[0][color]", None)));
        assert!(!sel.matches(&Field::hidden("ds[1][color]", None)));
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(FieldSelector::new(None, Some("(")).is_err());
    }
}
