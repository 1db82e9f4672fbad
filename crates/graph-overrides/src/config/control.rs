use serde::Deserialize;

use super::ConfigDoc;
use crate::captions::Captions;
use crate::catalog::{Catalog, CatalogSection};
use crate::error::Result;
use crate::form::{ControlMarkup, FieldKind, FieldSelector};
use crate::naming::Naming;
use crate::store::ControlConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    #[default]
    Hidden,
    Text,
    Any,
}

impl SelectorKind {
    fn field_kind(self) -> Option<FieldKind> {
        match self {
            SelectorKind::Hidden => Some(FieldKind::Hidden),
            SelectorKind::Text => Some(FieldKind::Text),
            SelectorKind::Any => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SelectorSection {
    #[serde(default)]
    kind: SelectorKind,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlSection {
    add: Option<String>,
    naming: Option<String>,
    #[serde(default)]
    options: SelectorSection,
}

#[derive(Debug, Clone)]
pub struct ControlDocument {
    pub config: ControlConfig,
    pub markup: ControlMarkup,
}

impl ControlDocument {
    pub fn from_doc(doc: &ConfigDoc) -> Result<Self> {
        let control: ControlSection = doc.deserialize_path("control")?.unwrap_or_default();
        let sections: Vec<CatalogSection> = doc.deserialize_path("menu")?.unwrap_or_default();
        let captions: Captions = doc.deserialize_path("captions")?.unwrap_or_default();
        let markup: ControlMarkup = doc.deserialize_path("markup")?.unwrap_or_default();

        let options = FieldSelector::new(
            control.options.kind.field_kind(),
            control.options.name.as_deref(),
        )?;
        let naming = match control.naming.as_deref() {
            Some(t) => Naming::template(t)?,
            None => Naming::Identity,
        };

        let mut config = ControlConfig::default()
            .with_options(options)
            .with_menu(Catalog::new(sections))
            .with_captions(captions)
            .with_naming(naming);
        config.add = control.add;

        Ok(Self { config, markup })
    }
}
