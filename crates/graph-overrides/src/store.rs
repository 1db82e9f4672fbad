use std::fmt;
use std::rc::Rc;

use crate::captions::Captions;
use crate::catalog::Catalog;
use crate::form::{ControlMarkup, Field, FieldSelector, Pill, Row, TriggerMarkup};
use crate::naming::{BoundNaming, NameFn, Naming};

pub const RESERVED_OPTIONS: [&str; 2] = ["color", "timeshift"];

pub fn is_reserved(option: &str) -> bool {
    RESERVED_OPTIONS.contains(&option)
}

// Called after `add` or `remove` with the store in its new state.
pub type ChangeFn = Rc<dyn Fn(&OverrideStore)>;

#[derive(Clone)]
pub struct ControlConfig {
    pub options: FieldSelector,
    pub add: Option<String>,
    pub menu: Catalog,
    pub captions: Captions,
    pub naming: Naming,
    pub on_change: ChangeFn,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            options: FieldSelector::default(),
            add: None,
            menu: Catalog::default(),
            captions: Captions::default(),
            naming: Naming::Identity,
            on_change: Rc::new(|_: &OverrideStore| {}),
        }
    }
}

impl fmt::Debug for ControlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlConfig")
            .field("options", &self.options)
            .field("add", &self.add)
            .field("menu", &self.menu)
            .field("captions", &self.captions)
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

impl ControlConfig {
    pub fn with_options(mut self, options: FieldSelector) -> Self {
        self.options = options;
        self
    }

    pub fn with_add(mut self, trigger: impl Into<String>) -> Self {
        self.add = Some(trigger.into());
        self
    }

    pub fn with_menu(mut self, menu: Catalog) -> Self {
        self.menu = menu;
        self
    }

    pub fn with_captions(mut self, captions: Captions) -> Self {
        self.captions = captions;
        self
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_name_for(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        let parse_option = match &self.naming {
            Naming::Custom { parse_option, .. } => parse_option.clone(),
            _ => identity(),
        };
        self.naming = Naming::Custom {
            name_for: Rc::new(f),
            parse_option,
        };
        self
    }

    pub fn with_parse_option(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        let name_for = match &self.naming {
            Naming::Custom { name_for, .. } => name_for.clone(),
            _ => identity(),
        };
        self.naming = Naming::Custom {
            name_for,
            parse_option: Rc::new(f),
        };
        self
    }

    pub fn with_on_change(mut self, f: impl Fn(&OverrideStore) + 'static) -> Self {
        self.on_change = Rc::new(f);
        self
    }
}

fn identity() -> NameFn {
    Rc::new(|s: &str| s.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub option: String,
    pub label: String,
    pub value: Option<String>,
    pub pill: Pill,
}

pub struct OverrideStore {
    config: ControlConfig,
    naming: BoundNaming,
    trigger: Option<TriggerMarkup>,
    entries: Vec<OverrideEntry>,
    retained: Vec<Field>,
}

impl fmt::Debug for OverrideStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideStore")
            .field("trigger", &self.trigger)
            .field("entries", &self.entries)
            .field("retained", &self.retained)
            .finish_non_exhaustive()
    }
}

impl OverrideStore {
    // Adoption keeps markup order and does not fire `on_change`.
    pub fn from_markup(config: ControlConfig, markup: ControlMarkup) -> Self {
        let trigger = config
            .add
            .as_deref()
            .and_then(|id| markup.trigger(id))
            .cloned();
        let naming = config
            .naming
            .bind(trigger.as_ref().and_then(|t| t.row.as_deref()));

        let mut store = Self {
            config,
            naming,
            trigger,
            entries: Vec::new(),
            retained: Vec::new(),
        };

        for field in markup.fields {
            if !store.config.options.matches(&field) {
                store.retained.push(field);
                continue;
            }
            let option = store.naming.parse_option(&field.name);
            tracing::debug!(field = %field.name, option = %option, "adopting override field");
            store.upsert(&option, field.value);
        }
        store
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn add_trigger(&self) -> Option<&TriggerMarkup> {
        self.trigger.as_ref()
    }

    pub fn row_id(&self) -> Option<&str> {
        self.trigger.as_ref().and_then(|t| t.row.as_deref())
    }

    pub fn name_for(&self, option: &str) -> String {
        self.naming.name_for(option)
    }

    pub fn entries(&self) -> &[OverrideEntry] {
        &self.entries
    }

    pub fn entry(&self, option: &str) -> Option<&OverrideEntry> {
        self.entries.iter().find(|e| e.option == option)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.entry(option).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.entries.iter().map(|e| e.pill.field().clone()).collect()
    }

    pub fn retained_fields(&self) -> &[Field] {
        &self.retained
    }

    pub fn field_value(&self, field_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .map(|e| e.pill.field())
            .find(|f| f.name == field_name)
            .map(Field::serialized_value)
    }

    pub fn rows(&self) -> Vec<Row<'_>> {
        self.entries
            .iter()
            .map(|e| Row::Pill {
                option: &e.option,
                pill: &e.pill,
            })
            .chain(std::iter::once(Row::AddTrigger {
                row: self.row_id(),
            }))
            .collect()
    }

    pub fn add(&mut self, option: &str, value: Option<String>) {
        if self.upsert(option, value) {
            self.notify();
        }
    }

    // Never fires `on_change`.
    pub fn update(&mut self, option: &str, value: Option<String>) {
        let captions = &self.config.captions;
        let Some(entry) = self.entries.iter_mut().find(|e| e.option == option) else {
            tracing::debug!(option, "update of unset override ignored");
            return;
        };

        entry.pill.field_mut().value = value.clone();
        if let Pill::Labeled { text, .. } = &mut entry.pill {
            *text = captions.display(option, value.as_deref());
            entry.label = text.clone();
        }
        entry.value = value;
        tracing::debug!(option, "override updated");
    }

    pub fn remove(&mut self, option: &str) {
        let Some(idx) = self.entries.iter().position(|e| e.option == option) else {
            return;
        };
        self.entries.remove(idx);
        tracing::debug!(option, "override removed");
        self.notify();
    }

    fn notify(&self) {
        let on_change = Rc::clone(&self.config.on_change);
        on_change(self);
    }

    // Shared by `add` and adoption; false when the key is empty and nothing changed.
    fn upsert(&mut self, option: &str, value: Option<String>) -> bool {
        if option.is_empty() {
            tracing::warn!("ignoring override with an empty option key");
            return false;
        }
        if self.contains(option) {
            self.update(option, value);
        } else {
            self.append(option, value);
        }
        true
    }

    fn append(&mut self, option: &str, value: Option<String>) {
        let pill = self.render_pill(option, value.clone());
        let label = match &pill {
            Pill::Editable { .. } => option.to_string(),
            Pill::Labeled { text, .. } => text.clone(),
        };
        self.entries.push(OverrideEntry {
            option: option.to_string(),
            label,
            value,
            pill,
        });
        tracing::debug!(option, "override added");
    }

    fn render_pill(&self, option: &str, value: Option<String>) -> Pill {
        let name = self.naming.name_for(option);
        if is_reserved(option) {
            return Pill::Editable {
                field: Field::text(name, value),
            };
        }
        Pill::Labeled {
            option: option.to_string(),
            text: self.config.captions.display(option, value.as_deref()),
            field: Field::hidden(name, value),
        }
    }
}
