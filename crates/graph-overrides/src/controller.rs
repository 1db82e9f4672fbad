use std::collections::HashMap;
use std::fmt;

use crate::form::{ControlMarkup, Pill};
use crate::menu::{Anchor, PopupMenu, build_category_menu, build_full_tree, flatten};
use crate::store::{ControlConfig, OverrideStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u64);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum Request {
    Init(ControlConfig),
    Add {
        option: String,
        value: Option<String>,
    },
    Update {
        option: String,
        value: Option<String>,
    },
    Remove {
        option: String,
    },
}

impl Request {
    // Unknown method names become an `Init` with the default configuration.
    pub fn from_call(method: &str, args: &[String]) -> Request {
        Self::parse_call(method, args).unwrap_or_else(|| Request::Init(ControlConfig::default()))
    }

    pub fn parse_call(method: &str, args: &[String]) -> Option<Request> {
        let option = || args.first().cloned().unwrap_or_default();
        let value = || args.get(1).cloned();
        let request = match method {
            "add" | "addOverride" => Request::Add {
                option: option(),
                value: value(),
            },
            "update" | "updateOverride" => Request::Update {
                option: option(),
                value: value(),
            },
            "remove" | "removeOverride" => Request::Remove { option: option() },
            _ => return None,
        };
        Some(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    AddTrigger,
    PillLabel(String),
    PillRemove(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Click(Target),
    KeyDown { target: Target, key: Key },
    Edit { option: String, value: String },
}

#[derive(Debug)]
pub enum ControlState {
    Mounted(ControlMarkup),
    Ready(OverrideStore),
}

#[derive(Debug, Default)]
pub struct OverrideController {
    controls: HashMap<ControlId, ControlState>,
    next_id: u64,
}

impl OverrideController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, markup: ControlMarkup) -> ControlId {
        self.next_id += 1;
        let id = ControlId(self.next_id);
        self.controls.insert(id, ControlState::Mounted(markup));
        tracing::debug!(control = %id, "control mounted");
        id
    }

    pub fn destroy(&mut self, id: ControlId) -> Option<ControlState> {
        let state = self.controls.remove(&id);
        if state.is_some() {
            tracing::debug!(control = %id, "control destroyed");
        }
        state
    }

    pub fn state(&self, id: ControlId) -> Option<&ControlState> {
        self.controls.get(&id)
    }

    pub fn store(&self, id: ControlId) -> Option<&OverrideStore> {
        match self.controls.get(&id)? {
            ControlState::Ready(store) => Some(store),
            ControlState::Mounted(_) => None,
        }
    }

    fn store_mut(&mut self, id: ControlId) -> Option<&mut OverrideStore> {
        let store = match self.controls.get_mut(&id) {
            Some(ControlState::Ready(store)) => Some(store),
            _ => None,
        };
        if store.is_none() {
            tracing::warn!(control = %id, "control is not initialized");
        }
        store
    }

    pub fn dispatch(&mut self, id: ControlId, request: Request) {
        match request {
            Request::Init(config) => self.init(id, config),
            Request::Add { option, value } => self.add_override(id, &option, value),
            Request::Update { option, value } => self.update_override(id, &option, value),
            Request::Remove { option } => self.remove_override(id, &option),
        }
    }

    pub fn init(&mut self, id: ControlId, config: ControlConfig) {
        let Some(state) = self.controls.remove(&id) else {
            tracing::warn!(control = %id, "init of unknown control");
            return;
        };
        let state = match state {
            ControlState::Mounted(markup) => {
                let store = OverrideStore::from_markup(config, markup);
                tracing::debug!(control = %id, adopted = store.len(), "control initialized");
                ControlState::Ready(store)
            }
            ready @ ControlState::Ready(_) => ready,
        };
        self.controls.insert(id, state);
    }

    pub fn add_override(&mut self, id: ControlId, option: &str, value: Option<String>) {
        if let Some(store) = self.store_mut(id) {
            store.add(option, value);
        }
    }

    pub fn update_override(&mut self, id: ControlId, option: &str, value: Option<String>) {
        if let Some(store) = self.store_mut(id) {
            store.update(option, value);
        }
    }

    pub fn remove_override(&mut self, id: ControlId, option: &str) {
        if let Some(store) = self.store_mut(id) {
            store.remove(option);
        }
    }

    pub fn handle_event(&mut self, id: ControlId, event: Event, popup: &mut dyn PopupMenu) -> bool {
        match event {
            Event::Click(Target::AddTrigger)
            | Event::KeyDown {
                target: Target::AddTrigger,
                key: Key::Enter,
            } => self.open_full_menu(id, popup),
            Event::Click(Target::PillLabel(option)) => self.open_category_menu(id, &option, popup),
            Event::Click(Target::PillRemove(option)) => {
                if self.store(id).is_some_and(|s| s.contains(&option)) {
                    self.remove_override(id, &option);
                    return true;
                }
                false
            }
            Event::Edit { option, value } => {
                if self.store(id).is_some_and(|s| s.contains(&option)) {
                    self.update_override(id, &option, Some(value));
                    return true;
                }
                false
            }
            Event::KeyDown { .. } => false,
        }
    }

    fn open_full_menu(&self, id: ControlId, popup: &mut dyn PopupMenu) -> bool {
        let Some(store) = self.store(id) else {
            return false;
        };
        if store.add_trigger().is_none() {
            return false;
        }
        let sections = build_full_tree(&store.config().menu);
        popup.open(
            flatten(id, &sections),
            Anchor::AddTrigger {
                row: store.row_id().map(str::to_string),
            },
        );
        true
    }

    fn open_category_menu(&self, id: ControlId, option: &str, popup: &mut dyn PopupMenu) -> bool {
        let Some(store) = self.store(id) else {
            return false;
        };
        // Reserved options render as a text field, which has no label to click.
        if !store
            .entry(option)
            .is_some_and(|e| matches!(e.pill, Pill::Labeled { .. }))
        {
            return false;
        }
        let Some(section) = build_category_menu(&store.config().menu, option) else {
            return false;
        };
        popup.open(
            flatten(id, std::slice::from_ref(&section)),
            Anchor::Pill {
                option: option.to_string(),
            },
        );
        true
    }
}
