use serde::Serialize;

use crate::catalog::{Catalog, CatalogSection, MenuAction, OptionDescriptor};
use crate::controller::{ControlId, OverrideController, Request};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub label: String,
    pub children: Vec<MenuNode>,
    pub payload: Option<MenuAction>,
}

impl MenuNode {
    fn branch(label: &str) -> Self {
        Self {
            label: label.to_string(),
            children: Vec::new(),
            payload: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.payload.is_some()
    }

    pub fn child(&self, label: &str) -> Option<&MenuNode> {
        self.children.iter().find(|c| c.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub label: String,
    pub nodes: Vec<MenuNode>,
}

impl MenuSection {
    pub fn node(&self, label: &str) -> Option<&MenuNode> {
        self.nodes.iter().find(|n| n.label == label)
    }
}

// Nodes keep first-insertion order; nothing is sorted.
fn insert(nodes: &mut Vec<MenuNode>, ancestors: &[String], leaf: &str, payload: MenuAction) {
    match ancestors.split_first() {
        Some((head, rest)) => {
            let idx = match nodes.iter().position(|n| n.label == *head) {
                Some(idx) => idx,
                None => {
                    nodes.push(MenuNode::branch(head));
                    nodes.len() - 1
                }
            };
            insert(&mut nodes[idx].children, rest, leaf, payload);
        }
        None => {
            let node = MenuNode {
                label: leaf.to_string(),
                children: Vec::new(),
                payload: Some(payload),
            };
            match nodes.iter_mut().find(|n| n.label == leaf) {
                Some(existing) => {
                    tracing::warn!(label = leaf, "duplicate menu entry replaces earlier one");
                    *existing = node;
                }
                None => nodes.push(node),
            }
        }
    }
}

fn fold<'a>(descriptors: impl IntoIterator<Item = &'a OptionDescriptor>) -> Vec<MenuNode> {
    let mut nodes = Vec::new();
    for d in descriptors {
        insert(&mut nodes, &d.path.ancestors, &d.path.leaf, d.payload.clone());
    }
    nodes
}

fn section_descriptors(section: &CatalogSection) -> Vec<OptionDescriptor> {
    section.descriptors().collect()
}

pub fn build_full_tree(catalog: &Catalog) -> Vec<MenuSection> {
    catalog
        .sections
        .iter()
        .filter_map(|section| {
            let nodes = fold(&section_descriptors(section));
            if nodes.is_empty() {
                return None;
            }
            Some(MenuSection {
                label: section.name.clone(),
                nodes,
            })
        })
        .collect()
}

// First section offering `option` wins; its first node becomes the section.
pub fn build_category_menu(catalog: &Catalog, option: &str) -> Option<MenuSection> {
    catalog.sections.iter().find_map(|section| {
        let matching: Vec<OptionDescriptor> = section
            .descriptors()
            .filter(|d| d.payload.option() == Some(option))
            .collect();
        let mut nodes = fold(&matching);
        if nodes.is_empty() {
            return None;
        }
        let first = nodes.swap_remove(0);
        Some(MenuSection {
            label: first.label,
            nodes: first.children,
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anchor {
    AddTrigger { row: Option<String> },
    Pill { option: String },
}

pub trait PopupMenu {
    fn open(&mut self, items: Vec<PopupItem>, anchor: Anchor);
    fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickHandler {
    pub control: ControlId,
    pub action: MenuAction,
}

impl ClickHandler {
    pub fn request(&self) -> Request {
        Request::from_call(&self.action.callback, &self.action.args)
    }

    pub fn fire(&self, controller: &mut OverrideController, popup: &mut dyn PopupMenu) {
        popup.close();
        controller.dispatch(self.control, self.request());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupItem {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<PopupItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MenuAction>,
    #[serde(skip)]
    pub on_click: Option<ClickHandler>,
}

impl PopupItem {
    pub fn is_selectable(&self) -> bool {
        self.on_click.is_some()
    }
}

fn flatten_nodes(control: ControlId, nodes: &[MenuNode]) -> Vec<PopupItem> {
    nodes
        .iter()
        .map(|node| PopupItem {
            label: node.label.clone(),
            items: flatten_nodes(control, &node.children),
            data: node.payload.clone(),
            on_click: node.payload.clone().map(|action| ClickHandler { control, action }),
        })
        .collect()
}

pub fn flatten(control: ControlId, sections: &[MenuSection]) -> Vec<PopupItem> {
    sections
        .iter()
        .map(|section| PopupItem {
            label: section.label.clone(),
            items: flatten_nodes(control, &section.nodes),
            data: None,
            on_click: None,
        })
        .collect()
}
