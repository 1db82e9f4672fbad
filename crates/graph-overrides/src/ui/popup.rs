use crate::menu::{Anchor, ClickHandler, PopupItem, PopupMenu};

struct Level {
    title: String,
    items: Vec<PopupItem>,
    selected: usize,
}

#[derive(Default)]
pub struct TuiPopup {
    anchor: Option<Anchor>,
    levels: Vec<Level>,
}

pub enum PopupOutcome {
    Stay,
    Closed,
    Selected(ClickHandler),
}

impl PopupMenu for TuiPopup {
    fn open(&mut self, items: Vec<PopupItem>, anchor: Anchor) {
        let title = match &anchor {
            Anchor::AddTrigger { .. } => "Add override".to_string(),
            Anchor::Pill { option } => format!("Change {option}"),
        };
        self.levels = vec![Level {
            title,
            items,
            selected: 0,
        }];
        self.anchor = Some(anchor);
    }

    fn close(&mut self) {
        self.levels.clear();
        self.anchor = None;
    }
}

impl TuiPopup {
    pub fn is_open(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn title(&self) -> String {
        self.levels
            .iter()
            .map(|l| l.title.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    pub fn items(&self) -> &[PopupItem] {
        self.levels.last().map(|l| l.items.as_slice()).unwrap_or(&[])
    }

    pub fn selected(&self) -> usize {
        self.levels.last().map(|l| l.selected).unwrap_or(0)
    }

    pub fn move_by(&mut self, delta: isize) {
        let Some(level) = self.levels.last_mut() else {
            return;
        };
        if level.items.is_empty() {
            return;
        }
        let len = level.items.len() as isize;
        level.selected = (level.selected as isize + delta).rem_euclid(len) as usize;
    }

    pub fn activate(&mut self) -> PopupOutcome {
        let Some(level) = self.levels.last() else {
            return PopupOutcome::Closed;
        };
        match level.items.get(level.selected) {
            Some(PopupItem {
                on_click: Some(handler),
                ..
            }) => PopupOutcome::Selected(handler.clone()),
            Some(_) => self.descend(),
            None => PopupOutcome::Stay,
        }
    }

    pub fn descend(&mut self) -> PopupOutcome {
        let Some(level) = self.levels.last() else {
            return PopupOutcome::Closed;
        };
        let Some(item) = level.items.get(level.selected) else {
            return PopupOutcome::Stay;
        };
        if !item.items.is_empty() {
            let next = Level {
                title: item.label.clone(),
                items: item.items.clone(),
                selected: 0,
            };
            self.levels.push(next);
        }
        PopupOutcome::Stay
    }

    pub fn back(&mut self) -> PopupOutcome {
        self.levels.pop();
        if self.levels.is_empty() {
            self.close();
            return PopupOutcome::Closed;
        }
        PopupOutcome::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogOption, CatalogSection};
    use crate::controller::OverrideController;
    use crate::form::ControlMarkup;
    use crate::menu::{build_full_tree, flatten};

    fn open_line_menu() -> TuiPopup {
        let catalog = Catalog::new(vec![CatalogSection::new(
            "Draw",
            vec![
                CatalogOption::new("Line", &["type", "0"]),
                CatalogOption::new("Line.Dashed", &["type", "3"]),
            ],
        )]);
        let id = OverrideController::new().mount(ControlMarkup::default());
        let mut popup = TuiPopup::default();
        popup.open(
            flatten(id, &build_full_tree(&catalog)),
            Anchor::AddTrigger { row: None },
        );
        popup
    }

    fn selected_args(outcome: PopupOutcome) -> Vec<String> {
        match outcome {
            PopupOutcome::Selected(handler) => handler.action.args,
            _ => panic!("expected a selection"),
        }
    }

    #[test]
    fn section_without_action_opens_on_activate() {
        let mut popup = open_line_menu();
        assert!(matches!(popup.activate(), PopupOutcome::Stay));
        assert_eq!(popup.title(), "Add override > Draw");
        assert_eq!(popup.items()[0].label, "Line");
    }

    #[test]
    fn item_with_action_and_children_offers_both() {
        let mut popup = open_line_menu();
        popup.activate();
        assert_eq!(selected_args(popup.activate()), vec!["type", "0"]);

        popup.descend();
        assert_eq!(popup.title(), "Add override > Draw > Line");
        assert_eq!(selected_args(popup.activate()), vec!["type", "3"]);
    }
}
