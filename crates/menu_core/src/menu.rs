//! Toolkit-independent menu model the controller writes visibility into.

use std::collections::BTreeMap;

use serde::Serialize;
use shared::domain::MenuItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItemState {
    pub visible: bool,
    pub enabled: bool,
    /// Toggle state for checkable items, `None` for plain actions.
    pub checked: Option<bool>,
}

impl MenuItemState {
    pub fn shown() -> Self {
        Self {
            visible: true,
            enabled: true,
            checked: None,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            enabled: false,
            checked: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Menu {
    items: BTreeMap<MenuItemId, MenuItemState>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn insert(&mut self, id: MenuItemId, state: MenuItemState) {
        self.items.insert(id, state);
    }

    pub fn item(&self, id: MenuItemId) -> Option<&MenuItemState> {
        self.items.get(&id)
    }

    /// Missing items count as hidden.
    pub fn is_visible(&self, id: MenuItemId) -> bool {
        self.items.get(&id).is_some_and(|item| item.visible)
    }

    pub fn set_visible(&mut self, id: MenuItemId, visible: bool) {
        let item = self.items.entry(id).or_insert_with(MenuItemState::hidden);
        item.visible = visible;
        item.enabled = visible;
    }

    pub fn set_checked(&mut self, id: MenuItemId, checked: Option<bool>) {
        let item = self.items.entry(id).or_insert_with(MenuItemState::hidden);
        item.checked = checked;
    }

    pub fn iter(&self) -> impl Iterator<Item = (MenuItemId, &MenuItemState)> {
        self.items.iter().map(|(id, state)| (*id, state))
    }
}
