//! Sidebar menu of the console.
//!
//! The table is static: it is sorted by `order` once, on first access, and
//! never changes afterwards. Entries without an order sort after every entry
//! that declares one.

use once_cell::sync::Lazy;
use serde::Serialize;

/// One menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Matches the route name.
    pub id: &'static str,
    pub title: &'static str,
    pub path: &'static str,
    pub icon: Option<&'static str>,
    pub children: Vec<MenuItem>,
    /// Lower sorts first.
    pub order: Option<u32>,
}

impl MenuItem {
    fn entry(
        id: &'static str,
        title: &'static str,
        path: &'static str,
        icon: &'static str,
        order: u32,
    ) -> Self {
        Self {
            id,
            title,
            path,
            icon: Some(icon),
            children: Vec::new(),
            order: Some(order),
        }
    }

    /// Declared orders first, ascending; undeclared after them.
    fn sort_key(&self) -> (bool, u32) {
        (self.order.is_none(), self.order.unwrap_or(0))
    }
}

/// Sidebar entries in display order.
pub static SIDEBAR_MENUS: Lazy<Vec<MenuItem>> = Lazy::new(|| {
    sorted(vec![
        MenuItem::entry("dashboard", "Dashboard", "/", "Odometer", 0),
        MenuItem::entry("scheduled-task", "Scheduled Tasks", "/scheduled-task", "Timer", 10),
        MenuItem::entry("sys-config", "System Config", "/sys-config", "Key", 18),
        MenuItem::entry("llm-config", "LLM Config", "/llm-config", "Setting", 20),
        MenuItem::entry("llm-logs", "LLM Call Logs", "/llm-logs", "Document", 30),
    ])
});

/// Sort entries ascending by order; ties keep their declared order.
pub fn sorted(mut items: Vec<MenuItem>) -> Vec<MenuItem> {
    items.sort_by_key(MenuItem::sort_key);
    items
}

/// Menu entry for a location path.
///
/// Exact matches win; otherwise a non-root entry matches any path below it.
pub fn find_menu_by_path(path: &str) -> Option<&'static MenuItem> {
    SIDEBAR_MENUS
        .iter()
        .find(|m| m.path == path || (path != "/" && m.path != "/" && path.starts_with(m.path)))
}

pub fn find_menu_by_id(id: &str) -> Option<&'static MenuItem> {
    SIDEBAR_MENUS.iter().find(|m| m.id == id)
}
