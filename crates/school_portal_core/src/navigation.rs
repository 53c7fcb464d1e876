//! crates/school_portal_core/src/navigation.rs
//!
//! The role-aware navigation model behind the sidebar. One capability set
//! describes which sections a sidebar variant shows; the derived items depend
//! on the viewer's head-of-department flag and advised grades.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::domain::Role;

//=========================================================================================
// Capabilities
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub icon: String,
}

impl NavLink {
    pub fn new(label: &str, href: &str, icon: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// One block of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Always shown.
    Static(NavLink),
    /// "My Classes", shown only when the viewer advises at least one grade.
    AdvisorClasses,
    /// Department pages, shown only to a head of department.
    HeadOfDepartment,
}

/// Everything that distinguishes one sidebar variant from another.
#[derive(Debug, Clone)]
pub struct SidebarCapabilities {
    pub expected_role: Role,
    pub base_path: String,
    pub login_route: String,
    pub sections: Vec<Section>,
}

impl SidebarCapabilities {
    /// The full teacher sidebar with advisory and head-of-department sections.
    pub fn teacher_portal() -> Self {
        Self {
            expected_role: Role::Teacher,
            base_path: "/teacher".to_string(),
            login_route: "/".to_string(),
            sections: vec![
                Section::Static(NavLink::new("Dashboard", "/teacher/dashboard", "home")),
                Section::Static(NavLink::new("Attendance", "/teacher/attendance", "clipboard")),
                Section::Static(NavLink::new("Timetable", "/teacher/timetable", "calendar")),
                Section::AdvisorClasses,
                Section::HeadOfDepartment,
                Section::Static(NavLink::new("Settings", "/teacher/settings", "settings")),
            ],
        }
    }

    /// The reduced variant used outside the teacher portal: static links only.
    pub fn staff_basic() -> Self {
        Self {
            expected_role: Role::Teacher,
            base_path: "/staff".to_string(),
            login_route: "/".to_string(),
            sections: vec![
                Section::Static(NavLink::new("Dashboard", "/staff/dashboard", "home")),
                Section::Static(NavLink::new("Timetable", "/staff/timetable", "calendar")),
                Section::Static(NavLink::new("Settings", "/staff/settings", "settings")),
            ],
        }
    }
}

//=========================================================================================
// Derived navigation
//=========================================================================================

/// Live-data facts about the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationInputs {
    pub is_hod: bool,
    pub advisor_grades: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl From<&NavLink> for NavItem {
    fn from(link: &NavLink) -> Self {
        Self {
            label: link.label.clone(),
            href: link.href.clone(),
            icon: link.icon.clone(),
            children: Vec::new(),
        }
    }
}

/// Assembles the sidebar entries for a capability set and the current live inputs.
pub fn build_navigation(caps: &SidebarCapabilities, inputs: &NavigationInputs) -> Vec<NavItem> {
    let mut items = Vec::new();
    for section in &caps.sections {
        match section {
            Section::Static(link) => items.push(NavItem::from(link)),
            Section::AdvisorClasses => {
                if inputs.advisor_grades.is_empty() {
                    continue;
                }
                let mut grades: Vec<&String> = inputs.advisor_grades.iter().collect();
                grades.sort_by_key(|g| (grade_number(g), g.to_string()));
                let children = grades
                    .into_iter()
                    .map(|grade| NavItem {
                        label: grade_label(grade),
                        href: format!("{}/my-classes/{}", caps.base_path, grade),
                        icon: "users".to_string(),
                        children: Vec::new(),
                    })
                    .collect();
                items.push(NavItem {
                    label: "My Classes".to_string(),
                    href: format!("{}/my-classes", caps.base_path),
                    icon: "users".to_string(),
                    children,
                });
            }
            Section::HeadOfDepartment => {
                if !inputs.is_hod {
                    continue;
                }
                items.push(NavItem {
                    label: "Department Overview".to_string(),
                    href: format!("{}/department", caps.base_path),
                    icon: "building".to_string(),
                    children: Vec::new(),
                });
                items.push(NavItem {
                    label: "Department Reports".to_string(),
                    href: format!("{}/department/reports", caps.base_path),
                    icon: "chart".to_string(),
                    children: Vec::new(),
                });
            }
        }
    }
    items
}

fn grade_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:grade[\s_-]*)?(\d+)\s*$").expect("grade pattern is valid")
    })
}

fn grade_number(raw: &str) -> Option<u32> {
    grade_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Human label for a stored grade key: `grade2` and `2` both become `Grade 2`.
pub fn grade_label(raw: &str) -> String {
    if let Some(number) = grade_number(raw) {
        return format!("Grade {}", number);
    }
    raw.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

//=========================================================================================
// Presentation
//=========================================================================================

pub const EXPANDED_WIDTH_CLASS: &str = "w-64";
pub const COLLAPSED_WIDTH_CLASS: &str = "w-20";

/// One entry as drawn. Collapsed entries carry a tooltip instead of an inline label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub href: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSidebar {
    pub collapsed: bool,
    pub width_class: String,
    pub items: Vec<RenderedItem>,
}

pub fn render(items: &[NavItem], collapsed: bool) -> RenderedSidebar {
    RenderedSidebar {
        collapsed,
        width_class: if collapsed {
            COLLAPSED_WIDTH_CLASS
        } else {
            EXPANDED_WIDTH_CLASS
        }
        .to_string(),
        items: items.iter().map(|i| render_item(i, collapsed)).collect(),
    }
}

fn render_item(item: &NavItem, collapsed: bool) -> RenderedItem {
    let (label, tooltip) = if collapsed {
        (None, Some(item.label.clone()))
    } else {
        (Some(item.label.clone()), None)
    };
    RenderedItem {
        label,
        tooltip,
        href: item.href.clone(),
        icon: item.icon.clone(),
        children: item
            .children
            .iter()
            .map(|c| render_item(c, collapsed))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(is_hod: bool, grades: &[&str]) -> NavigationInputs {
        NavigationInputs {
            is_hod,
            advisor_grades: grades.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn labels(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn grade_labels_are_normalized() {
        assert_eq!(grade_label("grade2"), "Grade 2");
        assert_eq!(grade_label("grade_10"), "Grade 10");
        assert_eq!(grade_label("Grade10"), "Grade 10");
        assert_eq!(grade_label("GRADE-07"), "Grade 7");
        assert_eq!(grade_label("7"), "Grade 7");
        assert_eq!(grade_label("kindergarten"), "Kindergarten");
        assert_eq!(grade_label("pre_school"), "Pre School");
    }

    #[test]
    fn plain_teacher_sees_only_static_links() {
        let items = build_navigation(&SidebarCapabilities::teacher_portal(), &inputs(false, &[]));
        assert_eq!(labels(&items), vec!["Dashboard", "Attendance", "Timetable", "Settings"]);
    }

    #[test]
    fn advisor_gets_one_sub_link_per_grade() {
        let items = build_navigation(
            &SidebarCapabilities::teacher_portal(),
            &inputs(false, &["grade5", "grade2"]),
        );
        let classes = items
            .iter()
            .find(|i| i.label == "My Classes")
            .expect("my classes entry");
        let child_labels: BTreeSet<&str> = classes.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(child_labels, BTreeSet::from(["Grade 2", "Grade 5"]));
        assert!(classes
            .children
            .iter()
            .any(|c| c.href == "/teacher/my-classes/grade5"));
    }

    #[test]
    fn grade_children_sort_numerically() {
        let items = build_navigation(
            &SidebarCapabilities::teacher_portal(),
            &inputs(false, &["grade10", "grade9", "grade1"]),
        );
        let classes = items.iter().find(|i| i.label == "My Classes").unwrap();
        assert_eq!(labels(&classes.children), vec!["Grade 1", "Grade 9", "Grade 10"]);
    }

    #[test]
    fn hod_entries_follow_the_flag() {
        let items = build_navigation(&SidebarCapabilities::teacher_portal(), &inputs(true, &[]));
        assert!(labels(&items).contains(&"Department Overview"));
        assert!(labels(&items).contains(&"Department Reports"));
        assert!(!labels(&items).contains(&"My Classes"));
    }

    #[test]
    fn basic_variant_ignores_live_inputs() {
        let caps = SidebarCapabilities::staff_basic();
        let items = build_navigation(&caps, &inputs(true, &["grade3"]));
        assert_eq!(labels(&items), vec!["Dashboard", "Timetable", "Settings"]);
    }

    #[test]
    fn collapsed_rendering_swaps_labels_for_tooltips() {
        let items = build_navigation(
            &SidebarCapabilities::teacher_portal(),
            &inputs(true, &["grade2"]),
        );

        let expanded = render(&items, false);
        assert_eq!(expanded.width_class, EXPANDED_WIDTH_CLASS);
        assert!(expanded.items.iter().all(|i| i.label.is_some() && i.tooltip.is_none()));

        let collapsed = render(&items, true);
        assert_eq!(collapsed.width_class, COLLAPSED_WIDTH_CLASS);
        assert!(collapsed.items.iter().all(|i| i.label.is_none() && i.tooltip.is_some()));
        assert_eq!(collapsed.items[0].tooltip.as_deref(), Some("Dashboard"));
        assert_eq!(collapsed.items.len(), expanded.items.len());
    }
}
