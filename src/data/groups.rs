//! Static community support group listings

use super::SupportGroup;

/// Support groups currently running
pub static GROUPS: [SupportGroup; 5] = [
    SupportGroup {
        id: 1,
        name: "Nutrition Support Circle",
        description: "Weekly discussions about healthy eating habits and budget meal planning",
        meeting_time: "Tuesdays 6:00 PM",
        members: 24,
        category: "nutrition",
    },
    SupportGroup {
        id: 2,
        name: "Mental Wellness Group",
        description: "Safe space to share experiences and coping strategies for mental health",
        meeting_time: "Thursdays 7:00 PM",
        members: 18,
        category: "mental-health",
    },
    SupportGroup {
        id: 3,
        name: "New Parents Support",
        description: "Connect with other new parents and share parenting tips and experiences",
        meeting_time: "Saturdays 10:00 AM",
        members: 15,
        category: "parenting",
    },
    SupportGroup {
        id: 4,
        name: "Active Seniors Club",
        description: "Fitness activities and health discussions for seniors staying active",
        meeting_time: "Mondays 2:00 PM",
        members: 32,
        category: "seniors",
    },
    SupportGroup {
        id: 5,
        name: "Diabetes Management",
        description: "Support and education for managing diabetes and blood sugar levels",
        meeting_time: "Wednesdays 6:30 PM",
        members: 21,
        category: "health-conditions",
    },
];

/// Get all support groups
pub fn all_groups() -> &'static [SupportGroup] {
    &GROUPS
}

/// Get a support group by its ID
pub fn find_group(id: u32) -> Option<&'static SupportGroup> {
    GROUPS.iter().find(|group| group.id == id)
}

/// Get the groups in a category, matching the slug case-insensitively
pub fn groups_in_category(category: &str) -> Vec<&'static SupportGroup> {
    GROUPS
        .iter()
        .filter(|group| group.category.eq_ignore_ascii_case(category))
        .collect()
}
