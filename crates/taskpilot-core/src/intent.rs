//! Rule-table intent classification.
//!
//! A query is normalized and tested against [`RULES`] top to bottom. The
//! first rule whose patterns match decides the category; later rules are
//! never consulted. Several categories share vocabulary ("priority",
//! "task", "deadline"), so the row order is what disambiguates them and is
//! part of the observable behavior.
//!
//! A rule matches when any of its `patterns` is a substring of the
//! normalized query and none of its `unless` patterns is. Patterns are
//! written already normalized (lowercase, no accents).
//!
//! | # | Category | Example |
//! |---|----------|---------|
//! | 1 | [`IntentCategory::TaskContext`] | "which project does the login task belong to" |
//! | 2 | [`IntentCategory::CreateTask`] | "create a task to review the PR" |
//! | 3 | [`IntentCategory::MyTasks`] | "what are my tasks" |
//! | 4 | [`IntentCategory::Management`] | "what should I do first" |
//! | 5 | [`IntentCategory::Team`] | "who are the members of my team" |
//! | 6 | [`IntentCategory::ProjectProgress`] | "project progress" |
//! | 7 | [`IntentCategory::HowTo`] | "how do I create a task" |
//! | 8 | [`IntentCategory::Tasks`] | "tasks about the login page" |
//! | 9 | [`IntentCategory::Calendar`] | "upcoming meetings" |
//! | 10 | [`IntentCategory::Reports`] | "show me a report" |
//! | 11 | [`IntentCategory::General`] | "what can you do" |
//! | — | [`IntentCategory::Unknown`] | anything else |

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::text::normalize;

/// What kind of request a query represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    TaskContext,
    CreateTask,
    MyTasks,
    Management,
    Team,
    ProjectProgress,
    HowTo,
    Tasks,
    Calendar,
    Reports,
    General,
    Unknown,
}

impl IntentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::TaskContext => "task_context",
            IntentCategory::CreateTask => "create_task",
            IntentCategory::MyTasks => "my_tasks",
            IntentCategory::Management => "management",
            IntentCategory::Team => "team",
            IntentCategory::ProjectProgress => "project_progress",
            IntentCategory::HowTo => "how_to",
            IntentCategory::Tasks => "tasks",
            IntentCategory::Calendar => "calendar",
            IntentCategory::Reports => "reports",
            IntentCategory::General => "general",
            IntentCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub category: IntentCategory,
    pub patterns: &'static [&'static str],
    pub unless: &'static [&'static str],
}

impl IntentRule {
    pub fn matches(&self, normalized: &str) -> bool {
        self.patterns.iter().any(|p| normalized.contains(p))
            && !self.unless.iter().any(|p| normalized.contains(p))
    }
}

const HOW_TO_PATTERNS: &[&str] = &[
    "how do i",
    "how to",
    "how can i",
    "how should i",
    "guide",
    "tutorial",
    "instructions",
    "huong dan",
    "lam sao",
    "lam the nao",
    "cach tao",
    "cach su dung",
    "cach dung",
];

/// Classification table, highest priority first.
pub const RULES: &[IntentRule] = &[
    IntentRule {
        category: IntentCategory::TaskContext,
        patterns: &[
            "which project",
            "what project",
            "belongs to",
            "belong to",
            "which file",
            "what file",
            "thuoc du an",
            "thuoc project",
            "nam trong du an",
            "o du an nao",
            "file nao",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::CreateTask,
        patterns: &[
            "create a task",
            "create task",
            "create new task",
            "add a task",
            "add task",
            "new task",
            "make a task",
            "tao task",
            "tao cong viec",
            "them task",
            "them cong viec",
            "tao nhiem vu",
        ],
        unless: HOW_TO_PATTERNS,
    },
    IntentRule {
        category: IntentCategory::MyTasks,
        patterns: &[
            "my task",
            "my work",
            "my todo",
            "assigned to me",
            "do i have",
            "am i working on",
            "task cua toi",
            "viec cua toi",
            "cong viec cua toi",
            "nhiem vu cua toi",
            "toi can lam",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::Management,
        patterns: &[
            "prioritize",
            "priority",
            "priorities",
            "do first",
            "work on next",
            "suggest",
            "assign",
            "schedule",
            "plan my",
            "uu tien",
            "sap xep",
            "phan cong",
            "goi y",
            "lam truoc",
            "lich lam viec",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::Team,
        patterns: &[
            "team member",
            "members",
            "my team",
            "who is in",
            "who works",
            "colleague",
            "thanh vien",
            "nhom cua",
            "dong nghiep",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::ProjectProgress,
        patterns: &[
            "project progress",
            "progress of",
            "how far along",
            "completion rate",
            "percent complete",
            "project status",
            "tien do",
            "du an dang",
            "hoan thanh bao nhieu",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::HowTo,
        patterns: HOW_TO_PATTERNS,
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::Tasks,
        patterns: &[
            "task",
            "todo",
            "to do",
            "work item",
            "ticket",
            "cong viec",
            "nhiem vu",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::Calendar,
        patterns: &[
            "calendar",
            "event",
            "meeting",
            "deadline",
            "due date",
            "due soon",
            "upcoming",
            "this week",
            "lich",
            "su kien",
            "cuoc hop",
            "han chot",
            "sap den han",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::Reports,
        patterns: &[
            "report",
            "statistic",
            "stats",
            "summary",
            "dashboard",
            "bao cao",
            "thong ke",
            "tong ket",
        ],
        unless: &[],
    },
    IntentRule {
        category: IntentCategory::General,
        patterns: OVERVIEW_PATTERNS,
        unless: &[],
    },
];

/// Phrasings that ask about the system as a whole.
///
/// Also used by the Retriever to decide whether the designated overview
/// document may compete normally.
pub const OVERVIEW_PATTERNS: &[&str] = &[
    "overview",
    "what is this",
    "what can you do",
    "what do you do",
    "about this system",
    "about the system",
    "introduce",
    "features",
    "help",
    "tong quan",
    "gioi thieu",
    "he thong",
    "ban la ai",
    "chuc nang",
];

/// Classify raw query text.
pub fn classify(query: &str) -> IntentCategory {
    classify_normalized(&normalize(query))
}

/// Classify text that has already been passed through [`normalize`].
pub fn classify_normalized(normalized: &str) -> IntentCategory {
    if normalized.is_empty() {
        return IntentCategory::Unknown;
    }
    let category = RULES
        .iter()
        .find(|rule| rule.matches(normalized))
        .map(|rule| rule.category)
        .unwrap_or(IntentCategory::Unknown);
    debug!(query = normalized, intent = %category, "classified");
    category
}

/// Whether a normalized query asks for the system overview.
pub fn is_overview_query(normalized: &str) -> bool {
    OVERVIEW_PATTERNS.iter().any(|p| normalized.contains(p))
}
