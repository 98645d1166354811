use std::cmp::Reverse;

use serde::Deserialize;

use super::model::TreeComment;

/// How top-level threads are ranked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortPolicy {
    #[serde(alias = "new", alias = "latest", alias = "recent")]
    Newest,
    #[serde(alias = "old", alias = "chronological")]
    Oldest,
    #[serde(alias = "top", alias = "likes", alias = "most-liked")]
    Popular,
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self::Newest
    }
}

impl SortPolicy {
    /// Cycle `Newest -> Oldest -> Popular -> Newest`.
    pub fn next(self) -> Self {
        match self {
            SortPolicy::Newest => SortPolicy::Oldest,
            SortPolicy::Oldest => SortPolicy::Popular,
            SortPolicy::Popular => SortPolicy::Newest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortPolicy::Newest => "Newest",
            SortPolicy::Oldest => "Oldest",
            SortPolicy::Popular => "Popular",
        }
    }
}

/// Reorder top-level threads by `policy`.
///
/// The sort is stable, and reply lists are left in chronological order.
pub fn sort_threads(mut roots: Vec<TreeComment>, policy: SortPolicy) -> Vec<TreeComment> {
    match policy {
        SortPolicy::Newest => roots.sort_by_key(|n| Reverse(n.comment.created_at)),
        SortPolicy::Oldest => roots.sort_by_key(|n| n.comment.created_at),
        SortPolicy::Popular => roots.sort_by_key(|n| Reverse(n.comment.likes_count)),
    }
    roots
}
