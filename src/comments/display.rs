use super::model::TreeComment;

/// One rendered row of a thread listing.
#[derive(Debug, Clone, Copy)]
pub struct ThreadLine<'a> {
    /// 0 for top-level comments.
    pub depth: usize,
    pub node: &'a TreeComment,
}

/// Flatten a forest depth-first, parents before their replies.
pub fn thread_lines(roots: &[TreeComment]) -> Vec<ThreadLine<'_>> {
    let mut lines = Vec::with_capacity(count_nodes(roots));
    let mut stack: Vec<(usize, &TreeComment)> = roots.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        lines.push(ThreadLine { depth, node });
        stack.extend(node.replies.iter().rev().map(|r| (depth + 1, r)));
    }
    lines
}

/// Total number of comments in a forest, replies included.
pub fn count_nodes(roots: &[TreeComment]) -> usize {
    let mut total = 0;
    let mut stack: Vec<&TreeComment> = roots.iter().collect();
    while let Some(node) = stack.pop() {
        total += 1;
        stack.extend(node.replies.iter());
    }
    total
}

/// Short "5m ago" style label for a comment timestamp (both in epoch ms).
pub fn relative_age(created_at_ms: i64, now_ms: i64) -> String {
    if created_at_ms <= 0 {
        return "-".to_string();
    }
    let secs = (now_ms - created_at_ms).max(0) / 1000;
    match secs {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        86_400..=2_591_999 => format!("{}d ago", secs / 86_400),
        _ => format!("{}mo ago", secs / 2_592_000),
    }
}

/// Collapse whitespace and cut `text` to at most `max_chars` characters.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
