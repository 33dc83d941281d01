use similar::TextDiff;

pub const ORIGINAL_LABEL: &str = "original template";
pub const PATCHED_LABEL: &str = "patched template";

/// Number of unchanged lines shown around each hunk
const CONTEXT_LINES: usize = 3;

/// Render a unified diff between the two texts and keep only the first `max_lines` lines
pub fn unified_preview(original: &str, updated: &str, max_lines: usize) -> String {
    let diff = TextDiff::from_lines(original, updated);
    let rendered = diff
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(ORIGINAL_LABEL, PATCHED_LABEL)
        .to_string();

    rendered
        .lines()
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the diff preview for the operator
pub fn print_preview(original: &str, updated: &str, max_lines: usize) {
    println!("Template diff preview:");
    println!("{}", unified_preview(original, updated, max_lines));
}
