//! Pure projection from result state to displayed text.

use crate::assist::ClosestDocument;

/// Snapshot of every flow's result state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Latest summary, if any.
    pub summary: Option<String>,
    /// Latest answer, if any.
    pub answer: Option<String>,
    /// Latest closest match, if any.
    pub closest: Option<ClosestDocument>,
}

/// `Summary:` block, or nothing when the summary is absent or empty.
pub fn summary_block(summary: Option<&str>) -> Option<String> {
    summary
        .filter(|text| !text.is_empty())
        .map(|text| format!("Summary:\n{text}"))
}

/// `Answer:` block, or nothing when the answer is absent or empty.
pub fn answer_block(answer: Option<&str>) -> Option<String> {
    answer
        .filter(|text| !text.is_empty())
        .map(|text| format!("Answer:\n{text}"))
}

/// `Closest Document:` block. Any returned match renders, even with an empty document.
pub fn closest_block(closest: Option<&ClosestDocument>) -> Option<String> {
    closest.map(|hit| {
        format!(
            "Closest Document:\n{}\nSimilarity: {}",
            hit.document, hit.similarity
        )
    })
}

/// Render every populated section, separated by blank lines. Absent sections are omitted.
pub fn render_view(view: &ViewState) -> String {
    [
        summary_block(view.summary.as_deref()),
        answer_block(view.answer.as_deref()),
        closest_block(view.closest.as_ref()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n\n")
}
