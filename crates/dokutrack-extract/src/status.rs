//! Status classifier.
//!
//! Checklist cells are free text typed by hand. Two readings matter: the
//! coarse three-state [`DocStatus`] for progress rollups, and the narrow
//! [`has_check_mark`] predicate the timeline scanner uses on mark cells.

use dokutrack_core::DocStatus;

/// Classify a checklist cell into a document status.
///
/// Completion evidence is checked first: a standalone `v` token, a check
/// mark, the words "selesai" or "complete", or the literal "100". Failing
/// that, "progress"/"proses" or any positive number means work has started.
/// Everything else, including an empty cell, is not started.
///
/// The `v` rule is deliberately a whole-token match so that words merely
/// containing the letter ("david", "video") do not read as completed.
pub fn classify_status(checklist: &str) -> DocStatus {
    let text = checklist.trim().to_lowercase();
    if text.is_empty() {
        return DocStatus::NotStarted;
    }

    if text.split_whitespace().any(|token| token == "v")
        || text.contains('\u{2713}')
        || text.contains("selesai")
        || text.contains("complete")
        || text.contains("100")
    {
        return DocStatus::Completed;
    }

    if text.contains("progress")
        || text.contains("proses")
        || first_number(&text).map_or(false, |n| n > 0)
    {
        return DocStatus::InProgress;
    }

    DocStatus::NotStarted
}

/// Whether a timeline mark cell is checked. Only a lone `v`, `x`, or check
/// mark counts; this is stricter than [`classify_status`] because mark
/// cells are single-glyph by convention.
pub fn has_check_mark(cell: &str) -> bool {
    let value = cell.trim();
    value.eq_ignore_ascii_case("v") || value == "\u{2713}" || value.eq_ignore_ascii_case("x")
}

/// First run of ASCII digits in the text, as a number.
fn first_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn completed_markers() {
        assert_eq!(classify_status("v"), DocStatus::Completed);
        assert_eq!(classify_status(" V "), DocStatus::Completed);
        assert_eq!(classify_status("v ok"), DocStatus::Completed);
        assert_eq!(classify_status("\u{2713}"), DocStatus::Completed);
        assert_eq!(classify_status("selesai"), DocStatus::Completed);
        assert_eq!(classify_status("Selesai kemarin"), DocStatus::Completed);
        assert_eq!(classify_status("complete"), DocStatus::Completed);
        assert_eq!(classify_status("100"), DocStatus::Completed);
        assert_eq!(classify_status("100% selesai"), DocStatus::Completed);
    }

    #[test]
    fn embedded_v_is_not_completion() {
        assert_eq!(classify_status("david"), DocStatus::NotStarted);
        assert_eq!(classify_status("review video"), DocStatus::NotStarted);
    }

    #[test]
    fn in_progress_markers() {
        assert_eq!(classify_status("in progress"), DocStatus::InProgress);
        assert_eq!(classify_status("proses"), DocStatus::InProgress);
        assert_eq!(classify_status("sedang proses"), DocStatus::InProgress);
        assert_eq!(classify_status("75"), DocStatus::InProgress);
        assert_eq!(classify_status("50% proses"), DocStatus::InProgress);
        assert_eq!(classify_status("revisi ke 2"), DocStatus::InProgress);
    }

    #[test]
    fn not_started_markers() {
        assert_eq!(classify_status(""), DocStatus::NotStarted);
        assert_eq!(classify_status("   "), DocStatus::NotStarted);
        assert_eq!(classify_status("belum"), DocStatus::NotStarted);
        assert_eq!(classify_status("0"), DocStatus::NotStarted);
        assert_eq!(classify_status("0%"), DocStatus::NotStarted);
    }

    #[test]
    fn completion_outranks_progress_words() {
        assert_eq!(classify_status("proses 100"), DocStatus::Completed);
    }

    #[test]
    fn punctuation_breaks_the_v_token() {
        // "v," is not a standalone token, so the rest of the cell decides.
        assert_eq!(classify_status("v, revisi 2"), DocStatus::InProgress);
        assert_eq!(classify_status("v, tinggal arsip"), DocStatus::NotStarted);
    }

    #[test]
    fn check_mark_accepts_single_glyphs_only() {
        for cell in ["v", "V", "x", "X", "\u{2713}", " v ", "\tx\n"] {
            assert!(has_check_mark(cell), "{cell:?} should count as a mark");
        }
        for cell in ["", "vv", "xx", "done", "v ok", "-"] {
            assert!(!has_check_mark(cell), "{cell:?} should not count");
        }
    }
}
