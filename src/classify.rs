/// Difficulty words as they appear in problem listings, lowercase.
pub const VOCABULARY: [&str; 4] = ["easy", "medium", "hard", "med."];

/// Class fragment the site applies to difficulty-tinted text (`text-sd-easy` etc).
pub const DIFFICULTY_CLASS_FRAGMENT: &str = "text-sd-";

/// Header cell text identifying the difficulty column, lowercase.
pub const HEADER_TEXT: &str = "difficulty";

/// How many ancestors to inspect when probing for problem-row context.
pub const MAX_ANCESTOR_DEPTH: usize = 10;

/// Longest text a genuine difficulty label may carry.
pub const MAX_LABEL_TEXT: usize = 10;

/// Longest text an element hosting a matched difficulty text node may carry.
pub const MAX_HOST_TEXT: usize = 15;

/// True when `text` (already trimmed and lowercased) is a difficulty word.
pub fn is_difficulty_word(text: &str) -> bool {
    VOCABULARY.contains(&text)
}

/// True when a class attribute suggests difficulty styling.
pub fn has_difficulty_class(class_attr: &str) -> bool {
    class_attr.contains(DIFFICULTY_CLASS_FRAGMENT) || class_attr.contains(HEADER_TEXT)
}

/// Structural snapshot of one ancestor in a candidate's parent chain.
#[derive(Debug, Clone, Default)]
pub struct AncestorView {
    pub tag: String,
    pub class_attr: String,
    /// Some descendant is an anchor linking to a problem detail page.
    pub has_problem_link: bool,
}

/// Immutable structural snapshot of a candidate element. Built once per
/// candidate from the live document; classification never touches the
/// document itself.
#[derive(Debug, Clone, Default)]
pub struct ElementView {
    /// Lowercased tag name.
    pub tag: String,
    pub class_attr: String,
    pub role: Option<String>,
    /// Raw text content, untrimmed.
    pub text: String,
    /// Parent chain, nearest first, capped at [`MAX_ANCESTOR_DEPTH`].
    pub ancestors: Vec<AncestorView>,
}

/// What a candidate element turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A difficulty label inside a problem row.
    DifficultyLabel,
    /// A table/grid header cell for the difficulty column.
    DifficultyHeader,
    /// Anything else; never touched.
    Unrelated,
}

/// Classify a structural snapshot.
///
/// A label must carry a difficulty class, read exactly as one of the
/// vocabulary words, stay short (large containers merely inheriting a
/// class stay visible), and sit inside a recognizable problem row.
pub fn classify(view: &ElementView) -> Classification {
    let text = view.text.trim();
    let lower = text.to_lowercase();

    let is_header_cell =
        view.tag == "th" || view.role.as_deref() == Some("columnheader");
    if is_header_cell && lower == HEADER_TEXT {
        return Classification::DifficultyHeader;
    }

    if has_difficulty_class(&view.class_attr)
        && is_difficulty_word(&lower)
        && text.chars().count() <= MAX_LABEL_TEXT
        && in_problem_row_context(&view.ancestors)
    {
        return Classification::DifficultyLabel;
    }

    Classification::Unrelated
}

/// Context test for the element hosting a matched difficulty text node.
/// Looser than [`classify`]: table cells qualify without a difficulty
/// class, and small containers qualify when their entire text is the
/// matched word.
pub fn accepts_text_host(view: &ElementView, word: &str) -> bool {
    let text = view.text.trim();
    if text.chars().count() > MAX_HOST_TEXT {
        return false;
    }
    if !in_problem_row_context(&view.ancestors) {
        return false;
    }
    has_difficulty_class(&view.class_attr)
        || matches!(view.tag.as_str(), "td" | "th")
        || (matches!(view.tag.as_str(), "span" | "div" | "p")
            && text.eq_ignore_ascii_case(word))
}

/// Walk the (bounded) ancestor chain looking for anything that reads as a
/// problem listing row: a table row or cell, a class name suggesting a row
/// or a problem, or a link to a problem detail page.
pub fn in_problem_row_context(ancestors: &[AncestorView]) -> bool {
    for ancestor in ancestors.iter().take(MAX_ANCESTOR_DEPTH) {
        if matches!(ancestor.tag.as_str(), "tr" | "td") {
            return true;
        }
        let classes = ancestor.class_attr.to_lowercase();
        if classes.contains("row") || classes.contains("problem") {
            return true;
        }
        if ancestor.has_problem_link {
            return true;
        }
    }
    false
}
