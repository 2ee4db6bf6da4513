use crate::detect;
use crate::dom::{self, DomDocument, MARKER_ATTR, MARKER_VALUE, SHOW_CLASS};

/// Steady states of the visibility controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Difficulty labels are suppressed.
    Hidden,
    /// Difficulty labels are shown, host CSS overridden where needed.
    Visible,
}

impl Visibility {
    fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Visibility::Hidden
        } else {
            Visibility::Visible
        }
    }
}

/// Tags force-shown with `display: inline`; everything else gets `block`.
const INLINE_TAGS: [&str; 5] = ["span", "a", "code", "em", "strong"];

/// Owns the enabled flag for one page view and reconciles the document
/// against it. All operations run synchronously to completion; reactive
/// re-runs are scheduled by the caller (mutation watcher, timers).
pub struct HiderController<D: DomDocument> {
    doc: D,
    enabled: bool,
}

impl<D: DomDocument> HiderController<D> {
    pub fn new(doc: D, enabled: bool) -> Self {
        HiderController { doc, enabled }
    }

    /// True when labels are (supposed to be) hidden.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_enabled(self.enabled)
    }

    pub fn doc(&self) -> &D {
        &self.doc
    }

    /// Reconcile the document with the current state.
    pub fn apply(&self) {
        match self.visibility() {
            Visibility::Hidden => self.hide_labels(),
            Visibility::Visible => self.show_labels(),
        }
    }

    /// Flip the state, apply it, and return the new enabled flag.
    /// Persistence and the follow-up rescan belong to the caller.
    pub fn toggle(&mut self) -> bool {
        let from = self.visibility();
        self.enabled = !self.enabled;
        log::info!("{from:?} -> {:?}", self.visibility());
        self.apply();
        self.enabled
    }

    /// Re-run the suppression pipeline. No-op while labels are visible.
    pub fn rescan(&self) {
        if self.enabled {
            self.hide_labels();
        }
    }

    /// The full suppression pipeline: drop any forced-visible overrides
    /// from a prior visible pass, then collect candidates from every
    /// detection strategy and suppress them.
    fn hide_labels(&self) {
        self.clear_forced_visible();
        let candidates = detect::collect_all(&self.doc);
        let count = candidates.len();
        for node in &candidates {
            dom::suppress(&self.doc, node);
        }
        log::debug!("suppressed {count} difficulty elements");
    }

    /// Reverse suppression. Only marked elements are restored; anything
    /// else that is hidden belongs to the host page. Difficulty-styled
    /// elements additionally get a forced-visible override in case host
    /// CSS hides them on its own.
    fn show_labels(&self) {
        let marked = match self.doc.query(&format!("[{MARKER_ATTR}=\"{MARKER_VALUE}\"]")) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("cannot enumerate suppressed elements: {e}");
                Vec::new()
            }
        };
        let count = marked.len();
        for node in &marked {
            dom::restore(&self.doc, node);
        }

        match self.doc.query("[class*=\"text-sd-\"]") {
            Ok(nodes) => {
                for node in &nodes {
                    self.doc.add_class(node, SHOW_CLASS);
                    let display = if INLINE_TAGS.contains(&self.doc.tag(node).as_str()) {
                        "inline"
                    } else {
                        "block"
                    };
                    self.doc.set_style(node, "display", display);
                    self.doc.set_style(node, "visibility", "visible");
                }
            }
            Err(e) => log::warn!("cannot force-show difficulty elements: {e}"),
        }
        log::debug!("restored {count} difficulty elements");
    }

    /// Undo the forced-visible overrides so they cannot fight suppression.
    fn clear_forced_visible(&self) {
        let shown = match self.doc.query(&format!(".{SHOW_CLASS}")) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("cannot enumerate forced-visible elements: {e}");
                return;
            }
        };
        for node in &shown {
            self.doc.remove_class(node, SHOW_CLASS);
            self.doc.set_style(node, "display", "");
            self.doc.set_style(node, "visibility", "");
        }
    }
}
