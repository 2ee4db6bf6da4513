//! Reactive rescanning. The mutation watcher only decides *whether* a batch
//! of added nodes could contain difficulty labels; the actual work is one
//! debounced rescan per burst, plus a periodic fallback for anything the
//! relevance check misses.

use crate::classify::{self, VOCABULARY};
use crate::dom::{self, DomDocument, NodeKind};

/// Delay before a mutation-triggered rescan runs. A newer relevant batch
/// inside the window restarts the timer; it is never stacked.
pub const DEBOUNCE_MS: u32 = 300;

/// Fallback rescan period, independent of mutation signals.
pub const RESCAN_INTERVAL_MS: u32 = 2000;

/// Delay of the second initial pass, for content rendered just after load.
pub const SECOND_PASS_DELAY_MS: u32 = 100;

/// Delay of the follow-up rescan scheduled after a toggle.
pub const POST_TOGGLE_RESCAN_MS: u32 = 100;

/// Added nodes with more text than this are not inspected for vocabulary
/// words; a long text blob is page content, not a label.
pub const RELEVANT_TEXT_CAP: usize = 50;

/// True when any added node in the batch may contain difficulty labels.
pub fn batch_is_relevant<D: DomDocument>(doc: &D, added: &[D::Node]) -> bool {
    added.iter().any(|node| node_is_relevant(doc, node))
}

fn node_is_relevant<D: DomDocument>(doc: &D, node: &D::Node) -> bool {
    if doc.kind(node) != NodeKind::Element {
        return false;
    }
    if classify::has_difficulty_class(&dom::class_attr(doc, node)) {
        return true;
    }
    let styled_descendant = dom::descendants(doc, node).into_iter().any(|child| {
        doc.kind(&child) == NodeKind::Element
            && classify::has_difficulty_class(&dom::class_attr(doc, &child))
    });
    if styled_descendant {
        return true;
    }
    let text = doc.text(node).to_lowercase();
    text.chars().count() <= RELEVANT_TEXT_CAP
        && VOCABULARY.iter().any(|word| text.contains(word))
}

/// Coalesces bursts of relevant batches into a single rescan. [`arm`]
/// starts (or restarts) the window and hands out a generation token;
/// [`fire`] succeeds only for the latest generation, so a stale timer
/// callback is a no-op.
///
/// [`arm`]: RescanDebounce::arm
/// [`fire`]: RescanDebounce::fire
#[derive(Debug, Default)]
pub struct RescanDebounce {
    generation: u64,
    armed: bool,
}

impl RescanDebounce {
    pub fn new() -> Self {
        RescanDebounce::default()
    }

    /// Start or restart the debounce window.
    pub fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.armed = true;
        self.generation
    }

    /// Consume the window if `generation` is still current.
    pub fn fire(&mut self, generation: u64) -> bool {
        if self.armed && generation == self.generation {
            self.armed = false;
            true
        } else {
            false
        }
    }

    /// Drop the pending window without firing.
    pub fn cancel(&mut self) {
        self.armed = false;
    }
}
