//! Fan-out policies: which worker kinds to spawn for a requested count,
//! and how each variant prepares the chosen content for replay.

use ensemble_protocol::WorkerKind;

use crate::filter::extract_tool_calls_only;

/// Fan-out used when the request carries no usable count.
pub const DEFAULT_FANOUT: u32 = 3;

/// Upper bound on the number of candidate workers per run.
pub const MAX_FANOUT: u32 = 10;

/// Value object parametrizing a whole run: worker selection, replay
/// filtering, history handling, and output assembly all key off the variant.
#[derive(Debug, Clone)]
pub enum Policy {
    /// One alternate-kind worker leading (n-1) primary-kind workers, so even
    /// minimal fan-out mixes two models. n == 1 degenerates to the primary
    /// kind alone.
    Diversity {
        primary: WorkerKind,
        alternate: WorkerKind,
        selector: WorkerKind,
    },
    /// Operator-tuned ordered mix; selecting n takes the first n entries.
    /// If n exceeds the pattern length the result is silently shorter than
    /// requested (slice semantics, kept for compatibility).
    FixedPattern {
        pattern: Vec<WorkerKind>,
        selector: WorkerKind,
    },
}

impl Policy {
    /// Diversity policy with the stock worker kinds.
    pub fn diversity_default() -> Self {
        Self::Diversity {
            primary: WorkerKind::new("primary"),
            alternate: WorkerKind::new("alternate"),
            selector: WorkerKind::new("selector"),
        }
    }

    /// Fixed-pattern policy with the stock mix. The pattern is longer than
    /// [`MAX_FANOUT`] so every legal n is covered.
    pub fn fixed_pattern_default() -> Self {
        let pattern = [
            "alternate", "primary", "primary", "alternate", "primary", "primary", "alternate",
            "primary", "primary", "alternate", "primary", "primary",
        ]
        .into_iter()
        .map(WorkerKind::new)
        .collect();
        Self::FixedPattern {
            pattern,
            selector: WorkerKind::new("selector"),
        }
    }

    /// Ordered worker kinds to spawn for a requested fan-out count.
    ///
    /// A missing or zero count defaults to [`DEFAULT_FANOUT`]; anything else
    /// is clamped to [`MAX_FANOUT`].
    pub fn select_workers(&self, requested: Option<u32>) -> Vec<WorkerKind> {
        let n = effective_fanout(requested);
        match self {
            Self::Diversity {
                primary, alternate, ..
            } => {
                if n == 1 {
                    vec![primary.clone()]
                } else {
                    let mut kinds = Vec::with_capacity(n);
                    kinds.push(alternate.clone());
                    kinds.extend(std::iter::repeat_n(primary.clone(), n - 1));
                    kinds
                }
            }
            Self::FixedPattern { pattern, .. } => {
                pattern.iter().take(n).cloned().collect()
            }
        }
    }

    pub fn selector(&self) -> &WorkerKind {
        match self {
            Self::Diversity { selector, .. } | Self::FixedPattern { selector, .. } => selector,
        }
    }

    /// Whether trailing user messages are dropped from the live history
    /// before any worker spawn.
    pub fn trims_history(&self) -> bool {
        matches!(self, Self::FixedPattern { .. })
    }

    /// Reduce the chosen candidate's content to what gets replayed.
    /// Diversity keeps only fenced tool-call blocks; fixed-pattern replays
    /// the content verbatim.
    pub fn filter_for_replay(&self, content: &str) -> String {
        match self {
            Self::Diversity { .. } => extract_tool_calls_only(content),
            Self::FixedPattern { .. } => content.to_string(),
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Diversity { .. } => "diversity",
            Self::FixedPattern { .. } => "fixed_pattern",
        }
    }
}

fn effective_fanout(requested: Option<u32>) -> usize {
    match requested {
        // Zero is treated like a missing count, not clamped up to one.
        None | Some(0) => DEFAULT_FANOUT as usize,
        Some(n) => n.min(MAX_FANOUT) as usize,
    }
}
