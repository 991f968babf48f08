//! Navigation input: what the user asked the timeline to follow.
//!
//! The input is caller-owned state (the page URL in a browser, CLI flags in
//! the headless driver) that the tracker reads once per tick. Precedence when
//! more than one key is set:
//!
//! | Key | Target |
//! |-----|--------|
//! | `height` | [`TrackingTarget::Height`] |
//! | `hash` | [`TrackingTarget::Hash`] |
//! | `daaScore` | [`TrackingTarget::DaaScore`] |
//! | none | [`TrackingTarget::Head`] |

use kgi_types::BlockHash;
use tracing::warn;

/// Discriminant of [`TrackingTarget`], for logs and summaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingMode {
    #[default]
    Head,
    Height,
    Hash,
    DaaScore,
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMode::Head => "head",
            TrackingMode::Height => "height",
            TrackingMode::Hash => "hash",
            TrackingMode::DaaScore => "daa_score",
        }
    }
}

impl std::fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the polling loop is following.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingTarget {
    /// The newest blocks.
    #[default]
    Head,
    Height(u64),
    Hash(BlockHash),
    DaaScore(u64),
}

impl TrackingTarget {
    pub fn mode(&self) -> TrackingMode {
        match self {
            TrackingTarget::Head => TrackingMode::Head,
            TrackingTarget::Height(_) => TrackingMode::Height,
            TrackingTarget::Hash(_) => TrackingMode::Hash,
            TrackingTarget::DaaScore(_) => TrackingMode::DaaScore,
        }
    }

    pub fn is_head(&self) -> bool {
        matches!(self, TrackingTarget::Head)
    }
}

impl std::fmt::Display for TrackingTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingTarget::Head => write!(f, "head"),
            TrackingTarget::Height(h) => write!(f, "height {h}"),
            TrackingTarget::Hash(hash) => write!(f, "hash {}", hash.short()),
            TrackingTarget::DaaScore(d) => write!(f, "daa score {d}"),
        }
    }
}

/// Caller-owned navigation keys, settable on user interaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationInput {
    pub height: Option<u64>,
    pub hash: Option<BlockHash>,
    pub daa_score: Option<u64>,
}

impl NavigationInput {
    pub fn head() -> Self {
        Self::default()
    }

    /// Resolve the keys into one target by precedence.
    pub fn target(&self) -> TrackingTarget {
        if let Some(height) = self.height {
            TrackingTarget::Height(height)
        } else if let Some(hash) = &self.hash {
            TrackingTarget::Hash(hash.clone())
        } else if let Some(daa_score) = self.daa_score {
            TrackingTarget::DaaScore(daa_score)
        } else {
            TrackingTarget::Head
        }
    }

    /// Replace every key so that [`target`](Self::target) yields `target`.
    pub fn set(&mut self, target: &TrackingTarget) {
        *self = Self::from(target.clone());
    }

    /// Parse `?height=…&hash=…&daaScore=…`.
    ///
    /// Unknown keys are ignored. Unparsable numbers are dropped with a warning
    /// so a mangled URL falls back to the next key in precedence.
    pub fn from_query(query: &str) -> Self {
        let mut input = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "height" => match value.parse() {
                    Ok(h) => input.height = Some(h),
                    Err(_) => warn!("ignoring unparsable height {value:?}"),
                },
                "hash" if !value.is_empty() => input.hash = Some(BlockHash::new(value)),
                "daaScore" => match value.parse() {
                    Ok(d) => input.daa_score = Some(d),
                    Err(_) => warn!("ignoring unparsable daaScore {value:?}"),
                },
                _ => {}
            }
        }
        input
    }

    /// Render back to a query string; empty when tracking the head.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(h) = self.height {
            parts.push(format!("height={h}"));
        }
        if let Some(hash) = &self.hash {
            parts.push(format!("hash={hash}"));
        }
        if let Some(d) = self.daa_score {
            parts.push(format!("daaScore={d}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

impl From<TrackingTarget> for NavigationInput {
    fn from(target: TrackingTarget) -> Self {
        match target {
            TrackingTarget::Head => Self::default(),
            TrackingTarget::Height(h) => Self { height: Some(h), ..Self::default() },
            TrackingTarget::Hash(hash) => Self { hash: Some(hash), ..Self::default() },
            TrackingTarget::DaaScore(d) => Self { daa_score: Some(d), ..Self::default() },
        }
    }
}
