//! Task / Link provenance model
//!
//! A [`Link`] is an absolute URL plus the anchor text that discovered it. A
//! [`Task`] is one unit of crawl work: a link, the chain of ancestor tasks
//! that led to it, and its depth from the seed. The parent chain exists for
//! provenance only; it is never consulted for deduplication or cycle
//! detection (that is the frontier's job).

mod record;

pub use record::TaskRecord;

/// An absolute URL together with the anchor text that discovered it
///
/// No URL well-formedness validation happens here; a malformed URL simply
/// surfaces later as a download error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// The absolute URL
    pub url: String,

    /// Visible text of the anchor that discovered this URL (may be empty)
    pub anchor_text: String,
}

impl Link {
    /// Creates a link from a URL and its anchor text
    pub fn new(url: impl Into<String>, anchor_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anchor_text: anchor_text.into(),
        }
    }

    /// Creates a link with no anchor text (used for the seed URL)
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anchor_text: String::new(),
        }
    }
}

/// One unit of crawl work
///
/// Depth is fixed at construction: 0 for a seed, `parent.depth + 1` for a
/// discovered link. It is monotonically increasing along any parent chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    link: Link,
    parent: Option<Box<Task>>,
    depth: u32,
}

impl Task {
    /// Creates the root task for a crawl (depth 0, no parent)
    pub fn seed(link: Link) -> Self {
        Self {
            link,
            parent: None,
            depth: 0,
        }
    }

    /// Creates a task for a link discovered on `parent`'s page
    ///
    /// The task owns a full copy of its ancestor chain, so it can be
    /// serialized without any shared back-references.
    pub fn child(parent: &Task, link: Link) -> Self {
        Self {
            link,
            depth: parent.depth + 1,
            parent: Some(Box::new(parent.clone())),
        }
    }

    /// Reassembles a task from its parts (checkpoint reload)
    pub(crate) fn from_parts(link: Link, parent: Option<Box<Task>>, depth: u32) -> Self {
        Self {
            link,
            parent,
            depth,
        }
    }

    /// The task's URL
    pub fn url(&self) -> &str {
        &self.link.url
    }

    /// The anchor text that discovered this task's URL
    pub fn anchor_text(&self) -> &str {
        &self.link.anchor_text
    }

    /// The underlying link
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Depth from the seed (seed = 0)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The task whose page discovered this one, if any
    pub fn parent(&self) -> Option<&Task> {
        self.parent.as_deref()
    }
}
