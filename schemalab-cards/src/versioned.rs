//! Generic working-draft-plus-snapshots versioning.
//!
//! An entity holds one mutable draft and an append-only list of immutable
//! snapshots numbered from 1. The pointer is either pinned to a snapshot or
//! set to the working draft.
//!
//! | From            | Operation              | To              | Dirty afterwards          |
//! |-----------------|------------------------|-----------------|---------------------------|
//! | any             | `edit`                 | unchanged       | draft ≠ pinned snapshot   |
//! | any             | `commit`               | `At(max + 1)`   | no                        |
//! | any             | `switch_to_version(v)` | `At(v)`         | no                        |
//! | any             | `switch_to_working`    | `Working`       | yes                       |
//! | any             | `revert_to_latest`     | `At(max)`       | no                        |

use chrono::{DateTime, Utc};
use schemalab_core::{CardId, LabError, LabResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which content the draft is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "version", rename_all = "snake_case")]
pub enum VersionPointer {
    /// Editing freely, not pinned to any snapshot.
    Working,
    /// Pinned to the snapshot with this version number.
    At(u32),
}

impl VersionPointer {
    /// The pinned version, if any.
    #[must_use]
    pub fn version(self) -> Option<u32> {
        match self {
            Self::Working => None,
            Self::At(v) => Some(v),
        }
    }
}

impl fmt::Display for VersionPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Working => f.write_str("working"),
            Self::At(v) => write!(f, "v{v}"),
        }
    }
}

/// Content a [`VersionedEntity`] can hold.
pub trait Draft: Clone + PartialEq {
    /// Whether `next` may replace this draft. Drafts with a variant fixed at
    /// creation refuse a `next` of another variant.
    fn admits(&self, next: &Self) -> bool {
        let _ = next;
        true
    }
}

impl Draft for String {}

/// An immutable, numbered copy of an entity's draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot<T> {
    /// Version number, starting at 1.
    pub version: u32,
    /// Draft content at commit time.
    pub content: T,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
}

/// A draft with version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedEntity<T> {
    id: CardId,
    draft: T,
    versions: Vec<VersionSnapshot<T>>,
    current: VersionPointer,
}

impl<T: Draft> VersionedEntity<T> {
    /// Create an entity whose version 1 mirrors the initial draft.
    pub fn new(draft: T) -> Self {
        Self::with_id(CardId::new(), draft)
    }

    /// Create an entity with a specific id.
    pub fn with_id(id: impl Into<CardId>, draft: T) -> Self {
        let initial = VersionSnapshot {
            version: 1,
            content: draft.clone(),
            created_at: Utc::now(),
        };
        Self {
            id: id.into(),
            draft,
            versions: vec![initial],
            current: VersionPointer::At(1),
        }
    }

    /// Entity id.
    #[must_use]
    pub fn id(&self) -> &CardId {
        &self.id
    }

    /// The working draft.
    #[must_use]
    pub fn draft(&self) -> &T {
        &self.draft
    }

    /// Where the pointer is.
    #[must_use]
    pub fn current(&self) -> VersionPointer {
        self.current
    }

    /// The pinned version, `None` when working.
    #[must_use]
    pub fn current_version(&self) -> Option<u32> {
        self.current.version()
    }

    /// All snapshots, oldest first.
    #[must_use]
    pub fn versions(&self) -> &[VersionSnapshot<T>] {
        &self.versions
    }

    /// A snapshot by number.
    #[must_use]
    pub fn version(&self, version: u32) -> Option<&VersionSnapshot<T>> {
        self.versions.iter().find(|s| s.version == version)
    }

    /// Highest version number, 0 when there are no snapshots.
    #[must_use]
    pub fn latest_version(&self) -> u32 {
        self.versions.iter().map(|s| s.version).max().unwrap_or(0)
    }

    /// Whether the draft differs from what the pointer refers to. Always true
    /// when working or when the pinned snapshot is missing.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        match self.current {
            VersionPointer::Working => true,
            VersionPointer::At(v) => self.version(v).map_or(true, |s| s.content != self.draft),
        }
    }

    /// Mutate the draft. Stored snapshots are never touched and the pointer
    /// does not move.
    ///
    /// # Errors
    ///
    /// [`LabError::DraftVariantChanged`] if the edited draft is not admitted;
    /// the draft is left as it was.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> LabResult<R> {
        let mut next = self.draft.clone();
        let out = f(&mut next);
        self.replace_draft(next)?;
        Ok(out)
    }

    /// Replace the draft wholesale.
    ///
    /// # Errors
    ///
    /// [`LabError::DraftVariantChanged`] if the draft does not admit `draft`.
    pub fn replace_draft(&mut self, draft: T) -> LabResult<()> {
        if !self.draft.admits(&draft) {
            return Err(LabError::draft_variant_changed(&self.id));
        }
        self.draft = draft;
        Ok(())
    }

    /// Mutate the draft in place. Only for edits that keep the variant.
    pub(crate) fn modify<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.draft)
    }

    /// Snapshot the draft as `latest + 1` and pin to it.
    pub fn commit(&mut self) -> u32 {
        let version = self.latest_version() + 1;
        self.versions.push(VersionSnapshot {
            version,
            content: self.draft.clone(),
            created_at: Utc::now(),
        });
        self.current = VersionPointer::At(version);
        tracing::debug!(target: "schemalab::cards", card = %self.id, version, "committed version");
        version
    }

    /// Load snapshot `version` into the draft, discarding uncommitted edits.
    ///
    /// # Errors
    ///
    /// [`LabError::VersionNotFound`] when there is no such snapshot.
    pub fn switch_to_version(&mut self, version: u32) -> LabResult<()> {
        let content = self
            .version(version)
            .map(|s| s.content.clone())
            .ok_or_else(|| LabError::version_not_found(&self.id, version))?;
        self.draft = content;
        self.current = VersionPointer::At(version);
        Ok(())
    }

    /// Unpin from any snapshot, keeping the draft as is.
    pub fn switch_to_working(&mut self) {
        self.current = VersionPointer::Working;
    }

    /// Load the newest snapshot. Returns its number.
    ///
    /// # Errors
    ///
    /// [`LabError::VersionNotFound`] when there are no snapshots at all.
    pub fn revert_to_latest(&mut self) -> LabResult<u32> {
        let latest = self.latest_version();
        self.switch_to_version(latest)?;
        Ok(latest)
    }

    /// Commit when dirty, otherwise reuse the pinned version. Either way the
    /// returned number names a snapshot equal to the current draft.
    pub fn commit_or_reuse(&mut self) -> u32 {
        match self.current {
            VersionPointer::At(v) if !self.has_unsaved_changes() => v,
            _ => self.commit(),
        }
    }
}
