//! Process-unique identity for scene objects.

use std::fmt;

use uuid::Uuid;

/// Identity shared by meshes, materials, scene nodes and scenes.
///
/// Two objects never share an id, even when their contents are equal, so the
/// id is what tooling (pickers, editors, tests) uses to tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
