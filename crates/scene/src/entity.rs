use std::fmt;

use foundation::handles::Handle;

/// Identifier handed out by a renderer for each spawned primitive.
///
/// Ids are never reused within one renderer; a destroyed renderer rejects all of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(pub Handle);

impl EntityId {
    pub fn from_index(index: u32) -> Self {
        Self(Handle::new(index, 0))
    }

    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::EntityId;

    #[test]
    fn display_uses_index() {
        let id = EntityId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "entity#7");
    }
}
