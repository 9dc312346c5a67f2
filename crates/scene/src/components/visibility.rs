/// Show/hide flag. Entities start visible.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub visible: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        Self { visible }
    }
}
