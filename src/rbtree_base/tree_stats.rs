#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub size: usize,
    pub acquired: usize,
    pub released: usize,
    pub rotations: usize,
}

impl TreeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key nodes acquired and not yet released.
    pub fn live_nodes(&self) -> usize {
        self.acquired - self.released
    }
}
