/// Opaque byte asset as returned by an [`AssetLoader`](crate::AssetLoader).
///
/// A zero-sized asset means the loader could not find or read the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleAsset {
    data: Vec<u8>,
}

impl SimpleAsset {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The "not found" asset.
    pub fn empty() -> Self {
        Self { data: Vec::new() }
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for SimpleAsset {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
