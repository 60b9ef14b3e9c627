pub trait Encoder {
    type Item;
    type Error: std::error::Error + 'static;

    fn encode(&self, item: &Self::Item) -> Result<Vec<u8>, Self::Error>;
}

pub trait Decoder {
    type Item;
    type Error: std::error::Error + 'static;

    /// Returns the decoded item and the number of bytes it occupied in `src`.
    fn decode(&self, src: &[u8]) -> Result<(Self::Item, usize), Self::Error>;
}
