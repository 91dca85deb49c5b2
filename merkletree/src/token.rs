/// Everything that travels through a pipeline channel.
///
/// `Flush` asks every level to roll up its pending group and make exactly one
/// result observable at the root. `Close` shuts the level down for good. Each
/// level forwards exactly one `Flush`/`Close` per one it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Data(Vec<u8>),
    Flush,
    Close,
}

impl Token {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Token::Data(_) => "data",
            Token::Flush => "flush",
            Token::Close => "close",
        }
    }
}
