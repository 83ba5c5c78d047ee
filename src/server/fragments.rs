/// Reassembly of fragmented WebSocket messages.
///
/// Clients may split a message into a first frame and any number of
/// continuation frames. The session feeds each `Item` in here and gets the
/// whole message back once the last fragment arrives.
use actix_http::ws::Item;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("continuation frame without a preceding first fragment")]
    UnexpectedContinuation,

    #[error("new fragmented message started before the previous one ended")]
    Interleaved,

    #[error("fragmented message exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("fragmented text message is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Binary,
}

/// Buffers one in-flight fragmented message.
#[derive(Debug)]
pub struct FrameAssembler {
    partial: Option<(Kind, Vec<u8>)>,
    limit: usize,
}

impl FrameAssembler {
    pub fn new(limit: usize) -> Self {
        Self { partial: None, limit }
    }

    /// Feed one fragment. Returns the complete message after the last fragment.
    ///
    /// Any error discards the buffered message.
    pub fn push(&mut self, item: Item) -> Result<Option<Assembled>, FragmentError> {
        let result = self.accept(item);
        if result.is_err() {
            self.partial = None;
        }
        result
    }

    fn accept(&mut self, item: Item) -> Result<Option<Assembled>, FragmentError> {
        match item {
            Item::FirstText(bytes) => self.start(Kind::Text, &bytes),
            Item::FirstBinary(bytes) => self.start(Kind::Binary, &bytes),
            Item::Continue(bytes) => {
                self.extend(&bytes)?;
                Ok(None)
            }
            Item::Last(bytes) => {
                self.extend(&bytes)?;
                let Some((kind, buf)) = self.partial.take() else {
                    return Err(FragmentError::UnexpectedContinuation);
                };
                match kind {
                    Kind::Text => String::from_utf8(buf)
                        .map(|text| Some(Assembled::Text(text)))
                        .map_err(|_| FragmentError::InvalidUtf8),
                    Kind::Binary => Ok(Some(Assembled::Binary(buf))),
                }
            }
        }
    }

    fn start(&mut self, kind: Kind, bytes: &[u8]) -> Result<Option<Assembled>, FragmentError> {
        if self.partial.is_some() {
            return Err(FragmentError::Interleaved);
        }
        self.check_size(bytes.len())?;
        self.partial = Some((kind, bytes.to_vec()));
        Ok(None)
    }

    fn extend(&mut self, bytes: &[u8]) -> Result<(), FragmentError> {
        let buffered = match &self.partial {
            Some((_, buf)) => buf.len(),
            None => return Err(FragmentError::UnexpectedContinuation),
        };
        self.check_size(buffered + bytes.len())?;
        if let Some((_, buf)) = self.partial.as_mut() {
            buf.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn check_size(&self, size: usize) -> Result<(), FragmentError> {
        if size > self.limit {
            return Err(FragmentError::TooLarge { limit: self.limit });
        }
        Ok(())
    }
}
