use std::{ops::Deref, sync::Arc};

/// A message handed to a subscriber callback by a backend that delivers
/// owned samples.
///
/// A sample is copied for every subscriber except when it is fanned out to
/// several callbacks in the same dispatch, in which case they share one
/// allocation.
#[derive(Debug, Clone)]
pub enum TakenMsg<T> {
    Copied(T),
    Shared(Arc<T>),
}

impl<T> TakenMsg<T> {
    /// Returns the owned message without cloning when this subscriber is its
    /// only holder.
    pub fn get_owned(self) -> Option<T> {
        match self {
            TakenMsg::Copied(inner) => Some(inner),
            TakenMsg::Shared(shared) => Arc::try_unwrap(shared).ok(),
        }
    }

    /// Converts into the shared-pointer form (`ImagePtr`-style).
    pub fn into_shared(self) -> Arc<T> {
        match self {
            TakenMsg::Copied(inner) => Arc::new(inner),
            TakenMsg::Shared(shared) => shared,
        }
    }
}

impl<T> Deref for TakenMsg<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self {
            TakenMsg::Copied(copied) => copied,
            TakenMsg::Shared(shared) => shared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_owned() {
        assert_eq!(TakenMsg::Copied(3).get_owned(), Some(3));
        assert_eq!(TakenMsg::Shared(Arc::new(3)).get_owned(), Some(3));

        let shared = Arc::new(3);
        let _other = Arc::clone(&shared);
        assert_eq!(TakenMsg::Shared(shared).get_owned(), None);
    }

    #[test]
    fn test_deref() {
        let msg = TakenMsg::Copied(String::from("frame"));
        assert_eq!(msg.len(), 5);
        assert_eq!(*msg.into_shared(), "frame");
    }
}
