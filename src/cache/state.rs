use crate::application::error::ContentError;

/// Snapshot handed to consumers of a cached query.
///
/// `data` keeps the last good value even when `error` reports a failed
/// refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ContentError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> QueryState<T> {
    /// Nothing requested: no data, not loading, no error.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }

    /// Value served while a refresh is still running.
    pub fn refreshing(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: true,
            error: None,
        }
    }

    pub fn failed(error: ContentError, previous: Option<T>) -> Self {
        Self {
            data: previous,
            is_loading: false,
            error: Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        QueryState {
            data: self.data.map(f),
            is_loading: self.is_loading,
            error: self.error,
        }
    }

    /// Collapse into a result, letting a reported error win over stale data.
    pub fn into_result(self) -> Result<Option<T>, ContentError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T> QueryState<Option<T>> {
    /// Fold a "found nothing" result into an empty state.
    pub fn flatten(self) -> QueryState<T> {
        QueryState {
            data: self.data.flatten(),
            is_loading: self.is_loading,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_state_keeps_previous_value_but_reports_error() {
        let state = QueryState::failed(ContentError::fetch(Some(500), "boom"), Some(3));
        assert_eq!(state.data, Some(3));
        assert!(!state.is_loading);
        assert!(state.into_result().is_err());
    }

    #[test]
    fn idle_state_is_empty() {
        let state: QueryState<u8> = QueryState::default();
        assert_eq!(state.into_result(), Ok(None));
    }
}
