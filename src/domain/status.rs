//! Tri-state status wrappers handed to the display layer.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// Loading / error / ready, as consumed by a UI shell.
///
/// An empty-but-successful result is `Ready` with empty data, never `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewState<T> {
    Loading,
    Error { message: String },
    Ready { data: T },
}

impl<T> ViewState<T> {
    pub fn ready(data: T) -> Self {
        ViewState::Ready { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ViewState::Error {
            message: message.into(),
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => ViewState::ready(data),
            Err(e) => ViewState::error(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> ViewState<&T> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Error { message } => ViewState::Error {
                message: message.clone(),
            },
            ViewState::Ready { data } => ViewState::Ready { data },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Error { message } => ViewState::Error { message },
            ViewState::Ready { data } => ViewState::Ready { data: f(data) },
        }
    }

    /// Combine two independent inputs. An error on either side wins over
    /// loading; the result is ready only when both are.
    pub fn zip<U>(self, other: ViewState<U>) -> ViewState<(T, U)> {
        match (self, other) {
            (ViewState::Error { message }, _) | (_, ViewState::Error { message }) => {
                ViewState::Error { message }
            }
            (ViewState::Ready { data: a }, ViewState::Ready { data: b }) => {
                ViewState::Ready { data: (a, b) }
            }
            _ => ViewState::Loading,
        }
    }
}

/// A derived figure that may be undefined for the inputs given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Metric {
    Available(Decimal),
    Unavailable,
}

impl Metric {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Metric::Available(v) => Some(*v),
            Metric::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }
}

impl From<Option<Decimal>> for Metric {
    fn from(value: Option<Decimal>) -> Self {
        value.map(Metric::Available).unwrap_or(Metric::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_state_serialization() {
        let ready: ViewState<Vec<u32>> = ViewState::ready(vec![]);
        assert_eq!(
            serde_json::to_value(&ready).unwrap(),
            serde_json::json!({"status": "ready", "data": []})
        );

        let err: ViewState<u32> = ViewState::error("log fetch failed: boom");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"status": "error", "message": "log fetch failed: boom"})
        );

        let loading: ViewState<u32> = ViewState::Loading;
        assert_eq!(
            serde_json::to_value(&loading).unwrap(),
            serde_json::json!({"status": "loading"})
        );
    }

    #[test]
    fn test_zip_requires_both_ready() {
        let a: ViewState<u32> = ViewState::ready(1);
        let b: ViewState<u32> = ViewState::Loading;
        assert!(a.clone().zip(b).is_loading());

        let c: ViewState<u32> = ViewState::ready(2);
        assert_eq!(a.zip(c), ViewState::ready((1, 2)));
    }

    #[test]
    fn test_zip_error_beats_loading() {
        let a: ViewState<u32> = ViewState::Loading;
        let b: ViewState<u32> = ViewState::error("rpc down");
        assert_eq!(a.zip(b), ViewState::error("rpc down"));
    }

    #[test]
    fn test_metric_from_option() {
        assert_eq!(Metric::from(None), Metric::Unavailable);
        assert!(Metric::from(Some(Decimal::one())).is_available());
        assert_eq!(
            serde_json::to_value(Metric::Unavailable).unwrap(),
            serde_json::json!({"kind": "unavailable"})
        );
    }
}
