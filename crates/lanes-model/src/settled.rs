use serde::{Deserialize, Serialize};

/// Tagged outcome of a single task.
///
/// Serializes as `{"status":"fulfilled","value":..}` or `{"status":"rejected","reason":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Settled<T, E> {
    /// Task produced a value.
    Fulfilled { value: T },
    /// Task failed; the failure is kept as data.
    Rejected { reason: E },
}

impl<T, E> Settled<T, E> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settled::Fulfilled { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Settled::Rejected { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Settled::Fulfilled { value } => Some(value),
            Settled::Rejected { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&E> {
        match self {
            Settled::Fulfilled { .. } => None,
            Settled::Rejected { reason } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }
}

impl<T, E> From<Result<T, E>> for Settled<T, E> {
    fn from(outcome: Result<T, E>) -> Self {
        match outcome {
            Ok(value) => Settled::Fulfilled { value },
            Err(reason) => Settled::Rejected { reason },
        }
    }
}

impl<T, E> From<Settled<T, E>> for Result<T, E> {
    fn from(settled: Settled<T, E>) -> Self {
        match settled {
            Settled::Fulfilled { value } => Ok(value),
            Settled::Rejected { reason } => Err(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_result_tags_outcome() {
        let ok: Settled<i32, String> = Ok(5).into();
        assert!(ok.is_fulfilled());
        assert_eq!(ok.value(), Some(&5));
        assert_eq!(ok.reason(), None);

        let err: Settled<i32, String> = Err("A".to_string()).into();
        assert!(err.is_rejected());
        assert_eq!(err.reason().map(String::as_str), Some("A"));
        assert_eq!(err.into_result(), Err("A".to_string()));
    }

    #[test]
    fn serializes_with_status_tag() {
        let ok: Settled<i32, String> = Settled::Fulfilled { value: 5 };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json, serde_json::json!({"status": "fulfilled", "value": 5}));

        let err: Settled<i32, String> = Settled::Rejected {
            reason: "A".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"status": "rejected", "reason": "A"}));
    }

    #[test]
    fn deserializes_rejected_record() {
        let back: Settled<i32, String> =
            serde_json::from_str(r#"{"status":"rejected","reason":"A"}"#).unwrap();
        assert_eq!(
            back,
            Settled::Rejected {
                reason: "A".to_string()
            }
        );
    }
}
