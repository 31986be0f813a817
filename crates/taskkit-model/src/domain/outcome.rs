use serde::{Deserialize, Serialize};

/// Value-style result of a fallible async call.
///
/// Exactly one side is populated: `data` on success, `error` on failure.
/// Serialized as `{"data": ..., "error": ...}` with `null` for the empty side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T, E> {
    /// Value produced by the call, if it succeeded.
    pub data: Option<T>,
    /// Error produced by the call, if it failed.
    pub error: Option<E>,
}

impl<T, E> Outcome<T, E> {
    /// Successful outcome.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Failed outcome.
    pub fn err(error: E) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Convert back into an exception-style `Result`.
    ///
    /// Returns `None` only for a hand-built outcome with both sides empty.
    pub fn into_result(self) -> Option<Result<T, E>> {
        match (self.data, self.error) {
            (_, Some(error)) => Some(Err(error)),
            (Some(data), None) => Some(Ok(data)),
            (None, None) => None,
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(error) => Outcome::err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_result_populates_one_side() {
        let ok: Outcome<u32, String> = Ok(7).into();
        assert_eq!(ok.data, Some(7));
        assert!(ok.error.is_none());
        assert!(ok.is_ok());

        let err: Outcome<u32, String> = Err("boom".to_string()).into();
        assert!(err.data.is_none());
        assert_eq!(err.error.as_deref(), Some("boom"));
        assert!(err.is_err());
    }

    #[test]
    fn into_result_restores_shape() {
        assert_eq!(Outcome::<_, String>::ok(1).into_result(), Some(Ok(1)));
        assert_eq!(
            Outcome::<u8, _>::err("x".to_string()).into_result(),
            Some(Err("x".to_string()))
        );

        let empty: Outcome<u8, String> = Outcome {
            data: None,
            error: None,
        };
        assert_eq!(empty.into_result(), None);
    }

    #[test]
    fn serializes_with_null_side() {
        let json = serde_json::to_string(&Outcome::<u32, String>::ok(3)).unwrap();
        assert_eq!(json, r#"{"data":3,"error":null}"#);

        let json = serde_json::to_string(&Outcome::<u32, String>::err("bad".into())).unwrap();
        assert_eq!(json, r#"{"data":null,"error":"bad"}"#);
    }
}
