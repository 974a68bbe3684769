//! Converting failing code into outcome values.
//!
//! This is the one place where failures stop travelling as `Err`/panics and
//! become plain data: `Err(e)` and panic payloads both land in `Error`.
//! A result that cannot be serialized is not a failure of the callback and
//! is reported as `ValueError::Payload` instead.
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use serde::Serialize;
use serde_json::Value;

use super::Outcome;
use crate::error::ValueError;
use crate::value::EnumValue;

impl Outcome {
    /// Runs `f` once: `Ok(t)` becomes `Ok{value: t}`, `Err(e)` and panics
    /// become `Error{error}`.
    pub fn attempt<F, T, E>(&self, f: F) -> Result<EnumValue, ValueError>
    where
        F: FnOnce() -> Result<T, E>,
        T: Serialize,
        E: Serialize,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => self.settle(result),
            Err(payload) => Ok(self.error(panic_payload(payload))),
        }
    }

    /// `attempt` for callbacks that can only fail by panicking.
    pub fn capture<F, T>(&self, f: F) -> Result<EnumValue, ValueError>
    where
        F: FnOnce() -> T,
        T: Serialize,
    {
        self.attempt(|| Ok::<T, Value>(f()))
    }

    /// Async `attempt`: the returned future settles to the same variants and
    /// never propagates the failure. Panics while creating or polling the
    /// future are captured too.
    pub fn attempt_async<F, Fut, T, E>(&self, f: F) -> Attempted<Fut>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Serialize,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(future) => Attempted::Running { future, outcome: self.clone() },
            Err(payload) => Attempted::Settled {
                value: Some(Ok(self.error(panic_payload(payload)))),
            },
        }
    }

    fn settle<T: Serialize, E: Serialize>(
        &self,
        result: Result<T, E>,
    ) -> Result<EnumValue, ValueError> {
        Ok(match result {
            Ok(value) => self.ok(to_payload(value)?),
            Err(error) => self.error(to_payload(error)?),
        })
    }
}

/// Future returned by [`Outcome::attempt_async`].
///
/// # Panics
/// Polling again after it returned `Ready`.
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project::pin_project(project = AttemptedProj)]
pub enum Attempted<Fut> {
    Running {
        #[pin]
        future: Fut,
        outcome: Outcome,
    },
    Settled {
        value: Option<Result<EnumValue, ValueError>>,
    },
}

impl<Fut, T, E> Future for Attempted<Fut>
where
    Fut: Future<Output = Result<T, E>>,
    T: Serialize,
    E: Serialize,
{
    type Output = Result<EnumValue, ValueError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let settled = match self.as_mut().project() {
            AttemptedProj::Settled { value } => {
                return Poll::Ready(value.take().expect("`Attempted` polled after completion"));
            }
            AttemptedProj::Running { future, outcome } => {
                match panic::catch_unwind(AssertUnwindSafe(|| future.poll(cx))) {
                    Ok(Poll::Pending) => return Poll::Pending,
                    Ok(Poll::Ready(result)) => outcome.settle(result),
                    Err(payload) => Ok(outcome.error(panic_payload(payload))),
                }
            }
        };
        self.set(Attempted::Settled { value: None });
        Poll::Ready(settled)
    }
}

fn to_payload<P: Serialize>(payload: P) -> Result<Value, ValueError> {
    serde_json::to_value(payload).map_err(|err| ValueError::Payload { message: err.to_string() })
}

fn panic_payload(payload: Box<dyn Any + Send>) -> Value {
    if let Some(s) = payload.downcast_ref::<&str>() {
        Value::from(*s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        Value::from(s.as_str())
    } else {
        Value::from("panic")
    }
}

pub fn attempt<F, T, E>(f: F) -> Result<EnumValue, ValueError>
where
    F: FnOnce() -> Result<T, E>,
    T: Serialize,
    E: Serialize,
{
    Outcome::default().attempt(f)
}

pub fn capture<F, T>(f: F) -> Result<EnumValue, ValueError>
where
    F: FnOnce() -> T,
    T: Serialize,
{
    Outcome::default().capture(f)
}

pub fn attempt_async<F, Fut, T, E>(f: F) -> Attempted<Fut>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: Serialize,
    E: Serialize,
{
    Outcome::default().attempt_async(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn sync_value_and_error() {
        assert_eq!(
            attempt(|| Ok::<_, String>(42)).unwrap().into_json(),
            json!({"_type": "Ok", "value": 42})
        );
        assert_eq!(
            attempt(|| Err::<i32, _>("boom")).unwrap().into_json(),
            json!({"_type": "Error", "error": "boom"})
        );
    }

    #[test]
    fn panics_become_errors() {
        let v = capture(|| -> i32 { panic!("boom") });
        assert_eq!(v.unwrap().into_json(), json!({"_type": "Error", "error": "boom"}));
        let v = capture(|| -> i32 { panic!("code {}", 7) });
        assert_eq!(v.unwrap().into_json(), json!({"_type": "Error", "error": "code 7"}));
        assert_eq!(capture(|| "fine").unwrap().into_json(), json!({"_type": "Ok", "value": "fine"}));
    }

    #[test]
    fn parse_errors_as_payloads() {
        let v = attempt(|| serde_json::from_str::<Value>("").map_err(|e| e.to_string()));
        let out = v.unwrap().into_json();
        assert_eq!(out["_type"], "Error");
        assert!(out["error"].as_str().unwrap().contains("EOF"));
    }

    #[test]
    fn unserializable_results_are_not_outcomes() {
        let err = capture(|| {
            let mut m = HashMap::new();
            m.insert(vec![1u8], 1);
            m
        })
        .unwrap_err();
        assert!(matches!(err, ValueError::Payload { .. }), "{err}");
        let err = attempt(|| Err::<i32, _>(HashMap::from([((1, 2), "pair")]))).unwrap_err();
        assert!(matches!(err, ValueError::Payload { .. }));

        let v = capture(|| HashMap::from([("k".to_string(), 1)])).unwrap();
        assert_eq!(v.into_json(), json!({"_type": "Ok", "value": {"k": 1}}));
    }

    #[tokio::test]
    async fn async_unserializable_result() {
        let out = attempt_async(|| async { Ok::<_, String>(HashMap::from([(vec![0u8], 0)])) }).await;
        assert!(matches!(out, Err(ValueError::Payload { .. })));
    }

    #[tokio::test]
    async fn async_value_and_error() {
        let v = attempt_async(|| async { Ok::<_, String>(7) }).await;
        assert_eq!(v.unwrap().into_json(), json!({"_type": "Ok", "value": 7}));
        let v = attempt_async(|| async { Err::<i32, _>("x") }).await;
        assert_eq!(v.unwrap().into_json(), json!({"_type": "Error", "error": "x"}));
    }

    #[tokio::test]
    async fn async_settles_after_pending() {
        let v = attempt_async(|| async {
            tokio::task::yield_now().await;
            Ok::<_, String>("late")
        })
        .await;
        assert_eq!(v.unwrap().into_json(), json!({"_type": "Ok", "value": "late"}));
    }

    #[tokio::test]
    async fn async_panics_are_captured() {
        let v = attempt_async(|| async {
            if true {
                panic!("inside");
            }
            Ok::<i32, String>(1)
        })
        .await;
        assert_eq!(v.unwrap().into_json(), json!({"_type": "Error", "error": "inside"}));

        let v = attempt_async(|| -> std::future::Ready<Result<i32, String>> { panic!("before") }).await;
        assert_eq!(v.unwrap().into_json(), json!({"_type": "Error", "error": "before"}));
    }

    #[tokio::test]
    async fn custom_discriminant() {
        let o = Outcome::new("is").unwrap();
        let v = o.attempt_async(|| async { Ok::<_, String>(true) }).await;
        assert_eq!(v.unwrap().into_json(), json!({"is": "Ok", "value": true}));
    }
}
