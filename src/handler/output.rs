//! Handler return values.
//!
//! Handlers return either `()` or a three-part outcome of
//! (integer status, response, error). Each position describes itself through
//! [`OutputValue`] so the shape can be checked when the handler is registered.
//! `Result<(status, reply), anyhow::Error>` is accepted as the same shape.

use axum::http::StatusCode;

use crate::handler::reply::Reply;
use crate::handler::signature::{SlotKind, SlotSpec};

/// Converted value of one output position.
pub enum Slot {
    /// Status code; `None` when the integer does not fit a status.
    Status(Option<u16>),
    Response(Option<Box<dyn Reply>>),
    Error(Option<anyhow::Error>),
    Other,
}

/// A value that can occupy one output position.
pub trait OutputValue: Send + 'static {
    fn kind() -> SlotKind;
    fn into_slot(self) -> Slot;

    fn spec() -> SlotSpec {
        SlotSpec {
            type_name: std::any::type_name::<Self>(),
            kind: Self::kind(),
        }
    }
}

macro_rules! integer_output {
    ($($ty:ty),*) => {
        $(
            impl OutputValue for $ty {
                fn kind() -> SlotKind {
                    SlotKind::Integer
                }

                fn into_slot(self) -> Slot {
                    Slot::Status(u16::try_from(self).ok())
                }
            }
        )*
    };
}

integer_output!(u16, u32, u64, usize, i16, i32, i64, isize);

impl OutputValue for StatusCode {
    fn kind() -> SlotKind {
        SlotKind::Integer
    }

    fn into_slot(self) -> Slot {
        Slot::Status(Some(self.as_u16()))
    }
}

impl<R: Reply> OutputValue for R {
    fn kind() -> SlotKind {
        SlotKind::Response
    }

    fn into_slot(self) -> Slot {
        Slot::Response(Some(Box::new(self)))
    }
}

impl<R: Reply> OutputValue for Option<R> {
    fn kind() -> SlotKind {
        SlotKind::Response
    }

    fn into_slot(self) -> Slot {
        Slot::Response(self.map(|r| Box::new(r) as Box<dyn Reply>))
    }
}

impl OutputValue for Option<anyhow::Error> {
    fn kind() -> SlotKind {
        SlotKind::Error
    }

    fn into_slot(self) -> Slot {
        Slot::Error(self)
    }
}

macro_rules! other_output {
    ($($ty:ty),*) => {
        $(
            impl OutputValue for $ty {
                fn kind() -> SlotKind {
                    SlotKind::Other
                }

                fn into_slot(self) -> Slot {
                    Slot::Other
                }
            }
        )*
    };
}

other_output!(String, &'static str, bool, f32, f64);

/// What the dispatcher does after the handler returned.
pub enum Outcome {
    /// Answer 204 with no body.
    Empty,
    /// Hand the status and response to the response handler.
    Reply {
        status: u16,
        response: Option<Box<dyn Reply>>,
    },
    /// Hand the error to the error handler.
    Failed(anyhow::Error),
}

/// A complete handler return type.
pub trait Output: Send + 'static {
    fn slots() -> Vec<SlotSpec>;
    fn into_outcome(self) -> Outcome;
}

impl Output for () {
    fn slots() -> Vec<SlotSpec> {
        Vec::new()
    }

    fn into_outcome(self) -> Outcome {
        Outcome::Empty
    }
}

impl<S, R, E> Output for (S, R, E)
where
    S: OutputValue,
    R: OutputValue,
    E: OutputValue,
{
    fn slots() -> Vec<SlotSpec> {
        vec![S::spec(), R::spec(), E::spec()]
    }

    fn into_outcome(self) -> Outcome {
        let (status, response, error) = self;
        outcome_of(status.into_slot(), response.into_slot(), error.into_slot())
    }
}

impl<S, R> Output for Result<(S, R), anyhow::Error>
where
    S: OutputValue,
    R: OutputValue,
{
    fn slots() -> Vec<SlotSpec> {
        vec![S::spec(), R::spec(), <Option<anyhow::Error>>::spec()]
    }

    fn into_outcome(self) -> Outcome {
        match self {
            Ok((status, response)) => outcome_of(status.into_slot(), response.into_slot(), Slot::Error(None)),
            Err(error) => Outcome::Failed(error),
        }
    }
}

// Shapes the validator rejects; they exist so the mistake is reported at
// registration instead of failing to compile somewhere far from the route.
impl<A: OutputValue, B: OutputValue> Output for (A, B) {
    fn slots() -> Vec<SlotSpec> {
        vec![A::spec(), B::spec()]
    }

    fn into_outcome(self) -> Outcome {
        malformed()
    }
}

impl<A: OutputValue, B: OutputValue, C: OutputValue, D: OutputValue> Output for (A, B, C, D) {
    fn slots() -> Vec<SlotSpec> {
        vec![A::spec(), B::spec(), C::spec(), D::spec()]
    }

    fn into_outcome(self) -> Outcome {
        malformed()
    }
}

fn outcome_of(status: Slot, response: Slot, error: Slot) -> Outcome {
    match (status, response, error) {
        (_, _, Slot::Error(Some(error))) => Outcome::Failed(error),
        (Slot::Status(Some(status)), Slot::Response(response), Slot::Error(None)) => {
            Outcome::Reply { status, response }
        }
        (Slot::Status(None), _, Slot::Error(None)) => {
            Outcome::Failed(anyhow::anyhow!("handler returned a status code outside the u16 range"))
        }
        _ => malformed(),
    }
}

fn malformed() -> Outcome {
    Outcome::Failed(anyhow::anyhow!("handler output does not match its registered shape"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::reply::JsonReply;

    type Triple = (u16, JsonReply<&'static str>, Option<anyhow::Error>);

    #[test]
    fn test_slot_kinds() {
        let kinds: Vec<_> = Triple::slots().into_iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SlotKind::Integer, SlotKind::Response, SlotKind::Error]);

        let kinds: Vec<_> = <Result<(StatusCode, Option<JsonReply<u8>>), anyhow::Error>>::slots()
            .into_iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(kinds, vec![SlotKind::Integer, SlotKind::Response, SlotKind::Error]);

        assert_eq!(<(String, bool)>::slots()[0].kind, SlotKind::Other);
        assert!(<()>::slots().is_empty());
    }

    #[test]
    fn test_error_wins_over_response() {
        let out: Triple = (200, JsonReply("ok"), Some(anyhow::anyhow!("boom")));
        match out.into_outcome() {
            Outcome::Failed(e) => assert_eq!(e.to_string(), "boom"),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_reply_outcome() {
        let out: Triple = (201, JsonReply("ok"), None);
        match out.into_outcome() {
            Outcome::Reply { status, response } => {
                assert_eq!(status, 201);
                assert_eq!(response.unwrap().content_type(), "application/json");
            }
            _ => panic!("expected reply"),
        }

        let out: Result<(i32, JsonReply<u8>), anyhow::Error> = Ok((-1, JsonReply(1)));
        assert!(matches!(out.into_outcome(), Outcome::Failed(_)));
    }
}
