//! Purpose: Staged bytes-to-typed-value decode pipeline.
//! Exports: `Response`, `decode_response`, `decode_bytes`.
//! Role: The synchronous half of a fetch: status validation, JSON parsing,
//! Role: then protocol dispatch into the target type.
//! Invariants: Stages run in order and the first failure short-circuits the
//! Invariants: rest; each stage fails with its own `ErrorKind`.
//! Invariants: No I/O; safe to run on any thread.

use crate::error::{Error, ErrorKind};
use crate::json::decode::Decode;
use crate::json::parse;
use serde_json::Value;

/// Ephemeral envelope for one HTTP response: raw body plus status code.
/// Consumed immediately by status validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Runs the full pipeline against a response envelope.
pub fn decode_response<T: Decode>(response: &Response) -> Result<T, Error> {
    let body = validate_status(response)?;
    let tree = parse_body(body)?;
    decode_value(&tree)
}

/// Slice-level convenience over [`decode_response`].
pub fn decode_bytes<T: Decode>(body: &[u8], status: u16) -> Result<T, Error> {
    decode_response(&Response::new(status, body))
}

pub(crate) fn validate_status(response: &Response) -> Result<&[u8], Error> {
    if !(200..300).contains(&response.status) {
        return Err(Error::new(ErrorKind::Transport)
            .with_message("response status outside success range")
            .with_status(response.status));
    }
    Ok(&response.body)
}

fn parse_body(body: &[u8]) -> Result<Value, Error> {
    parse::from_slice(body).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message("response body is not valid json")
            .with_source(err)
    })
}

fn decode_value<T: Decode>(tree: &Value) -> Result<T, Error> {
    T::decode(tree).ok_or_else(|| {
        Error::new(ErrorKind::Decode).with_message(format!(
            "json value does not decode as {}",
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{Response, decode_response};
    use crate::error::ErrorKind;
    use crate::json::combinator::{apply, map};
    use crate::json::decode::{Decode, required};
    use serde_json::Value;

    #[derive(Debug, Eq, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl Decode for Point {
        fn decode(value: &Value) -> Option<Self> {
            let object = value.as_object()?;
            let ctor = |x: i64| move |y: i64| Point { x, y };
            apply(map(ctor, required(object, "x")), required(object, "y"))
        }
    }

    #[test]
    fn success_status_and_shape_yield_value() {
        let response = Response::new(200, br#"{"x":1,"y":2}"#.as_slice());
        let point: Point = decode_response(&response).expect("point");
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn boundary_statuses_follow_half_open_range() {
        let body = br#"{"x":1,"y":2}"#.as_slice();
        assert!(decode_response::<Point>(&Response::new(299, body)).is_ok());
        let err = decode_response::<Point>(&Response::new(300, body)).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), Some(300));
    }

    #[test]
    fn transport_failure_wins_over_body_content() {
        // Body would parse and decode fine; status alone decides.
        let err =
            decode_response::<Point>(&Response::new(404, br#"{"x":1,"y":2}"#.as_slice()))
                .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn malformed_body_is_a_parse_failure() {
        let err = decode_response::<Point>(&Response::new(200, b"not json".as_slice()))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn wrong_shape_is_a_decode_failure_naming_the_type() {
        let err = decode_response::<Point>(&Response::new(200, br#"{"x":1}"#.as_slice()))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("Point"));
    }

    #[test]
    fn decoding_is_idempotent() {
        let response = Response::new(200, br#"{"x":3,"y":4}"#.as_slice());
        let first: Point = decode_response(&response).expect("first");
        let second: Point = decode_response(&response).expect("second");
        assert_eq!(first, second);
    }
}
