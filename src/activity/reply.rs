use serde_json::{Map, Value};

/// Outcome of decoding one reply from the activity manager's `create` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityReply {
    /// The activity exists and the manager assigned it `activity_id`.
    Created { activity_id: i32 },
    /// The manager answered with `returnValue: false`.
    Refused,
    /// The payload did not have the expected shape.
    Malformed { reason: &'static str },
}

impl ActivityReply {
    /// Validate an untrusted reply payload.
    ///
    /// Checks run in order: the payload is a JSON object, `returnValue` is
    /// present and boolean, `returnValue` is true, `activityId` is present
    /// and numeric and fits an `i32` once truncated toward zero.
    pub fn decode(payload: &str) -> Self {
        let root = match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(root)) => root,
            Ok(_) => return Self::malformed("payload is not an object"),
            Err(_) => return Self::malformed("payload is not valid json"),
        };

        let Some(return_value) = root.get("returnValue") else {
            return Self::malformed("missing returnValue");
        };
        let Some(return_value) = return_value.as_bool() else {
            return Self::malformed("returnValue is not a boolean");
        };
        if !return_value {
            return Self::Refused;
        }

        match activity_id(&root) {
            Ok(activity_id) => Self::Created { activity_id },
            Err(reason) => Self::malformed(reason),
        }
    }

    fn malformed(reason: &'static str) -> Self {
        Self::Malformed { reason }
    }
}

fn activity_id(root: &Map<String, Value>) -> Result<i32, &'static str> {
    let value = root.get("activityId").ok_or("missing activityId")?;

    if let Some(id) = value.as_i64() {
        return i32::try_from(id).map_err(|_| "activityId out of range");
    }

    let id = value.as_f64().ok_or("activityId is not a number")?.trunc();
    if id < f64::from(i32::MIN) || id > f64::from(i32::MAX) {
        return Err("activityId out of range");
    }
    #[allow(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "integral and range checked above"
    )]
    let id = id as i32;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_created() {
        assert_eq!(
            ActivityReply::decode(r#"{"returnValue":true,"activityId":7}"#),
            ActivityReply::Created { activity_id: 7 }
        );
    }

    #[test]
    fn test_decode_truncates_fractional_id() {
        assert_eq!(
            ActivityReply::decode(r#"{"returnValue":true,"activityId":42.9}"#),
            ActivityReply::Created { activity_id: 42 }
        );
    }

    #[test]
    fn test_decode_refused() {
        assert_eq!(
            ActivityReply::decode(r#"{"returnValue":false,"errorText":"busy"}"#),
            ActivityReply::Refused
        );
    }

    #[test]
    fn test_decode_missing_activity_id() {
        assert_eq!(
            ActivityReply::decode(r#"{"returnValue":true}"#),
            ActivityReply::Malformed { reason: "missing activityId" }
        );
    }

    #[test]
    fn test_decode_non_numeric_activity_id() {
        assert!(matches!(
            ActivityReply::decode(r#"{"returnValue":true,"activityId":"7"}"#),
            ActivityReply::Malformed { .. }
        ));
    }

    #[test]
    fn test_decode_out_of_range_activity_id() {
        assert!(matches!(
            ActivityReply::decode(r#"{"returnValue":true,"activityId":4294967296}"#),
            ActivityReply::Malformed { .. }
        ));
        assert!(matches!(
            ActivityReply::decode(r#"{"returnValue":true,"activityId":1e20}"#),
            ActivityReply::Malformed { .. }
        ));
    }

    #[test]
    fn test_decode_rejects_non_boolean_return_value() {
        assert_eq!(
            ActivityReply::decode(r#"{"returnValue":"true","activityId":7}"#),
            ActivityReply::Malformed { reason: "returnValue is not a boolean" }
        );
        assert_eq!(
            ActivityReply::decode(r#"{"returnValue":1,"activityId":7}"#),
            ActivityReply::Malformed { reason: "returnValue is not a boolean" }
        );
    }

    #[test]
    fn test_decode_missing_return_value() {
        assert_eq!(
            ActivityReply::decode(r#"{"activityId":7}"#),
            ActivityReply::Malformed { reason: "missing returnValue" }
        );
    }

    #[test]
    fn test_decode_non_object_payloads() {
        for payload in ["[1,2]", "true", "\"x\"", "", "{not json"] {
            assert!(
                matches!(ActivityReply::decode(payload), ActivityReply::Malformed { .. }),
                "payload {payload:?} should be malformed"
            );
        }
    }
}
