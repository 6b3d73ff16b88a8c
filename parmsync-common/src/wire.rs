//! JSON wire format shared by server and client
//!
//! - Records travel as a flat object `{"<Name>": <number>, ...}` (see the
//!   `Serialize` impl on [`Record`])
//! - A set request is a one-key object `{"<Name>": <number>}`
//! - Status replies are `{"Err": null}` or `{"Err": "<message>"}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::SetRequestError;
use crate::params::ParameterSchema;
use crate::record::Record;
use crate::{Error, Result};

/// Status reply body used by the write endpoints and by every error reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrBody {
    #[serde(rename = "Err")]
    pub err: Option<String>,
}

impl ErrBody {
    pub fn ok() -> Self {
        Self { err: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            err: Some(msg.into()),
        }
    }
}

/// Encode a record to JSON bytes
pub fn encode_record(record: &Record) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| Error::Codec(format!("can't encode the record: {}", e)))
}

/// Decode a full record for `schema` from JSON bytes
///
/// Every schema name must be present and decode with its kind's decoder.
/// Keys the schema does not know are ignored.
pub fn decode_record(schema: &Arc<ParameterSchema>, bytes: &[u8]) -> Result<Record> {
    let object: Map<String, Value> = serde_json::from_slice(bytes)
        .map_err(|e| Error::Codec(format!("can't decode the record: {}", e)))?;

    let mut values = Vec::with_capacity(schema.len());
    for spec in schema.iter() {
        let raw = object
            .get(&spec.name)
            .ok_or_else(|| Error::Codec(format!("record is missing {}", spec.name)))?;
        let value = (spec.kind.decoder())(raw)
            .map_err(|e| Error::Codec(format!("bad value for {}: {}", spec.name, e)))?;
        values.push(value);
    }

    Record::from_values(Arc::clone(schema), values)
        .ok_or_else(|| Error::Codec("record width does not match schema".to_string()))
}

/// One named raw value taken from a set request body
#[derive(Debug, Clone, PartialEq)]
pub struct SetRequest {
    pub name: String,
    pub raw: Value,
}

impl SetRequest {
    /// Parse a `{"<Name>": <value>}` body
    ///
    /// The value is left raw; decoding belongs to the dispatcher, which knows
    /// the declared kind.
    pub fn parse(body: &[u8]) -> std::result::Result<Self, SetRequestError> {
        let object: Map<String, Value> =
            serde_json::from_slice(body).map_err(|e| SetRequestError::Malformed(e.to_string()))?;

        if object.len() != 1 {
            return Err(SetRequestError::FieldCount(object.len()));
        }

        // Exactly one entry, checked above
        let Some((name, raw)) = object.into_iter().next() else {
            return Err(SetRequestError::FieldCount(0));
        };
        Ok(Self { name, raw })
    }

    pub fn new(name: impl Into<String>, raw: Value) -> Self {
        Self {
            name: name.into(),
            raw,
        }
    }

    /// Encode back to a `{"<Name>": <value>}` body
    pub fn to_body(&self) -> Value {
        let mut object = Map::with_capacity(1);
        object.insert(self.name.clone(), self.raw.clone());
        Value::Object(object)
    }

    /// Request body for a single float value
    pub fn body_for(name: &str, value: f64) -> Value {
        Self::new(name, Value::from(value)).to_body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamSpec;
    use proptest::prelude::*;
    use serde_json::json;

    fn test_schema() -> Arc<ParameterSchema> {
        Arc::new(
            ParameterSchema::new(vec![
                ParamSpec::read_only("Alpha"),
                ParamSpec::settable("Gamma"),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_record_round_trip() {
        let schema = test_schema();
        let record = Record::from_values(Arc::clone(&schema), vec![-2.25, 1e12]).unwrap();

        let bytes = encode_record(&record).unwrap();
        let decoded = decode_record(&schema, &bytes).unwrap();

        assert_eq!(decoded, record);
    }

    proptest! {
        /// Any finite record survives encode then decode unchanged
        #[test]
        fn prop_record_round_trip(
            values in prop::collection::vec(
                prop::num::f64::NORMAL | prop::num::f64::ZERO | prop::num::f64::SUBNORMAL,
                5,
            )
        ) {
            let schema = Arc::new(ParameterSchema::default_parameters());
            let record = Record::from_values(Arc::clone(&schema), values).unwrap();

            let bytes = encode_record(&record).unwrap();
            let decoded = decode_record(&schema, &bytes).unwrap();
            prop_assert_eq!(decoded, record);
        }
    }

    #[test]
    fn test_decode_accepts_integer_values() {
        let record = decode_record(&test_schema(), br#"{"Alpha":0,"Gamma":5.5}"#).unwrap();
        assert_eq!(record.values(), &[0.0, 5.5]);
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let record =
            decode_record(&test_schema(), br#"{"Alpha":1,"Gamma":2,"Beta":3}"#).unwrap();
        assert_eq!(record.values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_decode_requires_every_field() {
        let err = decode_record(&test_schema(), br#"{"Alpha":1}"#).unwrap_err();
        assert!(err.to_string().contains("missing Gamma"));
    }

    #[test]
    fn test_decode_rejects_bad_values_and_bodies() {
        let err = decode_record(&test_schema(), br#"{"Alpha":"one","Gamma":2}"#).unwrap_err();
        assert!(err.to_string().contains("bad value for Alpha"));

        assert!(decode_record(&test_schema(), b"[1, 2]").is_err());
        assert!(decode_record(&test_schema(), b"").is_err());
        assert!(decode_record(&test_schema(), b"{\"Alpha\":").is_err());
    }

    #[test]
    fn test_encode_reports_non_finite() {
        let record = Record::from_values(test_schema(), vec![0.0, f64::NAN]).unwrap();
        let err = encode_record(&record).unwrap_err();
        assert!(err.to_string().contains("can't encode the record"));
    }

    #[test]
    fn test_parse_single_field() {
        let request = SetRequest::parse(br#"{"Gamma": 5.5}"#).unwrap();
        assert_eq!(request.name, "Gamma");
        assert_eq!(request.raw, json!(5.5));
    }

    #[test]
    fn test_parse_keeps_raw_value_undecoded() {
        let request = SetRequest::parse(br#"{"Gamma": "abc"}"#).unwrap();
        assert_eq!(request.raw, json!("abc"));
    }

    #[test]
    fn test_parse_rejects_field_counts() {
        let err = SetRequest::parse(br#"{"Alpha":1,"Gamma":2}"#).unwrap_err();
        assert_eq!(err, SetRequestError::FieldCount(2));
        assert_eq!(
            err.to_string(),
            "only one item per set request, please, found 2"
        );

        let err = SetRequest::parse(b"{}").unwrap_err();
        assert_eq!(err, SetRequestError::FieldCount(0));
    }

    #[test]
    fn test_parse_rejects_malformed_bodies() {
        assert!(matches!(
            SetRequest::parse(b"not json"),
            Err(SetRequestError::Malformed(_))
        ));
        assert!(matches!(
            SetRequest::parse(b"[1]"),
            Err(SetRequestError::Malformed(_))
        ));
        assert!(matches!(
            SetRequest::parse(b""),
            Err(SetRequestError::Malformed(_))
        ));
    }

    #[test]
    fn test_body_for() {
        assert_eq!(SetRequest::body_for("Zeta", 2.5), json!({"Zeta": 2.5}));
    }

    #[test]
    fn test_to_body_parses_back() {
        let request = SetRequest::new("Gamma", json!("raw"));
        let body = serde_json::to_vec(&request.to_body()).unwrap();
        assert_eq!(SetRequest::parse(&body).unwrap(), request);
    }

    #[test]
    fn test_err_body_shapes() {
        assert_eq!(
            serde_json::to_value(ErrBody::ok()).unwrap(),
            json!({"Err": null})
        );
        assert_eq!(
            serde_json::to_value(ErrBody::error("boom")).unwrap(),
            json!({"Err": "boom"})
        );
    }
}
