//! Property tests for envelope parsing
//!
//! Arbitrary payloads must always yield either a request or an error
//! envelope, never a panic, and error envelopes must carry a valid id.

use mcp_gateway::mcp::protocol::error_codes;
use mcp_gateway::mcp::{JsonRpcId, JsonRpcRequest};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(|f| json!(f)),
        ".{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        match JsonRpcRequest::from_slice(&bytes) {
            Ok(_) => {}
            Err(rejected) => {
                let code = rejected.error.error_code();
                prop_assert!(code == error_codes::PARSE_ERROR || code == error_codes::INVALID_REQUEST);
            }
        }
    }

    #[test]
    fn arbitrary_json_yields_request_or_error_envelope(value in arb_json()) {
        let bytes = serde_json::to_vec(&value).unwrap();
        match JsonRpcRequest::from_slice(&bytes) {
            Ok(request) => {
                prop_assert!(value.is_object());
                prop_assert_eq!(Some(&Value::String(request.method.clone())), value.get("method"));
            }
            Err(rejected) => {
                prop_assert_eq!(rejected.error.error_code(), error_codes::INVALID_REQUEST);
                let envelope = serde_json::to_value(rejected.into_response()).unwrap();
                prop_assert!(envelope["jsonrpc"] == "2.0");
                prop_assert!(envelope["id"].is_i64() || envelope["id"].is_string());
                prop_assert!(envelope.get("result").is_none());
            }
        }
    }

    #[test]
    fn well_formed_requests_keep_their_id(id in any::<i64>(), method in "[a-z/]{1,16}") {
        let payload = json!({"jsonrpc": "2.0", "id": id, "method": method});
        let request = JsonRpcRequest::from_slice(&serde_json::to_vec(&payload).unwrap()).unwrap();
        prop_assert_eq!(request.id.clone(), Some(JsonRpcId::Number(id)));
        prop_assert!(request.validate().is_ok());
    }

    #[test]
    fn string_ids_survive_rejection(id in "[a-zA-Z0-9-]{1,16}") {
        let payload = json!({"jsonrpc": "2.0", "id": id.clone(), "method": 7});
        let rejected = JsonRpcRequest::from_slice(&serde_json::to_vec(&payload).unwrap()).unwrap_err();
        prop_assert_eq!(rejected.id, JsonRpcId::String(id));
    }
}
