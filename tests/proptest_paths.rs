//! Property-based tests using proptest
//!
//! These tests check path template resolution, query encoding and id
//! normalization over randomized inputs, using a transport that records
//! requests instead of sending them.

use async_trait::async_trait;
use dockswarm::models::{IdResponse, ListFilters};
use dockswarm::{
    EngineClient, Error, Operation, RequestParams, Transport, TransportRequest, TransportResponse,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const BASE: &str = "http://127.0.0.1:2375/v1.41";

/// Answers every request with an empty 200 and keeps a copy of it
#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<TransportRequest>>,
}

impl RecordingTransport {
    fn taken(&self) -> Vec<TransportRequest> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn request(&self, request: TransportRequest) -> dockswarm::Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(TransportResponse {
            status: 200,
            body: String::new(),
        })
    }
}

fn recording_client() -> (EngineClient, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let client = EngineClient::builder()
        .host("tcp://127.0.0.1:2375")
        .transport(transport.clone())
        .build()
        .unwrap();
    (client, transport)
}

/// Operations whose only path placeholder is `{id}`
fn arb_id_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::NodeInspect),
        Just(Operation::NodeDelete),
        Just(Operation::SecretInspect),
        Just(Operation::SecretDelete),
    ]
}

/// Ids as callers might pass them, including characters that need escaping
fn arb_id() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9]{25}",
        "[a-zA-Z0-9 /?#%{}&=.-]{1,40}",
        "\\PC{1,20}",
    ]
    .prop_filter("dot segments are rejected", |id| id != "." && id != "..")
}

proptest! {
    /// A resolved path never keeps a placeholder and decodes back to the id
    #[test]
    fn resolved_path_round_trips_id(op in arb_id_operation(), id in arb_id()) {
        let (client, transport) = recording_client();

        tokio_test::block_on(client.execute(op, RequestParams::new().path("id", id.clone())))
            .unwrap();

        let sent = transport.taken();
        prop_assert_eq!(sent.len(), 1);

        let url = &sent[0].url;
        let segment = url
            .strip_prefix(BASE)
            .and_then(|rest| rest.rsplit('/').next())
            .unwrap();

        let no_placeholder = !url.contains('{') && !url.contains('}');
        prop_assert!(no_placeholder, "placeholder left in {}", url);
        prop_assert!(!segment.contains('/'));
        prop_assert_eq!(urlencoding::decode(segment).unwrap(), id);
    }

    /// Missing or empty path values fail before any request is made
    #[test]
    fn empty_id_is_rejected_without_request(op in arb_id_operation(), with_empty in any::<bool>()) {
        let (client, transport) = recording_client();
        let params = if with_empty {
            RequestParams::new().path("id", "")
        } else {
            RequestParams::new()
        };

        let err = tokio_test::block_on(client.execute(op, params)).unwrap_err();

        let is_missing_id = matches!(&err, Error::MissingParameter { name, .. } if name == "id");
        prop_assert!(is_missing_id);
        prop_assert!(transport.taken().is_empty());
    }

    /// Dot-segment ids are refused for every id operation
    #[test]
    fn dot_segment_id_is_rejected(op in arb_id_operation(), id in prop_oneof![Just("."), Just("..")]) {
        let (client, transport) = recording_client();

        let err = tokio_test::block_on(client.execute(op, RequestParams::new().path("id", id)))
            .unwrap_err();

        let is_invalid_id = matches!(&err, Error::InvalidParameter { name, .. } if name == "id");
        prop_assert!(is_invalid_id);
        prop_assert!(transport.taken().is_empty());
    }

    /// The update version is sent as a decimal query value
    #[test]
    fn update_version_is_encoded(version in any::<u64>(), id in "[a-z0-9]{25}") {
        let (client, transport) = recording_client();
        let params = RequestParams::new()
            .path("id", id.clone())
            .query("version", version)
            .body(&json!({"Role": "worker"}))
            .unwrap();

        tokio_test::block_on(client.execute(Operation::NodeUpdate, params)).unwrap();

        let sent = transport.taken();
        prop_assert_eq!(&sent[0].url, &format!("{BASE}/nodes/{id}/update"));
        prop_assert_eq!(
            sent[0].query.clone(),
            vec![("version".to_string(), version.to_string())]
        );
    }

    /// Both casings of the create acknowledgement land in the same field
    #[test]
    fn id_casing_is_normalized(id in "\\PC{0,40}", upper in any::<bool>()) {
        let key = if upper { "ID" } else { "Id" };
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), json!(id.clone()));
        let ack: IdResponse = serde_json::from_value(body.into()).unwrap();
        prop_assert_eq!(ack.id, id);
    }

    /// Filters serialize to a JSON map of string lists preserving every value
    #[test]
    fn filters_encode_all_values(
        pairs in prop::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9=.-]{0,12}"), 1..10)
    ) {
        let filters = pairs
            .iter()
            .fold(ListFilters::new(), |f, (k, v)| f.with(k, v.clone()));

        let encoded = filters.to_query().unwrap();
        let decoded: BTreeMap<String, Vec<String>> = serde_json::from_str(&encoded).unwrap();

        let total: usize = decoded.values().map(Vec::len).sum();
        prop_assert_eq!(total, pairs.len());
        for (key, value) in &pairs {
            prop_assert!(decoded[key].contains(value));
        }
    }
}
