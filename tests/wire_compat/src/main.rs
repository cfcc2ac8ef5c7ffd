fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chunkup_protocol::{SimpleUploadResponse, SlotGrant, SlotRequest, UploadStatusResponse};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON numbers so that `65` and `65.0` compare equal.
    ///
    /// Node servers emit whole-number doubles either way.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => serde_json::json!(f),
                None => v.clone(),
            },
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect(),
            ),
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture, re-serializes it and compares the JSON values.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  server: {fixture}\n  client: {reserialized}"
        );
    }

    #[test]
    fn fixture_slot_request() {
        roundtrip_test::<SlotRequest>("slot_request.json");
    }

    #[test]
    fn fixture_slot_grant() {
        roundtrip_test::<SlotGrant>("slot_grant.json");
    }

    #[test]
    fn fixture_upload_status() {
        roundtrip_test::<UploadStatusResponse>("upload_status.json");
    }

    #[test]
    fn fixture_simple_upload_response() {
        roundtrip_test::<SimpleUploadResponse>("simple_upload_response.json");
    }

    #[test]
    fn slot_grant_without_url_uses_default_destination() {
        let grant: SlotGrant = serde_json::from_value(load_fixture("slot_grant_minimal.json"))
            .expect("minimal grant should parse");
        let grant = grant.validate().expect("grant has a fileId");
        assert_eq!(grant.starting_byte, 0);
        assert_eq!(
            grant.destination_or("http://fallback/upload"),
            "http://fallback/upload"
        );
    }

    #[test]
    fn upload_status_string_count_matches_numeric() {
        let numeric: UploadStatusResponse =
            serde_json::from_value(load_fixture("upload_status.json")).unwrap();
        let text: UploadStatusResponse =
            serde_json::from_value(load_fixture("upload_status_string.json")).unwrap();
        assert_eq!(numeric, text);
        assert_eq!(text.total_chunk_uploaded, 450_000);
    }

    #[test]
    fn slot_request_field_names() {
        let value = serde_json::to_value(SlotRequest {
            file_name: "a.bin".into(),
        })
        .unwrap();
        assert!(value.get("fileName").is_some());
        assert!(value.get("file_name").is_none());
    }
}
