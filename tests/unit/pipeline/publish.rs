use super::*;

fn desc(user_id: &str) -> CharacterDescription {
    CharacterDescription::from_json_str(&format!(
        r#"{{"userId": "{user_id}", "face": {{"skinColor": "skin01"}}}}"#
    ))
    .unwrap()
}

struct NoLayers;

impl LayerSource for NoLayers {
    fn fetch(&self, locator: &str) -> AvatarResult<Vec<u8>> {
        Err(AvatarError::layer_fetch(locator, "HTTP 404"))
    }
}

#[test]
fn target_names_follow_artifact_set() {
    let store = crate::store::memory::MemoryStore::new();
    let ws = crate::pipeline::workspace::MemoryWorkspaces::new();
    let both = PublishPipeline::new(&NoLayers, &store, &ws, Gateway::default(), PipelineOpts::default());
    assert_eq!(both.target_names(&desc("u1")), vec!["u1Profile", "u1"]);

    let thumb_only = PublishPipeline::new(
        &NoLayers,
        &store,
        &ws,
        Gateway::default(),
        PipelineOpts {
            artifacts: ArtifactSet::ThumbnailOnly,
            ..PipelineOpts::default()
        },
    );
    assert_eq!(thumb_only.target_names(&desc("u1")), vec!["u1Profile"]);
}

#[test]
fn defaults_match_documented_policy() {
    let opts = PipelineOpts::default();
    assert_eq!(opts.replace, ReplacePolicy::Strict);
    assert_eq!(opts.artifacts, ArtifactSet::Both);
    assert_eq!(opts.thumbnail.size, 120);
}

#[test]
fn success_outcome_serializes_with_urls() {
    let outcome = PublishOutcome::Success(PublishReceipt {
        user_id: "u1".to_string(),
        profile: "https://gw/ipfs/QmP".to_string(),
        character: Some("https://gw/ipfs/QmC".to_string()),
        profile_cid: ContentId::new("QmP"),
        character_cid: Some(ContentId::new("QmC")),
    });
    let v = serde_json::to_value(&outcome).unwrap();
    assert_eq!(v["state"], "Success");
    assert_eq!(v["userId"], "u1");
    assert_eq!(v["profile"], "https://gw/ipfs/QmP");
    assert_eq!(v["character"], "https://gw/ipfs/QmC");
    assert_eq!(v["profileCid"], "QmP");
}

#[test]
fn thumbnail_only_receipt_omits_character() {
    let v = serde_json::to_value(PublishOutcome::Success(PublishReceipt {
        user_id: "u1".to_string(),
        profile: "p".to_string(),
        character: None,
        profile_cid: ContentId::new("QmP"),
        character_cid: None,
    }))
    .unwrap();
    assert!(v.get("character").is_none());
    assert!(v.get("characterCid").is_none());
}

#[test]
fn fail_outcome_has_empty_identifiers() {
    let outcome = PublishOutcome::Fail(ReplaceFailure::new("u1", "unpin refused".to_string()));
    assert!(!outcome.is_success());
    let v = serde_json::to_value(&outcome).unwrap();
    assert_eq!(v["state"], "Fail");
    assert_eq!(v["userId"], "u1");
    assert_eq!(v["profile"], "");
    assert_eq!(v["character"], "");
}

#[test]
fn policies_parse_from_lowercase_names() {
    let p: ReplacePolicy = serde_json::from_str("\"soft\"").unwrap();
    assert_eq!(p, ReplacePolicy::Soft);
    let a: ArtifactSet = serde_json::from_str("\"thumbnail-only\"").unwrap();
    assert_eq!(a, ArtifactSet::ThumbnailOnly);
}

#[test]
fn invalid_request_fails_before_any_store_call() {
    let store = crate::store::memory::MemoryStore::new();
    let ws = crate::pipeline::workspace::MemoryWorkspaces::new();
    let pipeline =
        PublishPipeline::new(&NoLayers, &store, &ws, Gateway::default(), PipelineOpts::default());
    let mut bad = desc("u1");
    bad.user_id = String::new();

    let err = pipeline.run(&bad).unwrap_err();
    assert!(err.is_client_error());
    assert!(store.events().is_empty());
    assert_eq!(ws.live_count(), 0);
}
