use super::*;

#[test]
fn gateway_joins_base_and_cid() {
    let gw = Gateway::new("https://gateway.pinata.cloud/ipfs/");
    let id = ContentId::new("QmTest");
    assert_eq!(gw.url_for(&id), "https://gateway.pinata.cloud/ipfs/QmTest");

    let asset = gw.asset(id.clone());
    assert_eq!(asset.cid, id);
    assert_eq!(asset.url, "https://gateway.pinata.cloud/ipfs/QmTest");
}

#[test]
fn default_gateway_is_pinata() {
    let url = Gateway::default().url_for(&ContentId::new("abc"));
    assert_eq!(url, "https://gateway.pinata.cloud/ipfs/abc");
}

#[test]
fn content_id_serializes_as_plain_string() {
    let json = serde_json::to_string(&ContentId::new("Qm1")).unwrap();
    assert_eq!(json, "\"Qm1\"");
}
