use crate::envelope::PredicateEnvelope;

#[test]
fn envelope_is_camel_case_json() {
    let envelope = PredicateEnvelope::new("c2FsdA==");

    let json = serde_json::to_string(&envelope).unwrap();

    assert_eq!(json, r#"{"expression":"c2FsdA=="}"#);
    assert_eq!(serde_json::from_str::<PredicateEnvelope>(&json).unwrap(), envelope);
}
