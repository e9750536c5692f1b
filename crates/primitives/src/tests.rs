use proptest::prelude::*;

use super::*;

#[test]
fn parse_canonicalizes_case_and_marker() {
	let aid = Aid::parse("a000000003*").unwrap();
	assert_eq!(aid.as_str(), "A000000003*");
	assert!(aid.is_prefix());
	assert_eq!(aid.body(), "A000000003");
	assert_eq!(aid.byte_len(), 5);
}

#[test]
fn parse_rejects_malformed_identifiers() {
	assert_eq!(Aid::parse(""), Err(AidError::Empty));
	assert_eq!(Aid::parse("*"), Err(AidError::Empty));
	assert!(matches!(Aid::parse("A00000000G"), Err(AidError::NonHex { ch: 'G', .. })));
	assert!(matches!(Aid::parse("A00000000"), Err(AidError::OddLength { .. })));
	assert!(matches!(Aid::parse("A0000000"), Err(AidError::BadLength { bytes: 4, .. })));
	assert!(matches!(Aid::parse(&"A0".repeat(17)), Err(AidError::BadLength { bytes: 17, .. })));
	assert!(Aid::parse(&"A0".repeat(16)).is_ok());
}

#[test]
fn ordering_visits_prefix_before_longer_children() {
	let mut aids: Vec<Aid> = ["A00000000301", "A000000003*", "A000000003", "A00000000301*"]
		.iter()
		.map(|raw| Aid::parse(raw).unwrap())
		.collect();
	aids.sort();
	let text: Vec<&str> = aids.iter().map(Aid::as_str).collect();
	assert_eq!(text, ["A000000003", "A000000003*", "A00000000301", "A00000000301*"]);
}

#[test]
fn covers_follows_prefix_semantics() {
	let root = Aid::parse("F000000003*").unwrap();
	let child = Aid::parse("F0000000030102").unwrap();
	let nested = Aid::parse("F00000000301*").unwrap();
	let sibling = Aid::parse("F000000004").unwrap();

	assert!(root.covers(&child));
	assert!(root.covers(&nested));
	assert!(root.covers(&root.to_exact()));
	assert!(!root.covers(&sibling));
	assert!(!child.covers(&root));
	assert!(child.covers(&child));
}

#[test]
fn selection_matching() {
	let prefix = Aid::parse("A000000004*").unwrap();
	let exact = Aid::parse("A000000004").unwrap();
	assert!(prefix.matches_selection("A0000000041010"));
	assert!(prefix.matches_selection("A000000004"));
	assert!(!exact.matches_selection("A0000000041010"));
	assert!(exact.matches_selection("A000000004"));
}

#[test]
fn selection_normalization() {
	assert_eq!(normalize_selection("a0000000041010").as_deref(), Some("A0000000041010"));
	assert_eq!(normalize_selection("A00000"), None);
	assert_eq!(normalize_selection("A00000000Z"), None);
}

#[test]
fn to_bytes_decodes_body() {
	let aid = Aid::parse("A0000000041010*").unwrap();
	assert_eq!(aid.to_bytes(), vec![0xA0, 0x00, 0x00, 0x00, 0x04, 0x10, 0x10]);
}

#[test]
fn lower_case_input_decodes_like_upper_case() {
	let aid = Aid::parse(" f0000000ab* ").unwrap();
	assert_eq!(aid.as_str(), "F0000000AB*");
	assert_eq!(aid.to_bytes(), vec![0xF0, 0x00, 0x00, 0x00, 0xAB]);
	assert!(matches!(Aid::parse("f0000000az"), Err(AidError::NonHex { ch: 'z', .. })));
}

#[test]
fn matching_mode_prefix_support() {
	assert!(!AidMatching::ExactOnly.supports_prefix());
	assert!(AidMatching::ExactOrPrefix.supports_prefix());
	assert!(AidMatching::PrefixOnly.supports_prefix());
}

#[test]
fn handler_deserializes_from_toml() {
	let handler: Handler = toml::from_str(
		r#"
		id = "com.example/Wallet"
		location = { kind = "off-host", route = 2 }
		power = "SWITCH_ON | SWITCH_OFF"

		[[groups]]
		category = "payment"
		aids = ["A0000000041010", "A000000003*"]
		"#,
	)
	.unwrap();

	assert_eq!(handler.id.as_str(), "com.example/Wallet");
	assert_eq!(handler.location, HandlerLocation::OffHost { route: Some(RouteId(2)) });
	assert_eq!(handler.power, PowerState::SWITCH_ON | PowerState::SWITCH_OFF);
	assert!(handler.other_enabled);
	let declared: Vec<_> = handler.declared_aids().collect();
	assert_eq!(declared, [(Category::Payment, "A0000000041010"), (Category::Payment, "A000000003*")]);
}

proptest! {
	#[test]
	fn parse_accepts_every_valid_body(bytes in proptest::collection::vec(any::<u8>(), MIN_AID_BYTES..=MAX_AID_BYTES), prefix in any::<bool>()) {
		let mut raw: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
		if prefix {
			raw.push(PREFIX_MARKER);
		}
		let aid = Aid::parse(&raw).unwrap();
		prop_assert_eq!(aid.is_prefix(), prefix);
		prop_assert_eq!(aid.to_bytes(), bytes);
	}
}
