use assert_matches::assert_matches;
use keystone::codec::{CodecError, CodecRegistry, GenericType};
use keystone::{DriverContext, SchemaConfig, SchemaParserFactory};

use crate::utils::{node, setup_tracing, single_keyspace, unique_keyspace_name};

#[test]
fn codec_for_parsed_column() {
    setup_tracing();
    let ks = unique_keyspace_name();
    let metadata = SchemaParserFactory::new(DriverContext::shared(SchemaConfig::default()))
        .new_instance(single_keyspace(node(None), &ks, "list<tinyint>"))
        .parse()
        .unwrap();
    let typ = &metadata.get_table(&ks, "t").unwrap().columns["v"].typ;

    let registry = CodecRegistry::with_default_codecs();
    let codec = registry.codec_for_cql_type(typ).unwrap();
    assert_eq!(codec.generic_type(), GenericType::of::<Vec<i8>>());
    assert!(!codec.accepts_type(&GenericType::of::<Vec<Option<i8>>>()));

    let bytes = codec.encode_value(Some(&vec![1_i8, 2, 3])).unwrap().unwrap();
    assert_eq!(
        bytes.as_ref(),
        [0, 0, 0, 3, 0, 0, 0, 1, 1, 0, 0, 0, 1, 2, 0, 0, 0, 1, 3]
    );
    assert_eq!(codec.format_value(Some(&vec![1_i8, 2, 3])).unwrap(), "[1,2,3]");

    let decoded = codec.decode_value(Some(bytes.as_ref())).unwrap().unwrap();
    assert_eq!(decoded.downcast_ref::<Vec<i8>>(), Some(&vec![1, 2, 3]));

    assert_matches!(
        codec.encode_value(Some(&vec!["1".to_owned()])),
        Err(CodecError::TypeMismatch { .. })
    );
}
