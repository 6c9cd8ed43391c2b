use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        OmmError::invalid_argument("x")
            .to_string()
            .contains("invalid argument:")
    );
    assert!(
        OmmError::workload_too_big("x")
            .to_string()
            .contains("workload too big:")
    );
    assert!(
        OmmError::serialization("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = OmmError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
