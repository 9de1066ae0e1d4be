/// Per-header behaviour switches
///
/// Carried by each `PsidHeader` and kept across a failed decode, since it
/// describes how the caller wants the header handled rather than file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PsidConfig {
    /// Run `validate()` before every encode that goes through `encode`,
    /// `write_to` or `write_path`
    pub validate_on_write: bool,

    /// Reject payloads too short to carry the embedded load address when
    /// `loadAddress` is 0
    pub strict_payload: bool,
}

impl PsidConfig {
    /// Always write canonical v2NG headers
    pub fn canonical() -> Self {
        Self {
            validate_on_write: true,
            strict_payload: false,
        }
    }

    /// Canonical writes plus strict payload checks on decode
    pub fn strict() -> Self {
        Self {
            validate_on_write: true,
            strict_payload: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PsidConfig::default();
        assert!(!config.validate_on_write);
        assert!(!config.strict_payload);
    }

    #[test]
    fn test_config_presets() {
        assert!(PsidConfig::canonical().validate_on_write);
        assert!(!PsidConfig::canonical().strict_payload);
        assert_eq!(
            PsidConfig::strict(),
            PsidConfig {
                validate_on_write: true,
                strict_payload: true
            }
        );
    }
}
