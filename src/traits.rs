use bytes::{Bytes, BytesMut};

use crate::errors::PsidResult;

/// Decoding from an in-memory image
pub trait PsidParser: Sized {
    /// Consume one file image from the front of `data`
    fn from_bytes(data: &mut Bytes) -> PsidResult<Self>;

    fn from_slice(data: &[u8]) -> PsidResult<Self> {
        Self::from_bytes(&mut Bytes::copy_from_slice(data))
    }
}

/// Encoding without validation or I/O
pub trait PsidWriter {
    fn to_bytes(&self, buffer: &mut BytesMut) -> PsidResult<()>;

    fn to_vec(&self) -> PsidResult<Vec<u8>> {
        let mut buffer = BytesMut::new();
        self.to_bytes(&mut buffer)?;
        Ok(buffer.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::PsidError, header::PsidHeader};

    #[test]
    fn test_slice_and_vec_helpers() {
        let mut header = PsidHeader::new();
        assert!(header.set([("songs", 4u16.into()), ("name", "Helpers".into())]).is_empty());

        let encoded = header.to_vec().unwrap();
        assert_eq!(encoded.len(), header.file_size());
        assert_eq!(PsidHeader::from_slice(&encoded), Ok(header));
        assert!(matches!(
            PsidHeader::from_slice(b"PSID"),
            Err(PsidError::TruncatedHeader { .. })
        ));
    }
}
