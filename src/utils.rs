use bytes::{BufMut, BytesMut};

/// PSID magic bytes
pub const PSID_MAGIC: [u8; 4] = *b"PSID";

/// Width of the name/author/copyright slots
pub const TEXT_FIELD_LEN: usize = 32;

/// Detect if data starts like a PSID v1/v2 file
pub fn is_psid_file(data: &[u8]) -> bool {
    data.len() >= 6 && data[0..4] == PSID_MAGIC && matches!(data[4..6], [0, 1] | [0, 2])
}

/// Decode a fixed text slot, dropping the trailing null padding.
/// Bytes map one-to-one onto ISO-8859-1 characters.
pub fn read_text_field(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
    raw[..end].iter().map(|&b| b as char).collect()
}

/// Encode text into exactly `TEXT_FIELD_LEN` bytes, truncating or null padding.
/// Characters outside ISO-8859-1 are written as '?'.
pub fn write_text_field(buffer: &mut BytesMut, value: &str) {
    let mut written = 0;
    for ch in value.chars().take(TEXT_FIELD_LEN) {
        buffer.put_u8(u8::try_from(u32::from(ch)).unwrap_or(b'?'));
        written += 1;
    }
    buffer.put_bytes(0, TEXT_FIELD_LEN - written);
}

/// Little-endian u16 from the first two bytes, 0 when there are fewer
pub fn le_u16_prefix(data: &[u8]) -> u16 {
    match data {
        [lo, hi, ..] => u16::from_le_bytes([*lo, *hi]),
        _ => 0,
    }
}

/// Read a `width`-bit group starting at bit `offset`
pub fn get_bits(word: u16, offset: u32, width: u32) -> u16 {
    (word >> offset) & ((1 << width) - 1)
}

/// Replace a `width`-bit group at `offset`, leaving the other bits alone
pub fn set_bits(word: u16, offset: u32, width: u32, value: u16) -> u16 {
    let mask = ((1u16 << width) - 1) << offset;
    (word & !mask) | ((value << offset) & mask)
}
