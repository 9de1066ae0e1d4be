use md5::{Digest, Md5};

use crate::{header::PsidHeader, speed::MAX_SPEED_SONGS};

/// Byte recorded for songs driven by the CIA timer
const CIA_SPEED_BYTE: u8 = 60;

impl PsidHeader {
    /// MD5 over the payload, entry points and per-song timing.
    ///
    /// Text fields, version, offsets and padding do not contribute, so
    /// cosmetic edits keep the fingerprint used by song-length databases.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Md5::new();

        let payload = if self.load_address == 0 && !self.data.is_empty() {
            self.data.get(2..).unwrap_or(&[])
        } else {
            &self.data[..]
        };
        hasher.update(payload);
        hasher.update(self.init_address.to_le_bytes());
        hasher.update(self.play_address.to_le_bytes());
        hasher.update(self.songs.to_le_bytes());

        for song in 0..self.songs {
            let bit = song.min(MAX_SPEED_SONGS - 1);
            let speed = if (self.speed >> bit) & 1 == 0 {
                0
            } else {
                CIA_SPEED_BYTE
            };
            hasher.update([speed]);
        }

        format!("{:x}", hasher.finalize())
    }
}
