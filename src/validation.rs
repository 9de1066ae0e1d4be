use crate::{
    flags::{known_flags, Clock, SidModel},
    header::{PsidHeader, MAX_DATA_LEN, V2_DATA_OFFSET},
    speed::MAX_SPEED_SONGS,
    utils::le_u16_prefix,
};

/// Longest text that still leaves room for the terminating null
pub const MAX_TEXT_LEN: usize = 31;
pub const MAX_SONGS: u16 = 256;

impl PsidHeader {
    /// Rewrite the header into canonical v2NG form.
    ///
    /// Out-of-range values are clamped rather than rejected, so this never
    /// fails. Running it twice gives the same result as running it once.
    pub fn validate(&mut self) {
        self.version = 2;
        self.data_offset = V2_DATA_OFFSET;

        for text in [&mut self.name, &mut self.author, &mut self.copyright] {
            normalize_text(text);
        }

        self.embed_load_address();

        // Addresses and page fields are bounded by their storage width
        self.songs = self.songs.clamp(1, MAX_SONGS);
        if self.start_song == 0 || self.start_song > self.songs {
            self.start_song = 1;
        }
        self.speed &= speed_mask(self.songs);

        self.flags = Some(known_flags(
            self.mus_player().unwrap_or(false),
            self.play_sid_specific().unwrap_or(false),
            self.clock().unwrap_or(Clock::Unknown),
            self.sid_model().unwrap_or(SidModel::Unknown),
        ));

        let start_page = self.start_page.unwrap_or(0);
        self.start_page = Some(start_page);
        self.page_length = Some(if start_page == 0 {
            0
        } else {
            self.page_length.unwrap_or(0)
        });
        self.reserved = Some(0);

        self.padding.clear();
    }

    /// Fill a missing init address, then move the load address into the
    /// first two payload bytes
    fn embed_load_address(&mut self) {
        if self.init_address == 0 {
            self.init_address = if self.load_address != 0 {
                self.load_address
            } else {
                le_u16_prefix(&self.data)
            };
        }

        if self.load_address != 0 {
            let mut data = Vec::with_capacity(self.data.len() + 2);
            data.extend_from_slice(&self.load_address.to_le_bytes());
            data.extend_from_slice(&self.data);
            data.truncate(MAX_DATA_LEN);
            self.data = data;
            self.load_address = 0;
        }
    }
}

/// Cut to the slot, then make every character encodable as a single
/// ISO-8859-1 byte, the same way the encoder would
fn normalize_text(text: &mut String) {
    let cut: String = text
        .trim_end_matches('\0')
        .chars()
        .take(MAX_TEXT_LEN)
        .map(|ch| if u32::from(ch) > 0xFF { '?' } else { ch })
        .collect();
    *text = cut.trim_end_matches('\0').to_string();
}

/// Speed bits that belong to an existing song
fn speed_mask(songs: u16) -> u32 {
    let used = u32::from(songs.min(MAX_SPEED_SONGS));
    if used >= 32 {
        u32::MAX
    } else {
        (1 << used) - 1
    }
}
