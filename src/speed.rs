use crate::{
    errors::{PsidError, PsidResult},
    header::PsidHeader,
};

/// Songs past this share the last speed bit
pub const MAX_SPEED_SONGS: u16 = 32;

impl PsidHeader {
    /// Timing bit of a 1-based song: 0 for vertical blank, 1 for CIA timer
    pub fn song_speed(&self, song: u16) -> PsidResult<u8> {
        let bit = self.speed_bit(song)?;
        Ok(((self.speed >> bit) & 1) as u8)
    }

    pub fn set_song_speed(&mut self, song: u16, value: u8) -> PsidResult<()> {
        let bit = self.speed_bit(song)?;
        match value {
            0 => self.speed &= !(1 << bit),
            1 => self.speed |= 1 << bit,
            _ => {
                return Err(PsidError::invalid_value(
                    "speed",
                    format!("speed bit must be 0 or 1, got {}", value),
                ))
            }
        }
        Ok(())
    }

    fn speed_bit(&self, song: u16) -> PsidResult<u32> {
        if song < 1 || song > self.songs {
            return Err(PsidError::InvalidSongNumber {
                song,
                songs: self.songs,
            });
        }
        Ok(u32::from(song.min(MAX_SPEED_SONGS) - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with_songs(songs: u16) -> PsidHeader {
        let mut header = PsidHeader::new();
        header.songs = songs;
        header
    }

    #[test]
    fn test_song_speed_bits() {
        let mut header = header_with_songs(4);
        header.speed = 0b1010;

        assert_eq!(header.song_speed(1), Ok(0));
        assert_eq!(header.song_speed(2), Ok(1));
        assert_eq!(header.song_speed(3), Ok(0));
        assert_eq!(header.song_speed(4), Ok(1));
    }

    #[test]
    fn test_set_song_speed() {
        let mut header = header_with_songs(3);
        header.set_song_speed(2, 1).unwrap();
        assert_eq!(header.speed(), 0b010);

        header.set_song_speed(3, 1).unwrap();
        header.set_song_speed(2, 0).unwrap();
        assert_eq!(header.speed(), 0b100);
    }

    #[test]
    fn test_songs_past_32_share_bit_31() {
        let mut header = header_with_songs(100);
        header.set_song_speed(77, 1).unwrap();
        assert_eq!(header.speed(), 1 << 31);
        assert_eq!(header.song_speed(32), Ok(1));
        assert_eq!(header.song_speed(100), Ok(1));
        assert_eq!(header.song_speed(31), Ok(0));
    }

    #[test]
    fn test_invalid_song_numbers() {
        let mut header = header_with_songs(2);
        assert_eq!(
            header.song_speed(0),
            Err(PsidError::InvalidSongNumber { song: 0, songs: 2 })
        );
        assert!(matches!(
            header.song_speed(3),
            Err(PsidError::InvalidSongNumber { .. })
        ));
        assert!(matches!(
            header.set_song_speed(3, 1),
            Err(PsidError::InvalidSongNumber { .. })
        ));
        assert_eq!(header.speed(), 0);
    }

    #[test]
    fn test_invalid_speed_value() {
        let mut header = header_with_songs(2);
        assert!(matches!(
            header.set_song_speed(1, 2),
            Err(PsidError::InvalidValue { .. })
        ));
        assert_eq!(header.speed(), 0);
    }
}
