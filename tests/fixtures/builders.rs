//! PSID Test Data Builders
//!
//! Writes raw PSID bytes field by field, independently of the crate's encoder,
//! so decode tests do not depend on the code under test.

#![allow(dead_code)]

/// Fluent builder for raw PSID files
#[derive(Debug, Clone)]
pub struct PsidBuilder {
    magic: [u8; 4],
    version: u16,
    data_offset: Option<u16>,
    load_address: u16,
    init_address: u16,
    play_address: u16,
    songs: u16,
    start_song: u16,
    speed: u32,
    name: Vec<u8>,
    author: Vec<u8>,
    copyright: Vec<u8>,
    flags: u16,
    start_page: u8,
    page_length: u8,
    reserved: u16,
    padding: Vec<u8>,
    data: Vec<u8>,
}

impl Default for PsidBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PsidBuilder {
    /// v2 file with one song at $1000
    pub fn new() -> Self {
        Self {
            magic: *b"PSID",
            version: 2,
            data_offset: None,
            load_address: 0x1000,
            init_address: 0x1000,
            play_address: 0x1003,
            songs: 1,
            start_song: 1,
            speed: 0,
            name: b"Test".to_vec(),
            author: b"Me".to_vec(),
            copyright: b"2024".to_vec(),
            flags: 0,
            start_page: 0,
            page_length: 0,
            reserved: 0,
            padding: Vec::new(),
            data: vec![0x4C, 0x00, 0x10],
        }
    }

    pub fn magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = *magic;
        self
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Override the declared data offset without touching the padding
    pub fn data_offset(mut self, data_offset: u16) -> Self {
        self.data_offset = Some(data_offset);
        self
    }

    pub fn addresses(mut self, load: u16, init: u16, play: u16) -> Self {
        self.load_address = load;
        self.init_address = init;
        self.play_address = play;
        self
    }

    pub fn songs(mut self, songs: u16, start_song: u16) -> Self {
        self.songs = songs;
        self.start_song = start_song;
        self
    }

    pub fn speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn texts(mut self, name: &str, author: &str, copyright: &str) -> Self {
        self.name = name.as_bytes().to_vec();
        self.author = author.as_bytes().to_vec();
        self.copyright = copyright.as_bytes().to_vec();
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn pages(mut self, start_page: u8, page_length: u8) -> Self {
        self.start_page = start_page;
        self.page_length = page_length;
        self
    }

    pub fn reserved(mut self, reserved: u16) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn padding(mut self, padding: &[u8]) -> Self {
        self.padding = padding.to_vec();
        self
    }

    pub fn data(mut self, data: &[u8]) -> Self {
        self.data = data.to_vec();
        self
    }

    fn fixed_len(&self) -> usize {
        if self.version == 1 {
            0x76
        } else {
            0x7C
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let data_offset = self
            .data_offset
            .unwrap_or((self.fixed_len() + self.padding.len()) as u16);

        let mut out = Vec::new();
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&data_offset.to_be_bytes());
        out.extend_from_slice(&self.load_address.to_be_bytes());
        out.extend_from_slice(&self.init_address.to_be_bytes());
        out.extend_from_slice(&self.play_address.to_be_bytes());
        out.extend_from_slice(&self.songs.to_be_bytes());
        out.extend_from_slice(&self.start_song.to_be_bytes());
        out.extend_from_slice(&self.speed.to_be_bytes());
        for text in [&self.name, &self.author, &self.copyright] {
            let mut slot = [0u8; 32];
            let len = text.len().min(32);
            slot[..len].copy_from_slice(&text[..len]);
            out.extend_from_slice(&slot);
        }
        if self.version != 1 {
            out.extend_from_slice(&self.flags.to_be_bytes());
            out.push(self.start_page);
            out.push(self.page_length);
            out.extend_from_slice(&self.reserved.to_be_bytes());
        }
        out.extend_from_slice(&self.padding);
        out.extend_from_slice(&self.data);
        out
    }
}

/// The v1 scenario file: one song at $1000, load address also embedded
pub fn crafted_v1() -> Vec<u8> {
    PsidBuilder::new()
        .version(1)
        .addresses(0x1000, 0x1000, 0x1003)
        .songs(1, 1)
        .speed(0)
        .texts("Test", "Me", "2024")
        .data(&[0x00, 0x10])
        .build()
}
