//! Byte-level BYAML document builder for tests.

use crate::NodeType;

/// One inline slot: a type tag and its four-byte value or offset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    tag: u8,
    value: u32,
}

impl Slot {
    pub(crate) fn new(kind: NodeType, value: u32) -> Self {
        Self::raw(kind.tag(), value)
    }

    pub(crate) fn raw(tag: u8, value: u32) -> Self {
        Self { tag, value }
    }
}

/// Appends blocks after a 16-byte header, keeping every block 4-aligned.
pub(crate) struct Fixture {
    data: Vec<u8>,
}

impl Fixture {
    pub(crate) fn new(version: u16) -> Self {
        let mut data = b"YB".to_vec();
        data.extend_from_slice(&version.to_le_bytes());
        data.resize(0x10, 0);
        Self { data }
    }

    /// Offset the next block will be written at.
    pub(crate) fn here(&self) -> u32 {
        self.data.len() as u32
    }

    fn pad(&mut self) {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
    }

    fn u24(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes()[..3]);
    }

    fn u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn raw(&mut self, bytes: &[u8]) -> u32 {
        let at = self.here();
        self.data.extend_from_slice(bytes);
        self.pad();
        at
    }

    pub(crate) fn value64(&mut self, bytes: &[u8; 8]) -> u32 {
        self.raw(bytes)
    }

    pub(crate) fn binary(&mut self, bytes: &[u8]) -> u32 {
        let at = self.here();
        self.u32(bytes.len() as u32);
        self.data.extend_from_slice(bytes);
        self.pad();
        at
    }

    pub(crate) fn string_table(&mut self, strings: &[&str]) -> u32 {
        let at = self.here();
        self.data.push(NodeType::StringTable.tag());
        self.u24(strings.len() as u32);

        let mut relative = 4 + strings.len() * 4;
        for s in strings {
            self.u32(relative as u32);
            relative += s.len() + 1;
        }
        for s in strings {
            self.data.extend_from_slice(s.as_bytes());
            self.data.push(0);
        }
        self.pad();
        at
    }

    pub(crate) fn array(&mut self, slots: &[Slot]) -> u32 {
        let at = self.here();
        self.data.push(NodeType::Array.tag());
        self.u24(slots.len() as u32);
        for slot in slots {
            self.data.push(slot.tag);
        }
        self.pad();
        for slot in slots {
            self.u32(slot.value);
        }
        at
    }

    pub(crate) fn hash(&mut self, entries: &[(u32, Slot)]) -> u32 {
        let at = self.here();
        self.data.push(NodeType::Hash.tag());
        self.u24(entries.len() as u32);
        for (key, slot) in entries {
            self.u24(*key);
            self.data.push(slot.tag);
            self.u32(slot.value);
        }
        at
    }

    /// Fill in the header offsets and return the document bytes.
    pub(crate) fn finish(mut self, keys: Option<u32>, strings: Option<u32>, root: u32) -> Vec<u8> {
        self.data[0x4..0x8].copy_from_slice(&keys.unwrap_or(0).to_le_bytes());
        self.data[0x8..0xC].copy_from_slice(&strings.unwrap_or(0).to_le_bytes());
        self.data[0xC..0x10].copy_from_slice(&root.to_le_bytes());
        self.data
    }
}
