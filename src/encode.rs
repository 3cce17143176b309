//! DAG-PB encoder.
//!
//! The canonical form is computed up front: every message knows its exact
//! encoded size, the output buffer is allocated once, and links are written
//! before data with each link's fields in Hash, Name, Tsize order.
use crate::codec::{PbLink, PbNode};

/// Number of bytes the varint encoding of `v` occupies.
pub(crate) fn sizeof_varint(v: u64) -> usize {
    ((64 - (v | 1).leading_zeros() as usize) + 6) / 7
}

fn write_varint(buf: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        buf.push((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

fn write_bytes(buf: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    buf.push(tag);
    write_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

impl PbLink {
    fn size(&self) -> usize {
        let len = self.cid.encoded_len();
        let mut size = 1 + len + sizeof_varint(len as u64);
        if let Some(ref name) = self.name {
            size += 1 + name.len() + sizeof_varint(name.len() as u64);
        }
        if let Some(tsize) = self.size {
            size += 1 + sizeof_varint(tsize);
        }
        size
    }

    fn marshal(&self, buf: &mut Vec<u8>) {
        write_bytes(buf, 0x0a, &self.cid.to_bytes());
        if let Some(ref name) = self.name {
            write_bytes(buf, 0x12, name.as_bytes());
        }
        if let Some(tsize) = self.size {
            buf.push(0x18);
            write_varint(buf, tsize);
        }
    }
}

impl<'a> PbNode<'a> {
    fn size(&self) -> usize {
        let mut size = 0;
        for link in &self.links {
            let len = link.size();
            size += 1 + len + sizeof_varint(len as u64);
        }
        if let Some(ref data) = self.data {
            size += 1 + data.len() + sizeof_varint(data.len() as u64);
        }
        size
    }

    /// Serializes a `PbNode` to its canonical bytes.
    pub fn into_bytes(mut self) -> Box<[u8]> {
        // Links must be strictly sorted by name before encoding, leaving
        // stable ordering where the names are the same (or absent).
        self.links.sort_by(|a, b| {
            let a = a.name.as_ref().map(|s| s.as_bytes()).unwrap_or(&[][..]);
            let b = b.name.as_ref().map(|s| s.as_bytes()).unwrap_or(&[][..]);
            a.cmp(b)
        });

        let size = self.size();
        let mut buf = Vec::with_capacity(size);
        for link in &self.links {
            buf.push(0x12);
            write_varint(&mut buf, link.size() as u64);
            link.marshal(&mut buf);
        }
        if let Some(ref data) = self.data {
            write_bytes(&mut buf, 0x0a, data);
        }
        debug_assert_eq!(buf.len(), size);
        buf.into_boxed_slice()
    }

    /// Deprecated alias of [`PbNode::into_bytes`].
    #[deprecated(note = "renamed to `into_bytes`")]
    pub fn marshal(self) -> Box<[u8]> {
        self.into_bytes()
    }
}
