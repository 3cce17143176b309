//! DAG-PB decoder.
//!
//! A hand rolled reader for the strict subset of the protobuf wire format
//! that DAG-PB blocks are allowed to use. Fields must appear in canonical
//! order, at most once, and nothing outside the schema is tolerated.
use core::convert::TryFrom;
use std::borrow::Cow;

use libipld_core::cid::Cid;
use libipld_core::error::Result;

use crate::codec::{PbLink, PbNode};
use crate::error::{
    BadLinkLength, DuplicateField, FieldOutOfOrder, MissingHash, UnexpectedEof, UnknownLinkField,
    UnknownNodeField, VarintOverflow, WrongWireType,
};

/// Reads an unsigned LEB128 varint, least significant group first.
fn read_varint(buf: &[u8], offset: &mut usize) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        if shift >= 64 {
            return Err(VarintOverflow.into());
        }
        let byte = *buf.get(*offset).ok_or(UnexpectedEof)?;
        *offset += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte < 0x80 {
            break;
        }
        shift += 7;
    }
    Ok(value)
}

/// Reads a field key, returning the field number and the wire type.
fn read_key(buf: &[u8], offset: &mut usize) -> Result<(u64, u64)> {
    let key = read_varint(buf, offset)?;
    Ok((key >> 3, key & 0x7))
}

/// Reads a length prefixed byte string.
fn read_bytes<'a>(buf: &'a [u8], offset: &mut usize) -> Result<&'a [u8]> {
    let len = usize::try_from(read_varint(buf, offset)?).map_err(|_| UnexpectedEof)?;
    let end = offset.checked_add(len).ok_or(UnexpectedEof)?;
    let bytes = buf.get(*offset..end).ok_or(UnexpectedEof)?;
    *offset = end;
    Ok(bytes)
}

impl PbLink {
    /// Parses a single link message. `buf` is exactly the declared body.
    fn unmarshal(buf: &[u8]) -> Result<Self> {
        let mut cid = None;
        let mut name = None;
        let mut size = None;
        let mut offset = 0;

        while offset < buf.len() {
            let (field, wire) = read_key(buf, &mut offset)?;
            match field {
                1 => {
                    if cid.is_some() {
                        return Err(DuplicateField("Hash").into());
                    }
                    if name.is_some() {
                        return Err(FieldOutOfOrder("Name before Hash").into());
                    }
                    if size.is_some() {
                        return Err(FieldOutOfOrder("Tsize before Hash").into());
                    }
                    if wire != 2 {
                        return Err(WrongWireType(wire).into());
                    }
                    cid = Some(Cid::try_from(read_bytes(buf, &mut offset)?)?);
                }
                2 => {
                    if name.is_some() {
                        return Err(DuplicateField("Name").into());
                    }
                    if size.is_some() {
                        return Err(FieldOutOfOrder("Tsize before Name").into());
                    }
                    if wire != 2 {
                        return Err(WrongWireType(wire).into());
                    }
                    let bytes = read_bytes(buf, &mut offset)?;
                    name = Some(std::str::from_utf8(bytes)?.to_string());
                }
                3 => {
                    if size.is_some() {
                        return Err(DuplicateField("Tsize").into());
                    }
                    if wire != 0 {
                        return Err(WrongWireType(wire).into());
                    }
                    size = Some(read_varint(buf, &mut offset)?);
                }
                field => return Err(UnknownLinkField(field).into()),
            }
        }

        Ok(PbLink {
            cid: cid.ok_or(MissingHash)?,
            name,
            size,
        })
    }
}

impl<'a> PbNode<'a> {
    /// Deserializes a `PbNode` from bytes.
    pub fn from_bytes(buf: &'a [u8]) -> Result<Self> {
        let mut links = Vec::new();
        let mut data = None;
        let mut offset = 0;

        while offset < buf.len() {
            let (field, wire) = read_key(buf, &mut offset)?;
            if wire != 2 {
                return Err(WrongWireType(wire).into());
            }
            match field {
                1 => {
                    if data.is_some() {
                        return Err(DuplicateField("Data").into());
                    }
                    data = Some(Cow::Borrowed(read_bytes(buf, &mut offset)?));
                }
                2 => {
                    if data.is_some() {
                        return Err(FieldOutOfOrder("Data before Links").into());
                    }
                    let chunk = read_bytes(buf, &mut offset)?;
                    // A link body ending mid field means its declared length
                    // was wrong, not that the input was truncated.
                    let link = PbLink::unmarshal(chunk).map_err(|e| {
                        if e.is::<UnexpectedEof>() {
                            BadLinkLength.into()
                        } else {
                            e
                        }
                    })?;
                    links.push(link);
                }
                field => return Err(UnknownNodeField(field).into()),
            }
        }

        Ok(PbNode { links, data })
    }

    pub(crate) fn links(bytes: &[u8], links: &mut impl Extend<Cid>) -> Result<()> {
        let node = PbNode::from_bytes(bytes)?;
        for link in node.links {
            links.extend(Some(link.cid));
        }
        Ok(())
    }

    /// Deprecated alias of [`PbNode::from_bytes`].
    #[deprecated(note = "renamed to `from_bytes`")]
    pub fn unmarshal(buf: &'a [u8]) -> Result<Self> {
        Self::from_bytes(buf)
    }
}
