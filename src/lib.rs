//! Protobuf codec.
//!
//! Implements the DAG-PB codec (multicodec `0x70`): a strict, canonical
//! protobuf encoding of a node carrying an opaque data blob and a name
//! sorted list of links to other blocks. Any valid block re-encodes to the
//! exact bytes it was decoded from, and any node encodes to the same bytes
//! no matter how its links were ordered when it was built.
#![deny(missing_docs)]
#![deny(warnings)]

pub use crate::codec::{PbLink, PbNode};
use core::convert::{TryFrom, TryInto};
use libipld_core::cid::Cid;
use libipld_core::codec::{Codec, Decode, Encode, References};
use libipld_core::error::{Result, UnsupportedCodec};
use libipld_core::ipld::Ipld;
use std::io::{Read, Seek, Write};

mod codec;
mod decode;
mod encode;
pub mod error;

/// Multicodec code of the DAG-PB codec.
pub const DAG_PB: u64 = 0x70;

/// Protobuf codec.
#[derive(Clone, Copy, Debug)]
pub struct DagPbCodec;

impl Codec for DagPbCodec {}

impl From<DagPbCodec> for u64 {
    fn from(_: DagPbCodec) -> Self {
        DAG_PB
    }
}

impl TryFrom<u64> for DagPbCodec {
    type Error = UnsupportedCodec;

    fn try_from(code: u64) -> core::result::Result<Self, Self::Error> {
        if code == DAG_PB {
            Ok(Self)
        } else {
            Err(UnsupportedCodec(code))
        }
    }
}

impl Encode<DagPbCodec> for Ipld {
    fn encode<W: Write>(&self, _: DagPbCodec, w: &mut W) -> Result<()> {
        let pb_node: PbNode = self.try_into()?;
        w.write_all(&pb_node.into_bytes())?;
        Ok(())
    }
}

impl<'a> Encode<DagPbCodec> for PbNode<'a> {
    fn encode<W: Write>(&self, _: DagPbCodec, w: &mut W) -> Result<()> {
        w.write_all(&self.clone().into_bytes())?;
        Ok(())
    }
}

impl Decode<DagPbCodec> for Ipld {
    fn decode<R: Read + Seek>(_: DagPbCodec, r: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        Ok(PbNode::from_bytes(&bytes)?.into())
    }
}

impl References<DagPbCodec> for Ipld {
    fn references<R: Read + Seek, E: Extend<Cid>>(
        _: DagPbCodec,
        r: &mut R,
        set: &mut E,
    ) -> Result<()> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        PbNode::links(&bytes, set)
    }
}

/// Link target prototype selected by [`with_pb_prototype`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkPrototype<T> {
    /// Decode the target through the schema typed [`PbNode`].
    Pb,
    /// Decode the target through the wrapped chooser's prototype.
    Other(T),
}

/// Wraps a link target prototype chooser so that any link whose cid declares
/// the DAG-PB multicodec resolves to the schema typed [`PbNode`] prototype.
pub fn with_pb_prototype<T, F>(chooser: F) -> impl Fn(&Cid) -> LinkPrototype<T>
where
    F: Fn(&Cid) -> T,
{
    move |cid| {
        if cid.codec() == DAG_PB {
            LinkPrototype::Pb
        } else {
            LinkPrototype::Other(chooser(cid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_decode() {
        let cid = Cid::try_from("QmWDtUQj38YLW8v3q4A6LwPn4vYKEbuKWpgSm6bjKW6Xfe").unwrap();
        let mut pb_link = BTreeMap::<String, Ipld>::new();
        pb_link.insert("Hash".to_string(), cid.into());
        pb_link.insert("Name".to_string(), "block".to_string().into());
        pb_link.insert("Tsize".to_string(), 13.into());

        let links: Vec<Ipld> = vec![pb_link.into()];
        let mut pb_node = BTreeMap::<String, Ipld>::new();
        pb_node.insert("Data".to_string(), b"Here is some data\n".to_vec().into());
        pb_node.insert("Links".to_string(), links.into());
        let data: Ipld = pb_node.into();

        let bytes = DagPbCodec.encode(&data).unwrap();
        let data2 = DagPbCodec.decode(&bytes).unwrap();
        assert_eq!(data, data2);
    }

    #[test]
    fn codec_registration() {
        assert_eq!(u64::from(DagPbCodec), 0x70);
        assert!(DagPbCodec::try_from(0x70).is_ok());
        assert_eq!(DagPbCodec::try_from(0x71).unwrap_err().0, 0x71);
    }

    #[test]
    fn prototype_chooser() {
        let chooser = with_pb_prototype(|_| "basic");
        let pb = Cid::try_from("QmWDtUQj38YLW8v3q4A6LwPn4vYKEbuKWpgSm6bjKW6Xfe").unwrap();
        let raw = Cid::try_from(&[0x01, 0x55, 0x00, 0x05, 0x00, 0x01, 0x02, 0x03, 0x04][..]).unwrap();
        assert_eq!(chooser(&pb), LinkPrototype::Pb);
        assert_eq!(chooser(&raw), LinkPrototype::Other("basic"));
    }
}
