//! DAG-PB node representation and its `Ipld` adapter.
use core::convert::TryFrom;
use std::borrow::Cow;
use std::collections::BTreeMap;

use libipld_core::cid::Cid;
use libipld_core::error::{Error, Result, TypeError, TypeErrorType};
use libipld_core::ipld::Ipld;

use crate::error::{MissingHash, MissingLinks, NegativeTsize};

/// A protobuf ipld link.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PbLink {
    /// Content identifier.
    pub cid: Cid,
    /// Name of the link.
    pub name: Option<String>,
    /// Cumulative size of the linked subtree.
    pub size: Option<u64>,
}

/// A protobuf ipld node.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PbNode<'a> {
    /// List of protobuf ipld links.
    pub links: Vec<PbLink>,
    /// Binary data blob.
    pub data: Option<Cow<'a, [u8]>>,
}

impl<'a> From<PbNode<'a>> for Ipld {
    fn from(node: PbNode) -> Self {
        let mut map = BTreeMap::<String, Ipld>::new();
        let links = node
            .links
            .into_iter()
            .map(|link| link.into())
            .collect::<Vec<Ipld>>();
        map.insert("Links".to_string(), links.into());
        if let Some(data) = node.data {
            map.insert("Data".to_string(), Ipld::Bytes(data.into_owned()));
        }
        map.into()
    }
}

impl From<PbLink> for Ipld {
    fn from(link: PbLink) -> Self {
        let mut map = BTreeMap::<String, Ipld>::new();
        map.insert("Hash".to_string(), link.cid.into());

        if let Some(name) = link.name {
            map.insert("Name".to_string(), name.into());
        }
        if let Some(size) = link.size {
            map.insert("Tsize".to_string(), size.into());
        }
        map.into()
    }
}

impl<'a> TryFrom<&'a Ipld> for PbNode<'a> {
    type Error = Error;

    fn try_from(ipld: &'a Ipld) -> Result<PbNode<'a>> {
        let map = match ipld {
            Ipld::Map(map) => map,
            _ => return Err(TypeError::new(TypeErrorType::Map, ipld).into()),
        };

        let links = match map.get("Links") {
            Some(Ipld::List(links)) => links
                .iter()
                .map(PbLink::try_from)
                .collect::<Result<_, _>>()?,
            Some(ipld) => return Err(TypeError::new(TypeErrorType::List, ipld).into()),
            None => return Err(MissingLinks.into()),
        };
        let data = match map.get("Data") {
            Some(Ipld::Bytes(data)) => Some(Cow::Borrowed(&data[..])),
            Some(ipld) => return Err(TypeError::new(TypeErrorType::Bytes, ipld).into()),
            None => None,
        };

        Ok(PbNode { links, data })
    }
}

impl TryFrom<&Ipld> for PbLink {
    type Error = Error;

    fn try_from(ipld: &Ipld) -> Result<PbLink> {
        let map = match ipld {
            Ipld::Map(map) => map,
            _ => return Err(TypeError::new(TypeErrorType::Map, ipld).into()),
        };

        let cid = match map.get("Hash") {
            Some(Ipld::Link(cid)) => *cid,
            Some(ipld) => return Err(TypeError::new(TypeErrorType::Link, ipld).into()),
            None => return Err(MissingHash.into()),
        };
        let name = match map.get("Name") {
            Some(Ipld::String(name)) => Some(name.clone()),
            Some(ipld) => return Err(TypeError::new(TypeErrorType::String, ipld).into()),
            None => None,
        };
        let size = match map.get("Tsize") {
            Some(Ipld::Integer(size)) if *size < 0 => return Err(NegativeTsize.into()),
            Some(ipld @ Ipld::Integer(size)) => {
                Some(u64::try_from(*size).map_err(|_| TypeError::new(TypeErrorType::Integer, ipld))?)
            }
            Some(ipld) => return Err(TypeError::new(TypeErrorType::Integer, ipld).into()),
            None => None,
        };

        Ok(PbLink { cid, name, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid() -> Cid {
        Cid::try_from(&[0x01, 0x55, 0x00, 0x05, 0x00, 0x01, 0x02, 0x03, 0x04][..]).unwrap()
    }

    fn link_map(hash: Option<Ipld>, name: Option<Ipld>, size: Option<Ipld>) -> Ipld {
        let mut map = BTreeMap::<String, Ipld>::new();
        if let Some(hash) = hash {
            map.insert("Hash".to_string(), hash);
        }
        if let Some(name) = name {
            map.insert("Name".to_string(), name);
        }
        if let Some(size) = size {
            map.insert("Tsize".to_string(), size);
        }
        map.into()
    }

    fn node_map(links: Option<Ipld>, data: Option<Ipld>) -> Ipld {
        let mut map = BTreeMap::<String, Ipld>::new();
        if let Some(links) = links {
            map.insert("Links".to_string(), links);
        }
        if let Some(data) = data {
            map.insert("Data".to_string(), data);
        }
        map.into()
    }

    #[test]
    fn node_requires_map() {
        let err = PbNode::try_from(&Ipld::Integer(0)).unwrap_err();
        assert!(err.is::<TypeError>());
    }

    #[test]
    fn node_requires_links() {
        let err = PbNode::try_from(&node_map(None, None)).unwrap_err();
        assert!(err.is::<MissingLinks>());

        let err = PbNode::try_from(&node_map(Some(Ipld::Bytes(vec![])), None)).unwrap_err();
        assert!(err.is::<TypeError>());
    }

    #[test]
    fn node_data_must_be_bytes() {
        let node = node_map(Some(Ipld::List(vec![])), Some(Ipld::String("data".into())));
        let err = PbNode::try_from(&node).unwrap_err();
        assert!(err.is::<TypeError>());
    }

    #[test]
    fn link_requires_hash() {
        let links = Ipld::List(vec![link_map(None, None, None)]);
        let err = PbNode::try_from(&node_map(Some(links), None)).unwrap_err();
        assert!(err.is::<MissingHash>());
    }

    #[test]
    fn link_rejects_negative_tsize() {
        let links = Ipld::List(vec![link_map(
            Some(cid().into()),
            None,
            Some(Ipld::Integer(-1)),
        )]);
        let err = PbNode::try_from(&node_map(Some(links), None)).unwrap_err();
        assert!(err.is::<NegativeTsize>());
    }

    #[test]
    fn link_rejects_oversized_tsize() {
        let links = Ipld::List(vec![link_map(
            Some(cid().into()),
            None,
            Some(Ipld::Integer(u64::MAX as i128 + 1)),
        )]);
        let err = PbNode::try_from(&node_map(Some(links), None)).unwrap_err();
        assert!(err.is::<TypeError>());
    }

    #[test]
    fn link_kind_checks() {
        let links = Ipld::List(vec![link_map(Some(Ipld::Bytes(vec![1])), None, None)]);
        let err = PbNode::try_from(&node_map(Some(links), None)).unwrap_err();
        assert!(err.is::<TypeError>());

        let links = Ipld::List(vec![link_map(
            Some(cid().into()),
            Some(Ipld::Integer(1)),
            None,
        )]);
        let err = PbNode::try_from(&node_map(Some(links), None)).unwrap_err();
        assert!(err.is::<TypeError>());
    }

    #[test]
    fn absent_fields_stay_absent() {
        let node = PbNode {
            links: vec![PbLink {
                cid: cid(),
                name: None,
                size: None,
            }],
            data: None,
        };
        if let Ipld::Map(map) = Ipld::from(node) {
            assert!(!map.contains_key("Data"));
            if let Some(Ipld::List(links)) = map.get("Links") {
                if let Ipld::Map(link) = &links[0] {
                    assert!(link.contains_key("Hash"));
                    assert!(!link.contains_key("Name"));
                    assert!(!link.contains_key("Tsize"));
                } else {
                    panic!("link is not a map");
                }
            } else {
                panic!("links is not a list");
            }
        } else {
            panic!("node is not a map");
        }
    }

    #[test]
    fn empty_fields_stay_present() {
        let node = PbNode {
            links: vec![PbLink {
                cid: cid(),
                name: Some("".to_string()),
                size: Some(0),
            }],
            data: Some(Cow::Borrowed(&[][..])),
        };
        if let Ipld::Map(map) = Ipld::from(node) {
            assert_eq!(map.get("Data"), Some(&Ipld::Bytes(vec![])));
            if let Some(Ipld::List(links)) = map.get("Links") {
                if let Ipld::Map(link) = &links[0] {
                    assert_eq!(link.get("Name"), Some(&Ipld::String("".to_string())));
                    assert_eq!(link.get("Tsize"), Some(&Ipld::Integer(0)));
                } else {
                    panic!("link is not a map");
                }
            } else {
                panic!("links is not a list");
            }
        } else {
            panic!("node is not a map");
        }
    }
}
