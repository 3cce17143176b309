//! DAG-PB error types.
use thiserror::Error;

/// Input ended in the middle of a varint, a byte string or a link message.
#[derive(Debug, Error)]
#[error("Unexpected end of input.")]
pub struct UnexpectedEof;

/// Varint continued past the 64 bit range.
#[derive(Debug, Error)]
#[error("Varint overflow.")]
pub struct VarintOverflow;

/// Wire type of a field does not match the DAG-PB schema.
#[derive(Debug, Error)]
#[error("Unexpected wire type {0}.")]
pub struct WrongWireType(pub u64);

/// Field number without a meaning in a node message.
#[derive(Debug, Error)]
#[error("Unknown node field number {0}, expected 1 or 2.")]
pub struct UnknownNodeField(pub u64);

/// Field number without a meaning in a link message.
#[derive(Debug, Error)]
#[error("Unknown link field number {0}, expected 1, 2 or 3.")]
pub struct UnknownLinkField(pub u64);

/// The same field occurred twice in one message.
#[derive(Debug, Error)]
#[error("Duplicate {0} field.")]
pub struct DuplicateField(pub &'static str);

/// Fields occurred outside the canonical order.
#[derive(Debug, Error)]
#[error("Invalid field order, found {0}.")]
pub struct FieldOutOfOrder(pub &'static str);

/// A link message without a Hash field.
#[derive(Debug, Error)]
#[error("Link is missing a Hash field.")]
pub struct MissingHash;

/// A node presented for encoding without a Links list.
#[derive(Debug, Error)]
#[error("Links must be a list.")]
pub struct MissingLinks;

/// A negative Tsize presented for encoding.
#[derive(Debug, Error)]
#[error("Tsize must not be negative.")]
pub struct NegativeTsize;

/// Declared length of a link message cut one of its fields short.
#[derive(Debug, Error)]
#[error("Link length does not match its content.")]
pub struct BadLinkLength;
