//! Binary and XML serialization contract.
//!
//! Every data type in the crate implements both traits:
//!
//! - [`BinarySerializable`] – a fixed, order-dependent sequence of primitives
//!   (see [`binary`] for the encoding table). No magic header; a stream is the
//!   concatenated output of the root object.
//! - [`XmlSerializable`] – a canonical element named after the type, with
//!   attributes for scalars and child elements for structured fields.
//!
//! Loading never mutates the target on failure: values are decoded into a
//! fresh instance and swapped in only when decoding succeeds. Failures are
//! logged and returned as [`SerializeError`]s.
//!
//! # Round-trip invariant
//!
//! For any valid `x`, both `T::from_bytes(&x.to_bytes()?)` and
//! `T::from_xml_str(&x.to_xml())` yield a value equal to `x`.

pub mod binary;
pub mod xml;

use std::io::{Cursor, Read, Write};

use log::error;

use crate::error::{SerializeError, SerializeResult};

pub use binary::{BinaryReader, BinaryWriter};
pub use xml::{XmlElement, XmlNode};

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Binary stream persistence.
pub trait BinarySerializable: Sized {
    /// Write this value's fields in their fixed order.
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()>;

    /// Decode a fresh value from the stream.
    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self>;

    /// Write to a stream, logging any failure.
    fn save_to_stream<W: Write>(&self, out: &mut W) -> SerializeResult<()> {
        let mut writer = BinaryWriter::new(out);
        self.write_binary(&mut writer)
            .and_then(|_| writer.flush())
            .inspect_err(|e| error!("Failed to save {}: {e}", short_type_name::<Self>()))
    }

    /// Replace `self` with a value read from a stream.
    ///
    /// On failure `self` keeps its previous state.
    fn load_from_stream<R: Read>(&mut self, input: &mut R) -> SerializeResult<()> {
        *self = Self::from_stream(input)?;
        Ok(())
    }

    /// Decode a value from a stream, logging any failure.
    fn from_stream<R: Read>(input: &mut R) -> SerializeResult<Self> {
        Self::read_binary(&mut BinaryReader::new(input))
            .inspect_err(|e| error!("Failed to load {}: {e}", short_type_name::<Self>()))
    }

    fn to_bytes(&self) -> SerializeResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.save_to_stream(&mut bytes)?;
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> SerializeResult<Self> {
        Self::from_stream(&mut Cursor::new(bytes))
    }
}

/// XML persistence.
pub trait XmlSerializable: Sized {
    /// Element name, equal to the type's stable name.
    const ELEMENT: &'static str;

    fn to_element(&self) -> XmlElement;

    /// Decode a fresh value from an element named [`Self::ELEMENT`].
    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self>;

    /// Canonical XML fragment.
    fn to_xml(&self) -> String {
        self.to_element().to_string()
    }

    /// Replace `self` with the value described by `node`.
    ///
    /// On failure `self` keeps its previous state.
    fn load_from_xml(&mut self, node: XmlNode<'_, '_>) -> SerializeResult<()> {
        match Self::from_element(node) {
            Ok(value) => {
                *self = value;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load {} from xml: {e}", Self::ELEMENT);
                Err(e)
            }
        }
    }

    /// Parse a document or fragment whose root element is [`Self::ELEMENT`].
    fn from_xml_str(text: &str) -> SerializeResult<Self> {
        let doc = roxmltree::Document::parse(text).map_err(|e| {
            error!("Failed to parse {} xml: {e}", Self::ELEMENT);
            SerializeError::from(e)
        })?;
        Self::from_element(doc.root_element())
            .inspect_err(|e| error!("Failed to load {} from xml: {e}", Self::ELEMENT))
    }
}

/// Implements [`std::fmt::Display`] as the canonical XML fragment.
macro_rules! impl_xml_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::fmt::Display for $ty {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::fmt::Display::fmt(
                        &$crate::serialization::XmlSerializable::to_element(self),
                        f,
                    )
                }
            }
        )+
    };
}
pub(crate) use impl_xml_display;
