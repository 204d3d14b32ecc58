/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Error types returned by this crate.
use std::fmt;
use std::fmt::{Debug, Formatter};

/// Errors that can occur during decoding.
///
/// Every failure the decoder can produce collapses into this single enum.
/// There is no partial-image recovery: any variant here means the decode
/// stopped and the caller gets nothing back.
#[non_exhaustive]
pub enum DecodeErrors {
    /// Image does not start with the SOI marker, is truncated, or otherwise
    /// violates the basic framing rules of the format.
    Format(String),
    /// Same as `Format`, but for messages that are known at compile time and
    /// hence don't need an allocation.
    FormatStatic(&'static str),
    /// A construct that is syntactically valid JPEG but that this decoder
    /// does not implement (extended sequential DCT, arithmetic coding, 12-bit
    /// precision, CMYK, and so on).
    Unsupported(String),
    /// A Huffman table is malformed or a decoded symbol does not correspond
    /// to a valid entry.
    HuffmanDecode(String),
    /// The DQT/DHT/SOF/SOS segments reference table ids or sampling factors
    /// that are outside of the legal range.
    DqtError(String),
    /// Error from an I/O operation performed while reading a file from disk.
    Io(String),
}

impl From<std::io::Error> for DecodeErrors {
    fn from(error: std::io::Error) -> Self {
        DecodeErrors::Io(error.to_string())
    }
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(reason) => writeln!(f, "Invalid JPEG: {reason}"),
            Self::FormatStatic(reason) => writeln!(f, "Invalid JPEG: {reason}"),
            Self::Unsupported(reason) => writeln!(f, "Unsupported JPEG feature: {reason}"),
            Self::HuffmanDecode(reason) => writeln!(f, "Huffman decoding error: {reason}"),
            Self::DqtError(reason) => writeln!(f, "Invalid quantization/Huffman table: {reason}"),
            Self::Io(reason) => writeln!(f, "I/O error: {reason}"),
        }
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for DecodeErrors {}
