//! Encoding of modules into the binary layout.
//!
//! Encoding is infallible apart from sink I/O errors. Section bodies are
//! staged in a scratch buffer so the body length is known before the body is
//! emitted; the buffer is reused across sections of one module.

use crate::ident::IdStr;
use crate::module::Module;
use crate::section::{Metadata, ModuleName, Section};
use crate::varint;
use std::io::{Error, ErrorKind, Result, Write};

pub(crate) fn write_module<W: Write>(module: &Module, mut out: W) -> Result<()> {
    out.write_all(crate::binary::MAGIC)?;

    let version = module.version().version();
    out.write_all(&[version.major, version.minor])?;

    write_len(&mut out, module.sections().len())?;
    let mut body = Vec::new();
    for section in module.sections() {
        write_section(&mut out, section, &mut body)?;
    }

    log::trace!("encoded module with {} section(s)", module.sections().len());
    out.flush()
}

fn write_section<W: Write>(out: &mut W, section: &Section, body: &mut Vec<u8>) -> Result<()> {
    body.clear();
    match section {
        Section::Metadata(entries) => {
            write_len(body, entries.len())?;
            for entry in entries {
                write_metadata(body, entry)?;
            }
        }
    }

    out.write_all(&[section.kind().tag()])?;
    write_len(out, body.len())?;
    out.write_all(body)
}

fn write_metadata<W: Write>(out: &mut W, entry: &Metadata) -> Result<()> {
    out.write_all(&[entry.kind().tag()])?;
    match entry {
        Metadata::Name(name) => write_module_name(out, name),
    }
}

fn write_module_name<W: Write>(out: &mut W, name: &ModuleName) -> Result<()> {
    write_ident(out, name.ident())?;
    // Reserved slot for a version stamp next to the name.
    varint::write_u32(out, 0)
}

fn write_ident<W: Write>(out: &mut W, ident: &IdStr) -> Result<()> {
    write_len(out, ident.len())?;
    out.write_all(ident.as_bytes())
}

fn write_len<W: Write>(out: &mut W, length: usize) -> Result<()> {
    match u32::try_from(length) {
        Ok(value) => varint::write_u32(out, value),
        Err(_) => Err(Error::new(
            ErrorKind::InvalidInput,
            format!("length {length} exceeds the maximum encodable size"),
        )),
    }
}
