//! Streaming NBT (Named Binary Tag) writer.
//!
//! Tags are written straight into a byte buffer, big-endian, without
//! building a value tree first. The writer keeps a stack of open
//! compounds and lists so that every close is checked against what was
//! opened, and a list never receives more or fewer elements than it
//! declared.

use thiserror::Error;

/// NBT tag type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

/// Longest name or string payload the 2-byte length prefix allows.
pub const MAX_STRING_LEN: usize = 32767;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NbtError {
    #[error("close of a {found:?} while the innermost open node is {open:?}")]
    UnbalancedClose { found: Tag, open: Option<Tag> },
    #[error("named tag {name:?} written inside a list")]
    NamedInList { name: String },
    #[error("unnamed {found:?} element outside of a list")]
    ElementOutsideList { found: Tag },
    #[error("{found:?} element written to a list of {declared:?}")]
    WrongElementType { declared: Tag, found: Tag },
    #[error("list of {declared:?} already holds its {len} declared elements")]
    ListOverflow { declared: Tag, len: usize },
    #[error("list closed with {remaining} of its elements missing")]
    ListIncomplete { remaining: usize },
    #[error("document finished with {depth} node(s) still open")]
    Unclosed { depth: usize },
    #[error("string of {len} bytes exceeds 32767")]
    StringTooLong { len: usize },
    #[error("array of {len} elements exceeds i32::MAX")]
    ArrayTooLong { len: usize },
}

pub type Result<T> = std::result::Result<T, NbtError>;

#[derive(Debug)]
enum Frame {
    Compound,
    List { kind: Tag, len: usize, remaining: usize },
}

/// Append-only NBT builder.
///
/// Named writes (`byte`, `int`, `compound`, ...) are valid at the top
/// level and inside compounds. Inside a list only the `push_*` element
/// writers are accepted, and only for the declared element type.
#[derive(Debug, Default)]
pub struct NbtWriter {
    out: Vec<u8>,
    stack: Vec<Frame>,
}

impl NbtWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            stack: Vec::new(),
        }
    }

    /// Returns the encoded document. Fails if anything is still open.
    pub fn finish(self) -> Result<Vec<u8>> {
        if !self.stack.is_empty() {
            return Err(NbtError::Unclosed { depth: self.stack.len() });
        }
        Ok(self.out)
    }

    /// Writes a tag header. Nothing is written unless the whole header is valid.
    fn header(&mut self, kind: Tag, name: &str) -> Result<()> {
        if let Some(Frame::List { .. }) = self.stack.last() {
            return Err(NbtError::NamedInList { name: name.to_string() });
        }
        check_string(name)?;
        self.out.push(kind as u8);
        self.raw_string(name)
    }

    fn element(&mut self, found: Tag) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::List { kind, len, remaining }) => {
                if *kind != found {
                    return Err(NbtError::WrongElementType { declared: *kind, found });
                }
                if *remaining == 0 {
                    return Err(NbtError::ListOverflow { declared: *kind, len: *len });
                }
                *remaining -= 1;
                Ok(())
            }
            _ => Err(NbtError::ElementOutsideList { found }),
        }
    }

    fn raw_string(&mut self, value: &str) -> Result<()> {
        check_string(value)?;
        self.out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.out.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn array_length(&mut self, len: usize) -> Result<()> {
        check_array(len)?;
        self.out.extend_from_slice(&(len as i32).to_be_bytes());
        Ok(())
    }

    // --- named scalars ---

    pub fn byte(&mut self, name: &str, value: i8) -> Result<&mut Self> {
        self.header(Tag::Byte, name)?;
        self.out.push(value as u8);
        Ok(self)
    }

    pub fn bool(&mut self, name: &str, value: bool) -> Result<&mut Self> {
        self.byte(name, value as i8)
    }

    pub fn short(&mut self, name: &str, value: i16) -> Result<&mut Self> {
        self.header(Tag::Short, name)?;
        self.out.extend_from_slice(&value.to_be_bytes());
        Ok(self)
    }

    pub fn int(&mut self, name: &str, value: i32) -> Result<&mut Self> {
        self.header(Tag::Int, name)?;
        self.out.extend_from_slice(&value.to_be_bytes());
        Ok(self)
    }

    pub fn long(&mut self, name: &str, value: i64) -> Result<&mut Self> {
        self.header(Tag::Long, name)?;
        self.out.extend_from_slice(&value.to_be_bytes());
        Ok(self)
    }

    pub fn string(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        self.header(Tag::String, name)?;
        self.raw_string(value)?;
        Ok(self)
    }

    // --- named arrays ---

    pub fn byte_array(&mut self, name: &str, value: &[u8]) -> Result<&mut Self> {
        check_array(value.len())?;
        self.header(Tag::ByteArray, name)?;
        self.array_length(value.len())?;
        self.out.extend_from_slice(value);
        Ok(self)
    }

    pub fn int_array(&mut self, name: &str, value: &[i32]) -> Result<&mut Self> {
        check_array(value.len())?;
        self.header(Tag::IntArray, name)?;
        self.array_length(value.len())?;
        for entry in value {
            self.out.extend_from_slice(&entry.to_be_bytes());
        }
        Ok(self)
    }

    // --- structure ---

    /// Opens a named compound. Use an empty name for the document root.
    pub fn begin_compound(&mut self, name: &str) -> Result<&mut Self> {
        self.header(Tag::Compound, name)?;
        self.stack.push(Frame::Compound);
        Ok(self)
    }

    /// Opens an unnamed compound as the next element of a compound list.
    pub fn push_compound(&mut self) -> Result<&mut Self> {
        self.element(Tag::Compound)?;
        self.stack.push(Frame::Compound);
        Ok(self)
    }

    /// Closes the innermost compound, named or list element alike.
    pub fn end_compound(&mut self) -> Result<&mut Self> {
        match self.stack.last() {
            Some(Frame::Compound) => {
                self.stack.pop();
                self.out.push(Tag::End as u8);
                Ok(self)
            }
            Some(Frame::List { .. }) => Err(NbtError::UnbalancedClose {
                found: Tag::Compound,
                open: Some(Tag::List),
            }),
            None => Err(NbtError::UnbalancedClose { found: Tag::Compound, open: None }),
        }
    }

    /// Opens a named list of `len` elements of type `kind`.
    ///
    /// An empty list still carries `kind` on disk.
    pub fn begin_list(&mut self, name: &str, kind: Tag, len: usize) -> Result<&mut Self> {
        check_array(len)?;
        self.header(Tag::List, name)?;
        self.out.push(kind as u8);
        self.array_length(len)?;
        self.stack.push(Frame::List { kind, len, remaining: len });
        Ok(self)
    }

    /// Closes the innermost list. All declared elements must have been written.
    pub fn end_list(&mut self) -> Result<&mut Self> {
        match self.stack.last() {
            Some(Frame::List { remaining: 0, .. }) => {
                self.stack.pop();
                Ok(self)
            }
            Some(Frame::List { remaining, .. }) => Err(NbtError::ListIncomplete { remaining: *remaining }),
            Some(Frame::Compound) => Err(NbtError::UnbalancedClose {
                found: Tag::List,
                open: Some(Tag::Compound),
            }),
            None => Err(NbtError::UnbalancedClose { found: Tag::List, open: None }),
        }
    }

    // --- unnamed list elements ---

    pub fn push_byte(&mut self, value: i8) -> Result<&mut Self> {
        self.element(Tag::Byte)?;
        self.out.push(value as u8);
        Ok(self)
    }

    pub fn push_int(&mut self, value: i32) -> Result<&mut Self> {
        self.element(Tag::Int)?;
        self.out.extend_from_slice(&value.to_be_bytes());
        Ok(self)
    }

    // --- scoped helpers ---

    /// Writes a named compound whose body is filled by `body`.
    pub fn compound<F>(&mut self, name: &str, body: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.begin_compound(name)?;
        body(self)?;
        self.end_compound()
    }

    /// Writes a named list of compounds, calling `element` once per index.
    pub fn compound_list<F>(&mut self, name: &str, len: usize, mut element: F) -> Result<&mut Self>
    where
        F: FnMut(&mut Self, usize) -> Result<()>,
    {
        self.begin_list(name, Tag::Compound, len)?;
        for index in 0..len {
            self.push_compound()?;
            element(self, index)?;
            self.end_compound()?;
        }
        self.end_list()
    }
}

fn check_string(value: &str) -> Result<()> {
    if value.len() > MAX_STRING_LEN {
        return Err(NbtError::StringTooLong { len: value.len() });
    }
    Ok(())
}

fn check_array(len: usize) -> Result<()> {
    if len > i32::MAX as usize {
        return Err(NbtError::ArrayTooLong { len });
    }
    Ok(())
}

/// Writes a whole document rooted at an unnamed compound.
pub fn write_document<F>(capacity: usize, body: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut NbtWriter) -> Result<()>,
{
    let mut writer = NbtWriter::with_capacity(capacity);
    writer.compound("", body)?;
    writer.finish()
}
