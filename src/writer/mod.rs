/*!
# Streaming emitter

Serialises tokens back into bytes, preserving the input's surface form
(quote styles, self-closing elements) where the token stream allows it.

The closing `>` of a start-element is not written until the next token
shows whether the element closes immediately: an end-element directly
after a start-element collapses to `/>`, anything else first emits the
pending `>`. This single token of lookahead reproduces self-closing
syntax without buffering whole elements.
*/
use std::io;

use bytes::{BufMut, BytesMut};
use log::trace;

use crate::error::{Error, Result};
use crate::middleware::Middleware;
use crate::token::{Arena, Name, Token, TokenKind};

/// Bytes buffered before spilling to the sink.
const SPILL_THRESHOLD: usize = 2048;

/// Buffered token serialiser with a pluggable rewriting stage.
///
/// The emitter is generic over its [`Middleware`] so the caller keeps
/// typed access to it (see [`Emitter::middleware`]); `()` is the
/// identity middleware, and `(A, B)` chains two stages.
///
/// ```
/// use saxmin::{Arena, Emitter, Name, Token, TokenKind};
///
/// let arena = Arena::new();
/// let mut out = Vec::new();
/// let mut emitter = Emitter::new(&mut out);
/// let mut token = Token::new();
/// token.kind = TokenKind::StartElement;
/// token.name = Name::unprefixed("a");
/// emitter.encode_token(&mut token, &arena).unwrap();
/// token.kind = TokenKind::EndElement;
/// emitter.encode_token(&mut token, &arena).unwrap();
/// emitter.flush().unwrap();
/// drop(emitter);
/// assert_eq!(out, b"<a/>");
/// ```
pub struct Emitter<W, M = ()> {
	w: W,
	buf: BytesMut,

	// whether the last token was a start-element, used to delay the
	// closing ">" or "/>" until the next token disambiguates
	last_start_element: bool,

	middleware: M,
}

impl<W: io::Write> Emitter<W, ()> {
	/// Create an emitter without a rewriting stage.
	pub fn new(w: W) -> Emitter<W, ()> {
		Self::with_middleware(w, ())
	}
}

impl<W: io::Write, M: Middleware> Emitter<W, M> {
	pub fn with_middleware(w: W, middleware: M) -> Emitter<W, M> {
		Emitter {
			w,
			buf: BytesMut::with_capacity(SPILL_THRESHOLD),
			last_start_element: false,
			middleware,
		}
	}

	pub fn middleware(&self) -> &M {
		&self.middleware
	}

	pub fn middleware_mut(&mut self) -> &mut M {
		&mut self.middleware
	}

	/// Rebind the sink, drop buffered output and reset the middleware.
	pub fn reset(&mut self, w: W) {
		trace!("emitter reset");
		self.w = w;
		self.buf.clear();
		self.last_start_element = false;
		self.middleware.reset();
	}

	/// Serialise a single token, running the middleware first for
	/// start-elements and around the self-close decision for
	/// end-elements.
	///
	/// The arena is the one backing the token's byte slices, usually
	/// [`Lexer::arena`]; injected tokens built from static slices work
	/// with any arena.
	///
	///    [`Lexer::arena`]: crate::Lexer::arena
	pub fn encode_token(&mut self, t: &mut Token, arena: &Arena) -> Result<()> {
		match t.kind {
			TokenKind::StartElement => {
				self.encode_start_element(t, arena)?;
				self.last_start_element = true;
			}
			TokenKind::EndElement => {
				self.encode_end_element(t, arena)?;
				self.last_start_element = false;
			}
			TokenKind::Text => {
				self.end_last_start_element();
				self.buf.put_slice(t.data.bytes(arena));
				self.last_start_element = false;
			}
			TokenKind::ProcInst => {
				self.end_last_start_element();
				self.buf.put_slice(b"<?");
				self.put_name(&t.name, arena);
				self.buf.put_u8(b' ');
				self.buf.put_slice(t.data.bytes(arena));
				self.buf.put_slice(b"?>");
				self.last_start_element = false;
			}
			TokenKind::Directive => {
				self.end_last_start_element();
				self.buf.put_slice(t.data.bytes(arena));
				self.last_start_element = false;
			}
			TokenKind::CharData => {
				self.last_start_element = false;
				return Err(Error::NotYetImplemented("character data tokens"));
			}
			TokenKind::Invalid => {
				self.last_start_element = false;
				return Err(Error::InvalidXml("token of invalid kind"));
			}
		}
		self.spill()
	}

	fn encode_start_element(&mut self, t: &mut Token, arena: &Arena) -> Result<()> {
		self.end_last_start_element();
		self.buf.put_u8(b'<');

		// middlewares may rewrite the name and the attribute list
		self.middleware.encode_token(t, arena)?;

		self.put_name(&t.name, arena);
		for attr in &t.attrs {
			self.buf.put_u8(b' ');
			self.put_name(&attr.name, arena);
			self.buf.put_u8(b'=');
			let q = if attr.single_quote { b'\'' } else { b'"' };
			self.buf.put_u8(q);
			self.buf.put_slice(attr.value.bytes(arena));
			self.buf.put_u8(q);
		}

		// the closing ">" or "/>" is written once the next token shows
		// whether the element closes immediately
		Ok(())
	}

	fn encode_end_element(&mut self, t: &mut Token, arena: &Arena) -> Result<()> {
		if self.last_start_element {
			// nothing was emitted since the start-element, so this can
			// only be its own end: collapse to "/>". The middleware
			// still runs to pop its scope.
			self.buf.put_slice(b"/>");
			return self.middleware.encode_token(t, arena);
		}

		self.middleware.encode_token(t, arena)?;
		self.buf.put_slice(b"</");
		self.put_name(&t.name, arena);
		self.buf.put_u8(b'>');
		Ok(())
	}

	fn end_last_start_element(&mut self) {
		if self.last_start_element {
			self.buf.put_u8(b'>');
		}
	}

	fn put_name(&mut self, name: &Name, arena: &Arena) {
		if !name.prefix.is_empty() {
			self.buf.put_slice(name.prefix.bytes(arena));
			self.buf.put_u8(b':');
		}
		self.buf.put_slice(name.local.bytes(arena));
	}

	fn spill(&mut self) -> Result<()> {
		if self.buf.len() >= SPILL_THRESHOLD {
			self.drain()?;
		}
		Ok(())
	}

	fn drain(&mut self) -> Result<()> {
		if !self.buf.is_empty() {
			self.w.write_all(&self.buf).map_err(Error::io)?;
			self.buf.clear();
		}
		Ok(())
	}

	/// Write out all buffered bytes and flush the sink.
	///
	/// Mandatory as the final call; until then output may sit in the
	/// internal buffer.
	pub fn flush(&mut self) -> Result<()> {
		self.drain()?;
		self.w.flush().map_err(Error::io)
	}
}
