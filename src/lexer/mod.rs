/*!
# Pull lexer for the supported XML subset

The lexer is a zero-copy, single-pass tokeniser. It is deliberately
permissive: names are not validated against the XML `Name` production,
entities pass through verbatim, and documents are expected to be
well-formed SOAP-style payloads. Structural violations surface as
[`Error::InvalidXml`].

All token payload bytes are interned in the lexer's [`Arena`] inside a
per-element region: everything interned between a start-element and its
matching end-element is released once the end-element token has been
consumed. Callers must therefore not hold on to token slices across that
point.
*/
use std::io;

pub(crate) mod scan;

use log::trace;

use crate::error::{Error, Result};
use crate::reader::ByteReader;
use crate::token::{Arena, Attr, Name, Slice, Token, TokenKind};

/// Maximum number of simultaneously open elements.
pub const MAX_DEPTH: usize = 255;

/// Streaming tokeniser over a byte source.
///
/// ```
/// use saxmin::{Lexer, Token, TokenKind};
///
/// let mut lexer = Lexer::new(&b"<hello>World!</hello>"[..]);
/// let mut token = Token::new();
/// lexer.next_token(&mut token).unwrap();
/// assert_eq!(token.kind, TokenKind::StartElement);
/// assert_eq!(token.name.local.bytes(lexer.arena()), b"hello");
/// ```
pub struct Lexer<R> {
	rd: ByteReader<R>,
	arena: Arena,
	bb_offset: [u32; MAX_DEPTH + 1],
	preserve_whitespace: [bool; MAX_DEPTH + 1],
	top: u8,
	last_open: Name,
	last_start_element: bool,
	pending_pop: Option<u32>,
}

impl<R: io::Read> Lexer<R> {
	pub fn new(src: R) -> Lexer<R> {
		Lexer {
			rd: ByteReader::new(src),
			arena: Arena::new(),
			bb_offset: [0; MAX_DEPTH + 1],
			preserve_whitespace: [false; MAX_DEPTH + 1],
			top: 0,
			last_open: Name::default(),
			last_start_element: false,
			pending_pop: None,
		}
	}

	/// Rebind the lexer to a new byte source and drop all lexing state.
	pub fn reset(&mut self, src: R) {
		trace!("lexer reset");
		self.rd.reset(src);
		self.arena.clear();
		self.top = 0;
		self.preserve_whitespace[0] = false;
		self.last_open = Name::default();
		self.last_start_element = false;
		self.pending_pop = None;
	}

	/// The arena holding the byte payloads of the current tokens.
	pub fn arena(&self) -> &Arena {
		&self.arena
	}

	/// Decode the next token into `t`.
	///
	/// Only the fields relevant for the decoded [`TokenKind`] are
	/// written; the remaining fields may carry stale contents from
	/// earlier tokens. The caller should dispatch on `t.kind` and read
	/// only the fields for that kind.
	///
	/// Byte slices referenced by `t` stay valid until the matching
	/// end-element token has been consumed (for an end-element token:
	/// until the next call).
	///
	/// Normal end of input is reported as [`Error::EndOfStream`];
	/// callers pull tokens until then.
	pub fn next_token(&mut self, t: &mut Token) -> Result<()> {
		if let Some(mark) = self.pending_pop.take() {
			self.arena.rewind(mark as usize);
		}
		loop {
			let b = self.rd.read_byte()?;
			match b {
				b'>' if self.last_start_element => {
					// trailing '>' of the previous start-element's open
					// tag; the element can no longer self-close
					self.last_start_element = false;
				}
				b'/' if self.last_start_element => {
					// immediate "/>" close of the last start-element
					let b2 = self.rd.read_byte().map_err(|e| e.mid_token("in element header"))?;
					if b2 != b'>' {
						return Err(Error::InvalidXml("expected '>' after '/'"));
					}
					let name = self.last_open;
					return self.end_element(t, name);
				}
				b'<' => {
					let b2 = self.rd.read_byte().map_err(|e| e.mid_token("after '<'"))?;
					match b2 {
						b'?' => return self.read_proc_inst(t),
						b'!' => {
							let b3 = self.rd.read_byte().map_err(|e| e.mid_token("after '<!'"))?;
							match b3 {
								b'-' => self.skip_comment()?,
								b'[' => {
									// CDATA is recognised but unsupported;
									// fail before touching arena or stack
									return Err(Error::NotYetImplemented("CDATA section"));
								}
								_ => return Err(Error::InvalidXml("comment or CDATA expected")),
							}
						}
						b'/' => {
							let name = self.read_name()?;
							self.skip_whitespace("in end tag")?;
							let b3 = self.rd.read_byte().map_err(|e| e.mid_token("in end tag"))?;
							if b3 != b'>' {
								return Err(Error::InvalidXml("expected '>' in end tag"));
							}
							return self.end_element(t, name);
						}
						_ => {
							self.rd.unread_byte();
							return self.start_element(t);
						}
					}
				}
				_ => {
					self.rd.unread_byte();
					if self.read_text(t)? {
						return Ok(());
					}
					// whitespace-only run outside an xml:space="preserve"
					// scope, elided
				}
			}
		}
	}

	fn start_element(&mut self, t: &mut Token) -> Result<()> {
		if (self.top as usize) >= MAX_DEPTH {
			return Err(Error::StackOverflow);
		}
		self.top += 1;
		let top = self.top as usize;
		self.bb_offset[top] = self.arena.mark() as u32;
		self.preserve_whitespace[top] = self.preserve_whitespace[top - 1];
		let name = self.read_name()?;
		self.read_attributes(t)?;
		self.last_open = name;
		t.kind = TokenKind::StartElement;
		t.name = name;
		self.last_start_element = true;
		Ok(())
	}

	fn end_element(&mut self, t: &mut Token, name: Name) -> Result<()> {
		if self.top == 0 {
			return Err(Error::InvalidXml("end tag without open element"));
		}
		let top = self.top as usize;
		// the region is released on the next call, once the caller has
		// consumed this token
		self.pending_pop = Some(self.bb_offset[top]);
		self.top -= 1;
		t.kind = TokenKind::EndElement;
		t.name = name;
		self.last_start_element = false;
		Ok(())
	}

	/// Read `localOrPrefix [':' local]`, leaving the terminating
	/// separator unconsumed (a `:` is consumed).
	fn read_name(&mut self) -> Result<Name> {
		let first = self.read_simple_name()?;
		let b = self.rd.read_byte().map_err(|e| e.mid_token("in name"))?;
		if b == b':' {
			let local = self.read_simple_name()?;
			Ok(Name {
				prefix: first,
				local,
			})
		} else {
			self.rd.unread_byte();
			Ok(Name {
				prefix: Slice::EMPTY,
				local: first,
			})
		}
	}

	/// Read a run of name bytes up to (not including) the first
	/// separator byte.
	fn read_simple_name(&mut self) -> Result<Slice> {
		let mark = self.arena.mark();
		loop {
			let win = self.rd.window();
			if win.is_empty() {
				self.rd.fill().map_err(|e| e.mid_token("in name"))?;
				continue;
			}
			match scan::name_boundary(win) {
				Some(i) => {
					self.arena.extend(&win[..i]);
					self.rd.consume(i);
					return Ok(self.arena.slice_from(mark));
				}
				None => {
					self.arena.extend(win);
					let n = win.len();
					self.rd.consume(n);
				}
			}
		}
	}

	fn skip_whitespace(&mut self, ctx: &'static str) -> Result<()> {
		loop {
			let win = self.rd.window();
			if win.is_empty() {
				self.rd.fill().map_err(|e| e.mid_token(ctx))?;
				continue;
			}
			let len = win.len();
			let n = scan::whitespace_run(win);
			self.rd.consume(n);
			if n < len {
				return Ok(());
			}
		}
	}

	fn read_attributes(&mut self, t: &mut Token) -> Result<()> {
		t.attrs.clear();
		loop {
			self.skip_whitespace("in element header")?;
			let b = self.rd.read_byte().map_err(|e| e.mid_token("in element header"))?;
			match b {
				b'/' | b'>' => {
					self.rd.unread_byte();
					return Ok(());
				}
				_ => {
					self.rd.unread_byte();
					let attr = self.read_attribute()?;
					t.attrs.push(attr);
				}
			}
		}
	}

	/// Parse `name WS* '=' WS* quote value quote`. On return the next
	/// reader byte is the byte after the closing quote.
	fn read_attribute(&mut self) -> Result<Attr> {
		let name = self.read_name()?;
		self.skip_whitespace("in attribute")?;
		let b = self.rd.read_byte().map_err(|e| e.mid_token("in attribute"))?;
		if b != b'=' {
			return Err(Error::InvalidXml("expected '=' after attribute name"));
		}
		self.skip_whitespace("in attribute")?;
		let (value, single_quote) = self.read_quoted()?;
		// xml:space toggles whitespace preservation for this element's
		// subtree
		if name.prefix.bytes(&self.arena) == b"xml" && name.local.bytes(&self.arena) == b"space" {
			self.preserve_whitespace[self.top as usize] = value.bytes(&self.arena) == b"preserve";
		}
		Ok(Attr {
			name,
			value,
			single_quote,
		})
	}

	fn read_quoted(&mut self) -> Result<(Slice, bool)> {
		let q = self.rd.read_byte().map_err(|e| e.mid_token("in attribute value"))?;
		if q != b'"' && q != b'\'' {
			return Err(Error::InvalidXml("quoted attribute value expected"));
		}
		let mark = self.arena.mark();
		loop {
			let win = self.rd.window();
			if win.is_empty() {
				self.rd.fill().map_err(|e| e.mid_token("in attribute value"))?;
				continue;
			}
			match scan::find_byte(q, win) {
				Some(i) => {
					self.arena.extend(&win[..i]);
					// value bytes plus the closing quote
					self.rd.consume(i + 1);
					return Ok((self.arena.slice_from(mark), q == b'\''));
				}
				None => {
					self.arena.extend(win);
					let n = win.len();
					self.rd.consume(n);
				}
			}
		}
	}

	/// Read a text run up to the next `<`, which stays unconsumed.
	///
	/// Returns `false` if the run was whitespace-only outside an
	/// `xml:space="preserve"` scope and therefore produced no token.
	/// Running out of input inside text ends the stream cleanly: a
	/// trailing unterminated run is dropped.
	fn read_text(&mut self, t: &mut Token) -> Result<bool> {
		let mark = self.arena.mark();
		let mut only_whitespace = true;
		loop {
			let win = self.rd.window();
			if win.is_empty() {
				if let Err(e) = self.rd.fill() {
					self.arena.rewind(mark);
					return Err(e);
				}
				continue;
			}
			match scan::find_angle(win) {
				Some(i) => {
					only_whitespace = only_whitespace && scan::all_whitespace(&win[..i]);
					self.arena.extend(&win[..i]);
					self.rd.consume(i);
					if only_whitespace && !self.preserve_whitespace[self.top as usize] {
						self.arena.rewind(mark);
						return Ok(false);
					}
					t.kind = TokenKind::Text;
					t.data = self.arena.slice_from(mark);
					self.last_start_element = false;
					if self.top == 0 {
						// no enclosing element will ever release this
						// region; free it at the next call
						self.pending_pop = Some(mark as u32);
					}
					return Ok(true);
				}
				None => {
					only_whitespace = only_whitespace && scan::all_whitespace(win);
					self.arena.extend(win);
					let n = win.len();
					self.rd.consume(n);
				}
			}
		}
	}

	/// Read `<?name WS? body ?>`; the body keeps interior whitespace but
	/// is stripped of trailing whitespace.
	fn read_proc_inst(&mut self, t: &mut Token) -> Result<()> {
		let start = self.arena.mark();
		let name = self.read_name()?;
		self.skip_whitespace("in processing instruction")?;
		let mark = self.arena.mark();
		'body: loop {
			// copy up to and including the next '?'
			loop {
				let win = self.rd.window();
				if win.is_empty() {
					self.rd
						.fill()
						.map_err(|e| e.mid_token("in processing instruction"))?;
					continue;
				}
				match scan::find_byte(b'?', win) {
					Some(i) => {
						self.arena.extend(&win[..i]);
						self.rd.consume(i + 1);
						break;
					}
					None => {
						self.arena.extend(win);
						let n = win.len();
						self.rd.consume(n);
					}
				}
			}
			// a '?' is pending; '>' finishes the instruction, another
			// '?' stays armed
			loop {
				let b = self
					.rd
					.read_byte()
					.map_err(|e| e.mid_token("in processing instruction"))?;
				match b {
					b'>' => break 'body,
					b'?' => self.arena.push_byte(b'?'),
					_ => {
						self.arena.push_byte(b'?');
						self.arena.push_byte(b);
						continue 'body;
					}
				}
			}
		}
		let body = self.arena.bytes_from(mark);
		let mut keep = body.len();
		while keep > 0 && scan::is_whitespace(body[keep - 1]) {
			keep -= 1;
		}
		self.arena.rewind(mark + keep);
		t.kind = TokenKind::ProcInst;
		t.name = name;
		t.data = self.arena.slice_from(mark);
		self.last_start_element = false;
		if self.top == 0 {
			// outside any element the region would never be released;
			// free name and body at the next call
			self.pending_pop = Some(start as u32);
		}
		Ok(())
	}

	/// Skip over `<!-- ... -->` without emitting a token. The leading
	/// `<!-` has already been consumed.
	fn skip_comment(&mut self) -> Result<()> {
		// second '-' of "<!--"
		self.rd.read_byte().map_err(|e| e.mid_token("in comment"))?;
		loop {
			// find the next '-'
			loop {
				let win = self.rd.window();
				if win.is_empty() {
					self.rd.fill().map_err(|e| e.mid_token("in comment"))?;
					continue;
				}
				match scan::find_byte(b'-', win) {
					Some(i) => {
						self.rd.consume(i + 1);
						break;
					}
					None => {
						let n = win.len();
						self.rd.consume(n);
					}
				}
			}
			let b = self.rd.read_byte().map_err(|e| e.mid_token("in comment"))?;
			if b != b'-' {
				continue;
			}
			// inside a run of '-'; the first '>' ends the comment
			loop {
				let b = self.rd.read_byte().map_err(|e| e.mid_token("in comment"))?;
				match b {
					b'>' => return Ok(()),
					b'-' => (),
					_ => break,
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Owned snapshot of a token, for comparing against expectations
	/// after the arena has moved on.
	#[derive(Debug, PartialEq)]
	struct Tok {
		kind: TokenKind,
		prefix: String,
		local: String,
		attrs: Vec<(String, String, String, bool)>,
		data: String,
	}

	fn s(bytes: &[u8]) -> String {
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	fn own(t: &Token, arena: &Arena) -> Tok {
		let mut attrs = Vec::new();
		if t.kind == TokenKind::StartElement {
			for a in &t.attrs {
				attrs.push((
					s(a.name.prefix.bytes(arena)),
					s(a.name.local.bytes(arena)),
					s(a.value.bytes(arena)),
					a.single_quote,
				));
			}
		}
		Tok {
			kind: t.kind,
			prefix: match t.kind {
				TokenKind::StartElement | TokenKind::EndElement => s(t.name.prefix.bytes(arena)),
				_ => String::new(),
			},
			local: match t.kind {
				TokenKind::StartElement | TokenKind::EndElement | TokenKind::ProcInst => {
					s(t.name.local.bytes(arena))
				}
				_ => String::new(),
			},
			attrs,
			data: match t.kind {
				TokenKind::ProcInst | TokenKind::Text | TokenKind::Directive => {
					s(t.data.bytes(arena))
				}
				_ => String::new(),
			},
		}
	}

	fn lex_all(doc: &[u8]) -> (Vec<Tok>, Error) {
		let mut lexer = Lexer::new(doc);
		let mut t = Token::new();
		let mut out = Vec::new();
		loop {
			match lexer.next_token(&mut t) {
				Ok(()) => out.push(own(&t, lexer.arena())),
				Err(e) => return (out, e),
			}
		}
	}

	fn lex_ok(doc: &[u8]) -> Vec<Tok> {
		let (toks, err) = lex_all(doc);
		match err {
			Error::EndOfStream => toks,
			other => panic!("unexpected lex error: {:?}", other),
		}
	}

	fn start(local: &str) -> Tok {
		Tok {
			kind: TokenKind::StartElement,
			prefix: String::new(),
			local: local.into(),
			attrs: vec![],
			data: String::new(),
		}
	}

	fn start_attrs(local: &str, attrs: &[(&str, &str, &str, bool)]) -> Tok {
		Tok {
			attrs: attrs
				.iter()
				.map(|(p, l, v, q)| (p.to_string(), l.to_string(), v.to_string(), *q))
				.collect(),
			..start(local)
		}
	}

	fn end(local: &str) -> Tok {
		Tok {
			kind: TokenKind::EndElement,
			prefix: String::new(),
			local: local.into(),
			attrs: vec![],
			data: String::new(),
		}
	}

	fn text(data: &str) -> Tok {
		Tok {
			kind: TokenKind::Text,
			prefix: String::new(),
			local: String::new(),
			attrs: vec![],
			data: data.into(),
		}
	}

	#[test]
	fn lex_start_end() {
		assert_eq!(lex_ok(b"<a></a>"), vec![start("a"), end("a")]);
	}

	#[test]
	fn lex_start_text_end() {
		assert_eq!(
			lex_ok(b"<a>Hello, World!</a>"),
			vec![start("a"), text("Hello, World!"), end("a")]
		);
	}

	#[test]
	fn lex_self_closing() {
		assert_eq!(lex_ok(b"<a/>"), vec![start("a"), end("a")]);
	}

	#[test]
	fn lex_prefixed_start_end() {
		let toks = lex_ok(b"<ns1:a></ns1:a>");
		assert_eq!(toks.len(), 2);
		assert_eq!(toks[0].prefix, "ns1");
		assert_eq!(toks[0].local, "a");
		assert_eq!(toks[1].prefix, "ns1");
		assert_eq!(toks[1].local, "a");
	}

	#[test]
	fn lex_self_close_reuses_open_name() {
		let toks = lex_ok(b"<ns:a attr1=\"1\"/>");
		assert_eq!(toks[1].kind, TokenKind::EndElement);
		assert_eq!(toks[1].prefix, "ns");
		assert_eq!(toks[1].local, "a");
	}

	#[test]
	fn lex_nested_with_attributes() {
		assert_eq!(
			lex_ok(b"<a attr1=\"foo\"><b attr2=\"bar\"><c attr3=\"baz\"></c></b></a>"),
			vec![
				start_attrs("a", &[("", "attr1", "foo", false)]),
				start_attrs("b", &[("", "attr2", "bar", false)]),
				start_attrs("c", &[("", "attr3", "baz", false)]),
				end("c"),
				end("b"),
				end("a"),
			]
		);
	}

	#[test]
	fn lex_self_closing_siblings() {
		assert_eq!(
			lex_ok(b"<a><b1 attr21=\"bar1\" /><c11 attr311=\"baz11\" /></a>"),
			vec![
				start("a"),
				start_attrs("b1", &[("", "attr21", "bar1", false)]),
				end("b1"),
				start_attrs("c11", &[("", "attr311", "baz11", false)]),
				end("c11"),
				end("a"),
			]
		);
	}

	#[test]
	fn lex_attribute_quote_styles() {
		assert_eq!(
			lex_ok(b"<a one=\"d'ouble\" two='si\"ngle'/>"),
			vec![
				start_attrs(
					"a",
					&[
						("", "one", "d'ouble", false),
						("", "two", "si\"ngle", true),
					]
				),
				end("a"),
			]
		);
	}

	#[test]
	fn lex_attribute_whitespace_around_eq() {
		assert_eq!(
			lex_ok(b"<a   attr1 =  \"v\"  ></a>"),
			vec![start_attrs("a", &[("", "attr1", "v", false)]), end("a")]
		);
	}

	#[test]
	fn lex_prefixed_attribute() {
		assert_eq!(
			lex_ok(b"<a ns:attr='v'/>"),
			vec![start_attrs("a", &[("ns", "attr", "v", true)]), end("a")]
		);
	}

	#[test]
	fn lex_elides_whitespace_between_tags() {
		assert_eq!(
			lex_ok(b"<a>\n  <b/>\n</a>"),
			vec![start("a"), start("b"), end("b"), end("a")]
		);
	}

	#[test]
	fn lex_preserves_whitespace_with_xml_space() {
		assert_eq!(
			lex_ok(b"<a xml:space=\"preserve\">\n<b> </b>\n</a>"),
			vec![
				start_attrs("a", &[("xml", "space", "preserve", false)]),
				text("\n"),
				start("b"),
				text(" "),
				end("b"),
				text("\n"),
				end("a"),
			]
		);
	}

	#[test]
	fn lex_xml_space_default_clears_preservation() {
		assert_eq!(
			lex_ok(b"<a xml:space=\"preserve\"><b xml:space=\"default\"> </b>\n</a>"),
			vec![
				start_attrs("a", &[("xml", "space", "preserve", false)]),
				start_attrs("b", &[("xml", "space", "default", false)]),
				end("b"),
				text("\n"),
				end("a"),
			]
		);
	}

	#[test]
	fn lex_text_starting_with_slash() {
		assert_eq!(
			lex_ok(b"<a>/not-a-close</a>"),
			vec![start("a"), text("/not-a-close"), end("a")]
		);
	}

	#[test]
	fn lex_end_tag_with_trailing_whitespace() {
		assert_eq!(lex_ok(b"<a></a  >"), vec![start("a"), end("a")]);
	}

	#[test]
	fn lex_comment_is_dropped() {
		assert_eq!(
			lex_ok(b"<a><!-- one -- two -->x</a>"),
			vec![start("a"), text("x"), end("a")]
		);
	}

	#[test]
	fn lex_empty_comment() {
		assert_eq!(lex_ok(b"<a><!----></a>"), vec![start("a"), end("a")]);
	}

	#[test]
	fn lex_proc_inst() {
		let toks = lex_ok(b"<?xml version=\"1.0\"?><a/>");
		assert_eq!(toks[0].kind, TokenKind::ProcInst);
		assert_eq!(toks[0].local, "xml");
		assert_eq!(toks[0].data, "version=\"1.0\"");
	}

	#[test]
	fn lex_proc_inst_strips_trailing_whitespace_only() {
		let toks = lex_ok(b"<?xml    version    =   \"1.0\"   ?><a/>");
		assert_eq!(toks[0].data, "version    =   \"1.0\"");
	}

	#[test]
	fn lex_proc_inst_with_question_marks_in_body() {
		let toks = lex_ok(b"<?pi a?b??><a/>");
		assert_eq!(toks[0].data, "a?b?");
	}

	#[test]
	fn lex_cdata_is_not_implemented() {
		let (_, err) = lex_all(b"<a><![CDATA[x]]></a>");
		match err {
			Error::NotYetImplemented("CDATA section") => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn lex_rejects_bad_markup_declaration() {
		let (_, err) = lex_all(b"<a><!DOCTYPE foo></a>");
		match err {
			Error::InvalidXml("comment or CDATA expected") => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn lex_rejects_missing_eq_after_attribute_name() {
		let (_, err) = lex_all(b"<a attr \"v\"/>");
		match err {
			Error::InvalidXml("expected '=' after attribute name") => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn lex_rejects_unquoted_attribute_value() {
		let (_, err) = lex_all(b"<a attr=v/>");
		match err {
			Error::InvalidXml("quoted attribute value expected") => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn lex_rejects_stray_end_tag() {
		let (_, err) = lex_all(b"</a>");
		match err {
			Error::InvalidXml("end tag without open element") => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn lex_truncated_header_is_unexpected_eof() {
		let (_, err) = lex_all(b"<a attr=\"unterminated");
		match err {
			Error::UnexpectedEof("in attribute value") => (),
			other => panic!("unexpected error: {:?}", other),
		}
		let (_, err) = lex_all(b"<a ");
		match err {
			Error::UnexpectedEof("in element header") => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn lex_trailing_text_ends_stream_cleanly() {
		let (toks, err) = lex_all(b"<a/>trailing");
		match err {
			Error::EndOfStream => (),
			other => panic!("unexpected error: {:?}", other),
		}
		assert_eq!(toks, vec![start("a"), end("a")]);
	}

	#[test]
	fn lex_nesting_at_limit_succeeds() {
		let mut doc = Vec::new();
		for _ in 0..MAX_DEPTH {
			doc.extend_from_slice(b"<d>");
		}
		for _ in 0..MAX_DEPTH {
			doc.extend_from_slice(b"</d>");
		}
		let toks = lex_ok(&doc);
		assert_eq!(toks.len(), 2 * MAX_DEPTH);
	}

	#[test]
	fn lex_nesting_beyond_limit_overflows() {
		let mut doc = Vec::new();
		for _ in 0..(MAX_DEPTH + 1) {
			doc.extend_from_slice(b"<d>");
		}
		let (_, err) = lex_all(&doc);
		match err {
			Error::StackOverflow => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn lex_text_spanning_buffer_boundary() {
		let body = "y".repeat(3 * crate::reader::BUF_SIZE);
		let doc = format!("<a>{}</a>", body);
		assert_eq!(
			lex_ok(doc.as_bytes()),
			vec![start("a"), text(&body), end("a")]
		);
	}

	#[test]
	fn lex_name_spanning_buffer_boundary() {
		let name = "n".repeat(crate::reader::BUF_SIZE + 17);
		let doc = format!("<{}></{}>", name, name);
		let toks = lex_ok(doc.as_bytes());
		assert_eq!(toks[0].local, name);
		assert_eq!(toks[1].local, name);
	}

	#[test]
	fn lex_one_byte_at_a_time_source() {
		struct Trickle(Vec<u8>, usize);
		impl std::io::Read for Trickle {
			fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
				if self.1 >= self.0.len() || buf.is_empty() {
					return Ok(0);
				}
				buf[0] = self.0[self.1];
				self.1 += 1;
				Ok(1)
			}
		}
		let doc = b"<ns:a xmlns:ns='u'><b attr=\"v\">text</b></ns:a>".to_vec();
		let mut lexer = Lexer::new(Trickle(doc, 0));
		let mut t = Token::new();
		let mut kinds = Vec::new();
		loop {
			match lexer.next_token(&mut t) {
				Ok(()) => kinds.push(t.kind),
				Err(Error::EndOfStream) => break,
				Err(e) => panic!("unexpected error: {:?}", e),
			}
		}
		assert_eq!(
			kinds,
			vec![
				TokenKind::StartElement,
				TokenKind::StartElement,
				TokenKind::Text,
				TokenKind::EndElement,
				TokenKind::EndElement,
			]
		);
	}

	#[test]
	fn lex_arena_is_restored_after_document() {
		let mut lexer = Lexer::new(&b"<a attr='v'><b>some text</b><?pi data?></a>"[..]);
		let mut t = Token::new();
		loop {
			match lexer.next_token(&mut t) {
				Ok(()) => (),
				Err(Error::EndOfStream) => break,
				Err(e) => panic!("unexpected error: {:?}", e),
			}
		}
		assert!(lexer.arena().is_empty());
	}

	#[test]
	fn lex_reset_rebinds_the_source() {
		let mut lexer = Lexer::new(&b"<a>"[..]);
		let mut t = Token::new();
		lexer.next_token(&mut t).unwrap();
		lexer.reset(&b"<b/>"[..]);
		lexer.next_token(&mut t).unwrap();
		assert_eq!(t.name.local.bytes(lexer.arena()), b"b");
	}
}
