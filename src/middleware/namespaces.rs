/*!
# Namespace canonicalisation

[`NamespaceMiddleware`] minimises namespace declarations across a
document:

1. when the same namespace URI is bound under different prefixes in
   different subtrees, all of them are unified to one prefix;
2. verbose input prefixes are replaced by short single-letter aliases
   (`a`, `b`, …) drawn in declaration order;
3. `xmlns` / `xmlns:x` attributes which redeclare an already-visible
   binding are dropped;
4. end-elements are emitted with the (possibly rewritten) name of the
   element they close, regardless of how the input spelled it.

Bindings and prefix rewrites are scoped: each start-element pushes a
frame, the matching end-element pops it, so declarations never leak into
sibling subtrees and alias letters are reused once a subtree closes.
*/
use log::trace;

use crate::error::{Error, Result};
use crate::lexer::MAX_DEPTH;
use crate::middleware::Middleware;
use crate::token::{Arena, Attr, Name, Slice, Token, TokenKind};

/// Pool of replacement prefixes, drawn in declaration order.
static ALIASES: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Middleware which canonicalises namespace declarations and resolves
/// effective namespaces of tokens.
///
/// ```
/// use saxmin::{NamespaceMiddleware, Pipeline};
///
/// let doc = &b"<ns:a xmlns:ns='u'><ns1:b xmlns:ns1='u'/></ns:a>"[..];
/// let mut out = Vec::new();
/// let mut pipeline = Pipeline::with_middleware(doc, &mut out, NamespaceMiddleware::new());
/// pipeline.run().unwrap();
/// drop(pipeline);
/// assert_eq!(out, b"<a:a xmlns:a='u'><a:b/></a:a>");
/// ```
pub struct NamespaceMiddleware {
	// prefix -> namespace URI bindings, newest last; scanning backwards
	// implements lexical scoping
	namespaces: Vec<(Slice, Slice)>,
	ns_offs: [usize; MAX_DEPTH + 1],

	// original prefix -> replacement prefix, newest last
	prefix_aliases: Vec<(Slice, Slice)>,
	alias_offs: [usize; MAX_DEPTH + 1],

	// rewritten name of each open element, echoed on its end-element
	open_names: [Name; MAX_DEPTH + 1],

	top: u8,
	preserve_original_prefixes: bool,
}

impl NamespaceMiddleware {
	pub fn new() -> NamespaceMiddleware {
		NamespaceMiddleware {
			namespaces: Vec::with_capacity(16),
			ns_offs: [0; MAX_DEPTH + 1],
			prefix_aliases: Vec::with_capacity(16),
			alias_offs: [0; MAX_DEPTH + 1],
			open_names: [Name::default(); MAX_DEPTH + 1],
			top: 0,
			preserve_original_prefixes: false,
		}
	}

	/// Keep input prefixes instead of assigning single-letter aliases.
	///
	/// Redundant declarations are still dropped, and a declaration whose
	/// URI is already visible under another prefix is still rewritten to
	/// that prefix.
	pub fn preserve_original_prefixes(mut self) -> NamespaceMiddleware {
		self.preserve_original_prefixes = true;
		self
	}

	/// Resolve the effective namespace URI of the token's name.
	///
	/// The token's prefix is expanded through the alias table and then
	/// looked up in the binding stack, so this works both before and
	/// after the token went through the middleware. Returns `None` for
	/// names without a visible binding.
	pub fn namespace_of_token<'a>(&self, t: &Token, arena: &'a Arena) -> Option<&'a [u8]> {
		let mut prefix = t.name.prefix;
		if !prefix.is_empty() {
			if let Some(alias) = self.find_prefix_alias(prefix.bytes(arena), arena) {
				prefix = alias;
			}
		}
		match self.find_namespace_for_prefix(prefix.bytes(arena), arena) {
			Some(uri) if !uri.is_empty() => Some(uri.bytes(arena)),
			_ => None,
		}
	}

	/// The namespace bound to `prefix`, scanning inner scopes first.
	fn find_namespace_for_prefix(&self, prefix: &[u8], arena: &Arena) -> Option<Slice> {
		for (p, uri) in self.namespaces.iter().rev() {
			if p.bytes(arena) == prefix {
				return Some(*uri);
			}
		}
		None
	}

	/// A prefix binding `uri`, scanning inner scopes first. This is the
	/// reverse operation of [`Self::find_namespace_for_prefix`].
	fn find_prefix_for_namespace(&self, uri: &[u8], arena: &Arena) -> Option<Slice> {
		for (p, u) in self.namespaces.iter().rev() {
			if u.bytes(arena) == uri {
				return Some(*p);
			}
		}
		None
	}

	/// The replacement recorded for `prefix`, if its declaration was
	/// rewritten on some open element.
	fn find_prefix_alias(&self, prefix: &[u8], arena: &Arena) -> Option<Slice> {
		for (orig, alias) in self.prefix_aliases.iter().rev() {
			if orig.bytes(arena) == prefix {
				return Some(*alias);
			}
		}
		None
	}

	fn add_binding(&mut self, prefix: Slice, uri: Slice) {
		self.namespaces.push((prefix, uri));
		self.ns_offs[self.top as usize] += 1;
	}

	fn add_prefix_rewrite(&mut self, original: Slice, replacement: Slice) {
		self.prefix_aliases.push((original, replacement));
		self.alias_offs[self.top as usize] += 1;
	}

	/// The next free alias letter. The pool index is the number of live
	/// rewrites, so popped frames give their letters back.
	fn next_alias(&self) -> Result<Slice> {
		let k = self.prefix_aliases.len();
		if k >= ALIASES.len() {
			return Err(Error::AliasExhausted);
		}
		Ok(Slice::Bytes(&ALIASES[k..k + 1]))
	}

	fn push_frame(&mut self) -> Result<()> {
		if (self.top as usize) >= MAX_DEPTH {
			return Err(Error::StackOverflow);
		}
		self.top += 1;
		let top = self.top as usize;
		self.ns_offs[top] = self.ns_offs[top - 1];
		self.alias_offs[top] = self.alias_offs[top - 1];
		Ok(())
	}

	fn pop_frame(&mut self) {
		self.top -= 1;
		let top = self.top as usize;
		self.namespaces.truncate(self.ns_offs[top]);
		self.prefix_aliases.truncate(self.alias_offs[top]);
	}

	/// Scan the attribute list for namespace declarations, dropping and
	/// rewriting in place (two-index compaction).
	fn process_declarations(&mut self, t: &mut Token, arena: &Arena) -> Result<()> {
		let mut j = 0;
		for i in 0..t.attrs.len() {
			let mut attr = t.attrs[i];
			if !self.process_declaration(&mut attr, &mut t.name, arena)? {
				continue;
			}
			t.attrs[j] = attr;
			j += 1;
		}
		t.attrs.truncate(j);
		Ok(())
	}

	/// Handle one attribute; returns whether it is kept.
	fn process_declaration(&mut self, attr: &mut Attr, elem: &mut Name, arena: &Arena) -> Result<bool> {
		if attr.name.prefix.bytes(arena) == b"xmlns" {
			// xmlns:X="U": this element binds U to the prefix X
			let uri = attr.value;
			if let Some(p) = self.find_prefix_for_namespace(uri.bytes(arena), arena) {
				if p.bytes(arena) != attr.name.local.bytes(arena) {
					// the namespace is already visible under another
					// prefix; rewrite X to it
					self.add_prefix_rewrite(attr.name.local, p);
				}
				// either way the declaration is redundant
				return Ok(false);
			}
			if self.preserve_original_prefixes {
				let rebound = match self.find_namespace_for_prefix(attr.name.local.bytes(arena), arena) {
					Some(bound) => bound.bytes(arena) != uri.bytes(arena),
					None => false,
				};
				if !rebound {
					self.add_binding(attr.name.local, uri);
					return Ok(true);
				}
				// X is visibly bound to another URI; rewrite rather
				// than shadow
			}
			let alias = self.next_alias()?;
			trace!("alias {:?} for declared prefix", alias);
			self.add_prefix_rewrite(attr.name.local, alias);
			self.add_binding(alias, uri);
			attr.name.local = alias;
			return Ok(true);
		}

		if attr.name.prefix.is_empty() && attr.name.local.bytes(arena) == b"xmlns" {
			// xmlns="U": default namespace for this subtree
			let uri = attr.value;
			if uri.is_empty() {
				// undeclaration: mask any outer default binding
				self.add_binding(Slice::EMPTY, Slice::EMPTY);
				return Ok(true);
			}
			let default_bound = match self.find_namespace_for_prefix(b"", arena) {
				Some(bound) => !bound.is_empty(),
				None => false,
			};
			if default_bound {
				// a default namespace is already in scope
				return Ok(false);
			}
			if let Some(p) = self.find_prefix_for_namespace(uri.bytes(arena), arena) {
				// the namespace is known under a prefix: move this
				// element (and unprefixed descendants) to that prefix
				// and drop the declaration
				self.add_prefix_rewrite(Slice::EMPTY, p);
				elem.prefix = p;
				return Ok(false);
			}
			self.add_binding(Slice::EMPTY, uri);
			return Ok(true);
		}

		Ok(true)
	}

	/// Rewrite the element's own prefix and every kept attribute's
	/// prefix through the alias table.
	fn rewrite_prefixes(&self, t: &mut Token, arena: &Arena) {
		if let Some(alias) = self.find_prefix_alias(t.name.prefix.bytes(arena), arena) {
			t.name.prefix = alias;
		}
		for attr in t.attrs.iter_mut() {
			let prefix = attr.name.prefix;
			// a default namespace never applies to attributes, and
			// xmlns:* locals were already handled
			if prefix.is_empty() || prefix.bytes(arena) == b"xmlns" {
				continue;
			}
			if let Some(alias) = self.find_prefix_alias(prefix.bytes(arena), arena) {
				attr.name.prefix = alias;
			}
		}
	}
}

impl Default for NamespaceMiddleware {
	fn default() -> NamespaceMiddleware {
		NamespaceMiddleware::new()
	}
}

impl Middleware for NamespaceMiddleware {
	fn encode_token(&mut self, t: &mut Token, arena: &Arena) -> Result<()> {
		match t.kind {
			TokenKind::StartElement => {
				self.push_frame()?;
				self.process_declarations(t, arena)?;
				self.rewrite_prefixes(t, arena);
				self.open_names[self.top as usize] = t.name;
				Ok(())
			}
			TokenKind::EndElement => {
				if self.top == 0 {
					return Err(Error::InvalidXml("end element without open element"));
				}
				t.name = self.open_names[self.top as usize];
				self.pop_frame();
				Ok(())
			}
			_ => Ok(()),
		}
	}

	fn reset(&mut self) {
		self.namespaces.clear();
		self.prefix_aliases.clear();
		self.ns_offs = [0; MAX_DEPTH + 1];
		self.alias_offs = [0; MAX_DEPTH + 1];
		self.top = 0;
	}
}
