/*!
# Token middlewares

A middleware is a token-rewriting stage run by the
[`Emitter`](crate::Emitter) before a token is serialised. Middlewares
receive a mutable view of the token and may rewrite names, drop
attributes or record scoped state between a start-element and its
matching end-element.
*/
use crate::error::Result;
use crate::token::{Arena, Token};

mod namespaces;

pub use namespaces::NamespaceMiddleware;

/// A token-rewriting stage with a per-document lifecycle.
pub trait Middleware {
	/// Inspect and possibly rewrite a token before it is serialised.
	///
	/// Token byte slices resolve against `arena`; replacement bytes
	/// installed by the middleware must either be static or refer to
	/// regions of the same arena which outlive the rewritten token.
	fn encode_token(&mut self, token: &mut Token, arena: &Arena) -> Result<()>;

	/// Drop all per-document state, at the start of a new document.
	fn reset(&mut self);
}

/// The identity middleware.
impl Middleware for () {
	fn encode_token(&mut self, _token: &mut Token, _arena: &Arena) -> Result<()> {
		Ok(())
	}

	fn reset(&mut self) {}
}

/// Two middlewares in sequence; `A` runs first.
impl<A: Middleware, B: Middleware> Middleware for (A, B) {
	fn encode_token(&mut self, token: &mut Token, arena: &Arena) -> Result<()> {
		self.0.encode_token(token, arena)?;
		self.1.encode_token(token, arena)
	}

	fn reset(&mut self) {
		self.0.reset();
		self.1.reset();
	}
}
