/*!
# Pipeline driver

Wires a [`Lexer`] to an [`Emitter`] and pumps tokens from one to the
other until the source is exhausted.
*/
use std::io;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::middleware::Middleware;
use crate::token::Token;
use crate::writer::Emitter;

/// A decode → rewrite → encode pipeline over a byte source and sink.
///
/// The pipeline owns the reusable [`Token`] and performs the canonical
/// pump loop; for anything fancier (inspecting tokens, injecting
/// synthetic ones) drive a [`Lexer`] and an [`Emitter`] directly.
///
/// ```
/// use saxmin::{NamespaceMiddleware, Pipeline};
///
/// let doc = &br#"<ns:a xmlns:ns="https://mynamespace">Hello</ns:a>"#[..];
/// let mut out = Vec::new();
/// let mut pipeline = Pipeline::with_middleware(doc, &mut out, NamespaceMiddleware::new());
/// pipeline.run().unwrap();
/// drop(pipeline);
/// assert_eq!(out, br#"<a:a xmlns:a="https://mynamespace">Hello</a:a>"#);
/// ```
pub struct Pipeline<R, W, M = ()> {
	lexer: Lexer<R>,
	emitter: Emitter<W, M>,
	token: Token,
}

impl<R: io::Read, W: io::Write> Pipeline<R, W, ()> {
	/// A pipeline which re-encodes the input without rewriting it.
	pub fn new(src: R, sink: W) -> Pipeline<R, W, ()> {
		Self::wrap(Lexer::new(src), Emitter::new(sink))
	}
}

impl<R: io::Read, W: io::Write, M: Middleware> Pipeline<R, W, M> {
	pub fn with_middleware(src: R, sink: W, middleware: M) -> Pipeline<R, W, M> {
		Self::wrap(Lexer::new(src), Emitter::with_middleware(sink, middleware))
	}

	/// Compose a pipeline from parts.
	pub fn wrap(lexer: Lexer<R>, emitter: Emitter<W, M>) -> Pipeline<R, W, M> {
		Pipeline {
			lexer,
			emitter,
			token: Token::new(),
		}
	}

	/// Access the lexer
	pub fn lexer(&self) -> &Lexer<R> {
		&self.lexer
	}

	/// Access the lexer, mutably
	pub fn lexer_mut(&mut self) -> &mut Lexer<R> {
		&mut self.lexer
	}

	/// Access the emitter
	pub fn emitter(&self) -> &Emitter<W, M> {
		&self.emitter
	}

	/// Access the emitter, mutably
	pub fn emitter_mut(&mut self) -> &mut Emitter<W, M> {
		&mut self.emitter
	}

	/// Pump tokens from the source through the middleware to the sink
	/// until the source reports end of stream, then flush the sink.
	///
	/// Any other error short-circuits; the pipeline should then be reset
	/// before reuse.
	pub fn run(&mut self) -> Result<()> {
		debug!("pipeline run");
		let mut tokens = 0usize;
		loop {
			match self.lexer.next_token(&mut self.token) {
				Ok(()) => {
					self.emitter
						.encode_token(&mut self.token, self.lexer.arena())?;
					tokens += 1;
				}
				Err(Error::EndOfStream) => {
					self.emitter.flush()?;
					trace!("pipeline drained after {} tokens", tokens);
					return Ok(());
				}
				Err(e) => return Err(e),
			}
		}
	}
}
