/*!
# Streaming XML rewriting with namespace minification

This crate decodes a byte stream of XML into a flat sequence of lexical
tokens, optionally rewrites the tokens through a middleware stage, and
serialises them back to bytes. The shipped [`NamespaceMiddleware`]
canonicalises namespace declarations: duplicate bindings of the same
namespace URI are collapsed to one prefix, verbose prefixes are replaced
by short single-letter aliases, and redundant `xmlns` attributes are
dropped while preserving semantic equivalence.

## Features (some call them restrictions)

* Permissive, byte-oriented lexing aimed at well-formed SOAP-style
  payloads
* Zero-copy tokens backed by a stack-scoped arena
* Round-trip fidelity: quote styles, self-closing elements and
  processing-instruction spacing survive re-encoding
* Whitespace between tags is elided unless `xml:space="preserve"` is in
  scope
* Comments are dropped, entities pass through verbatim
* No DTDs, no CDATA sections (rejected), no schema validation, UTF-8
  passed through opaquely

## Example

```
use saxmin::{NamespaceMiddleware, Pipeline};

let doc = &br#"<ns:a xmlns:ns="https://mynamespace"><ns1:b xmlns:ns1="https://mynamespace"></ns1:b></ns:a>"#[..];
let mut out = Vec::new();
let mut pipeline = Pipeline::with_middleware(doc, &mut out, NamespaceMiddleware::new());
pipeline.run().unwrap();
drop(pipeline);
assert_eq!(out, br#"<a:a xmlns:a="https://mynamespace"><a:b/></a:a>"#);
```

## Pipeline anatomy

The pipeline is single-threaded and pull-driven. [`Lexer::next_token`]
fills a reusable [`Token`]; [`Emitter::encode_token`] runs the
middlewares and serialises it. [`Pipeline::run`] is the canonical pump
loop; consumers that inspect or inject tokens (see
[`NamespaceMiddleware::namespace_of_token`]) drive the two ends
directly.

Token byte payloads live in the lexer's [`Arena`] and stay valid until
the matching end-element token has been consumed. One pipeline instance
is single-threaded; instantiate one pipeline per worker for parallelism.
*/

pub mod error;
pub mod lexer;
pub mod middleware;
pub mod token;
pub mod writer;

mod driver;
mod reader;


pub use driver::Pipeline;
pub use error::{Error, Result};
pub use lexer::Lexer;
pub use middleware::{Middleware, NamespaceMiddleware};
pub use token::{Arena, Attr, Name, Slice, Token, TokenKind};
pub use writer::Emitter;

/// Package version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
