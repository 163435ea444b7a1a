/*!
# Error types

This module holds the error types returned by the various functions of this
crate.
*/
use std::error;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::sync::Arc;

/// [`std::sync::Arc`]-based wrapper around [`std::io::Error`] to allow
/// cloning.
#[derive(Clone)]
pub struct IoErrorWrapper(Arc<io::Error>);

impl IoErrorWrapper {
	fn wrap(e: io::Error) -> IoErrorWrapper {
		IoErrorWrapper(Arc::new(e))
	}
}

impl fmt::Debug for IoErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl fmt::Display for IoErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&**self, f)
	}
}

impl PartialEq for IoErrorWrapper {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl AsRef<io::Error> for IoErrorWrapper {
	fn as_ref(&self) -> &io::Error {
		&*self.0
	}
}

impl Deref for IoErrorWrapper {
	type Target = io::Error;

	fn deref(&self) -> &io::Error {
		&*self.0
	}
}

/// Error types which may be returned from the lexer, the emitter or a
/// middleware.
///
/// With the exception of [`Error::EndOfStream`] and [`Error::Io`], all
/// errors are fatal: the pipeline must be [reset] before it is reused.
///
///    [reset]: crate::Lexer::reset
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
	/// Normal end of the input stream, reached at a token boundary.
	///
	/// Callers pull tokens until this is returned. It is not a failure.
	EndOfStream,

	/// End of the input stream in the middle of a token.
	///
	/// The contents describe the surrounding construct.
	UnexpectedEof(&'static str),

	/// Structural violation of the supported XML subset.
	///
	/// The contents describe the violated expectation.
	InvalidXml(&'static str),

	/// A construct which is recognised but not supported, such as a CDATA
	/// section.
	NotYetImplemented(&'static str),

	/// More than 255 simultaneously open elements.
	StackOverflow,

	/// More than 26 simultaneously live namespace prefix aliases.
	AliasExhausted,

	/// An I/O error was encountered on the byte source or sink.
	Io(IoErrorWrapper),
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub fn io(e: io::Error) -> Error {
		Error::Io(IoErrorWrapper::wrap(e))
	}

	/// Turn the end-of-stream sentinel into an in-token eof error.
	///
	/// Used by the lexer wherever running out of input is not a valid way
	/// to end the document.
	pub(crate) fn mid_token(self, ctx: &'static str) -> Error {
		match self {
			Error::EndOfStream => Error::UnexpectedEof(ctx),
			other => other,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::io(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::EndOfStream => f.write_str("end of stream"),
			Error::UnexpectedEof(ctx) => write!(f, "unexpected end of stream {}", ctx),
			Error::InvalidXml(msg) => write!(f, "invalid xml: {}", msg),
			Error::NotYetImplemented(what) => write!(f, "not implemented: {}", what),
			Error::StackOverflow => f.write_str("element nesting too deep"),
			Error::AliasExhausted => f.write_str("namespace prefix alias pool exhausted"),
			Error::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(&**e),
			Error::EndOfStream
			| Error::UnexpectedEof(_)
			| Error::InvalidXml(_)
			| Error::NotYetImplemented(_)
			| Error::StackOverflow
			| Error::AliasExhausted => None,
		}
	}
}
