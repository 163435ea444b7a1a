/*!
# Buffered byte source

A fixed-size read buffer over an arbitrary [`std::io::Read`]. The lexer
consumes it byte-wise where lookahead decisions are made and through the
raw [`window`] for the scan kernels.

   [`window`]: ByteReader::window
*/
use std::io;

use crate::error::{Error, Result};

pub(crate) const BUF_SIZE: usize = 4096;

/// Fixed-size read buffer with single-byte pushback.
///
/// The unread portion of the buffer is `buf[r..w]`. Refilling compacts
/// that window to the front of the buffer first, so the window is always
/// contiguous.
pub(crate) struct ByteReader<R> {
	buf: Box<[u8; BUF_SIZE]>,
	r: usize,
	w: usize,
	src: R,
}

impl<R: io::Read> ByteReader<R> {
	pub(crate) fn new(src: R) -> ByteReader<R> {
		ByteReader {
			buf: Box::new([0u8; BUF_SIZE]),
			r: 0,
			w: 0,
			src,
		}
	}

	/// Rebind to a new source, dropping all buffered bytes.
	pub(crate) fn reset(&mut self, src: R) {
		self.src = src;
		self.r = 0;
		self.w = 0;
	}

	/// Compact the window to the front of the buffer and read more bytes
	/// from the source.
	///
	/// Returns [`Error::EndOfStream`] once the source is exhausted.
	pub(crate) fn fill(&mut self) -> Result<()> {
		if self.r > 0 {
			self.buf.copy_within(self.r..self.w, 0);
			self.w -= self.r;
			self.r = 0;
		}
		loop {
			match self.src.read(&mut self.buf[self.w..]) {
				Ok(0) => return Err(Error::EndOfStream),
				Ok(n) => {
					self.w += n;
					return Ok(());
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(Error::io(e)),
			}
		}
	}

	pub(crate) fn read_byte(&mut self) -> Result<u8> {
		while self.r == self.w {
			self.fill()?;
		}
		let b = self.buf[self.r];
		self.r += 1;
		Ok(b)
	}

	/// Push back the most recently read byte.
	///
	/// Only valid directly after a successful [`read_byte`]; the window
	/// is never compacted in between.
	///
	///    [`read_byte`]: ByteReader::read_byte
	pub(crate) fn unread_byte(&mut self) {
		debug_assert!(self.r > 0);
		self.r -= 1;
	}

	/// The unread bytes currently buffered.
	pub(crate) fn window(&self) -> &[u8] {
		&self.buf[self.r..self.w]
	}

	/// Drop `n` bytes from the front of the window.
	pub(crate) fn consume(&mut self, n: usize) {
		debug_assert!(n <= self.w - self.r);
		self.r += n;
	}
}
