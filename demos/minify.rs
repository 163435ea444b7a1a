use std::io;

use saxmin::{Error, NamespaceMiddleware, Pipeline};

fn main() {
	let stdin = io::stdin();
	let stdout = io::stdout();
	let mut pipeline = Pipeline::with_middleware(
		stdin.lock(),
		stdout.lock(),
		NamespaceMiddleware::new(),
	);
	match pipeline.run() {
		Ok(()) => (),
		Err(Error::Io(e)) => panic!("I/O error: {}", e),
		Err(e) => panic!("invalid XML on input: {}", e),
	}
}
