use std::cell::RefCell;

use crate::decode::Parser;

#[derive(Default)]
struct ParserPool {
    parsers: Vec<Parser>,
}

impl ParserPool {
    fn take(&mut self) -> Parser {
        self.parsers.pop().unwrap_or_default()
    }

    fn put(&mut self, parser: Parser) {
        self.parsers.push(parser);
    }
}

thread_local! {
    static PARSER_POOL: RefCell<ParserPool> = RefCell::new(ParserPool::default());
}

/// Takes a parser from the current thread's pool, keeping its buffer and
/// arena capacity warm across call sites. Pair with [`put_parser`].
pub fn take_parser() -> Parser {
    PARSER_POOL.with(|pool| pool.borrow_mut().take())
}

/// Returns a parser to the current thread's pool for later reuse.
pub fn put_parser(parser: Parser) {
    PARSER_POOL.with(|pool| pool.borrow_mut().put(parser));
}
