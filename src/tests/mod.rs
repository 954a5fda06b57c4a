mod matching;
mod session;
mod support;
