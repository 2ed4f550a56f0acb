mod common;
mod finder;
