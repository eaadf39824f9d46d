#![allow(missing_docs)]

mod compare;
mod header;
mod split;
mod validate;
