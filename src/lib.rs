#![doc = include_str!("../RUSTDOC.md")]

pub mod pixel;

#[cfg(test)]
pub mod test_support;
