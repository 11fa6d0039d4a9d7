pub mod date;
pub mod logs;
#[cfg(test)]
pub(crate) mod fixtures;
