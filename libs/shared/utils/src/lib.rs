pub mod serde_helpers;
pub mod test_utils;
