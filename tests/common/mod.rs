#![allow(dead_code)]

pub mod mock_host;

pub use mock_host::{MockHost, TEST_LOGIN, TEST_TOKEN};
