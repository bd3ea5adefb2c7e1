pub mod fixtures;

mod session_tests;
