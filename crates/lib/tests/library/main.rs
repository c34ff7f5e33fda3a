mod common;
mod generate_tests;
mod ninja_tests;
