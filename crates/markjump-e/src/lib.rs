pub mod backend;
pub mod dom;
pub mod webdriver;
